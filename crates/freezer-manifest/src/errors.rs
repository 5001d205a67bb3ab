use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort manifest resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Entry script not found: {}", path.display())]
    EntryScriptMissing { path: PathBuf },

    #[error("Project root is not a directory: {}", path.display())]
    ProjectRootMissing { path: PathBuf },
}

/// Errors that can occur while reading or writing a manifest file
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to serialize manifest as JSON: {0}")]
    Json(#[from] serde_json::Error),
}
