//! Reading and writing manifest files
//!
//! TOML is the default format; JSON is offered for packaging wrappers that
//! would rather not pull in a TOML parser.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::types::BundleManifest;

/// Output format of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Toml,
    Json,
}

impl ManifestFormat {
    /// Guess the format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        }
    }
}

pub fn to_string(manifest: &BundleManifest, format: ManifestFormat) -> Result<String, ManifestError> {
    match format {
        ManifestFormat::Toml => Ok(toml::to_string_pretty(manifest)?),
        ManifestFormat::Json => Ok(serde_json::to_string_pretty(manifest)?),
    }
}

/// Write manifest to a path
pub fn write_to_path(
    manifest: &BundleManifest,
    output_path: &Path,
    format: ManifestFormat,
) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    let content = to_string(manifest, format)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, &content)?;

    info!("Manifest written successfully to: {:?}", output_path);
    info!("Total resources: {}", manifest.datas.len());

    Ok(())
}

/// Read manifest from a path, format chosen by extension
#[cfg(test)]
fn read_from_path(manifest_path: &Path) -> Result<BundleManifest, ManifestError> {
    debug!("Reading manifest from: {:?}", manifest_path);

    let content = fs::read_to_string(manifest_path)?;
    let manifest: BundleManifest = match ManifestFormat::from_path(manifest_path) {
        ManifestFormat::Toml => toml::from_str(&content)?,
        ManifestFormat::Json => serde_json::from_str(&content)?,
    };

    info!("Manifest version: {}", manifest.version);
    info!("Generated at: {}", manifest.generated_at);

    Ok(manifest)
}
