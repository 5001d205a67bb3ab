pub mod exclusions;
pub mod resolve;
pub mod rules;

use std::path::{Path, PathBuf};

/// Absolute form of a user-supplied path, relative to the working directory
pub(crate) fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
