//! One-shot filesystem existence checks
//!
//! "Not found" is the normal outcome for optional resources. Any other error
//! is treated the same way but reported, so a permission problem does not
//! silently look like a missing directory.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

fn metadata(path: &Path) -> Option<fs::Metadata> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Not present: {}", path.display());
            None
        }
        Err(e) => {
            warn!("Treating {} as absent: {}", path.display(), e);
            None
        }
    }
}

pub(crate) fn exists(path: &Path) -> bool {
    metadata(path).is_some()
}

pub(crate) fn is_dir(path: &Path) -> bool {
    metadata(path).is_some_and(|m| m.is_dir())
}

pub(crate) fn is_file(path: &Path) -> bool {
    metadata(path).is_some_and(|m| m.is_file())
}
