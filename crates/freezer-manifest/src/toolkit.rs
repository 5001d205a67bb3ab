//! Locating the GUI toolkit package and listing its submodules
//!
//! The toolkit loads most of its submodules lazily, so the packaging tool's
//! import scan misses them. Every importable submodule is passed along as a
//! hidden import instead.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use crate::probe;

/// Prints the directory of the package named in argv[1]
const LOCATE_SCRIPT: &str =
    "import importlib, os, sys; m = importlib.import_module(sys.argv[1]); print(os.path.dirname(os.path.abspath(m.__file__)))";

/// Native extension suffixes that make a file importable
const EXTENSION_SUFFIXES: &[&str] = &["so", "pyd"];

/// Why the toolkit package could not be located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitError {
    /// The interpreter could not import the package
    ImportFailed { package: String, detail: String },
    /// No searched site-packages directory contains the package
    NotInstalled { package: String, searched: Vec<PathBuf> },
}

impl std::fmt::Display for ToolkitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolkitError::ImportFailed { package, detail } => {
                write!(f, "Failed to import {}: {}", package, detail)
            }
            ToolkitError::NotInstalled { package, searched } => {
                write!(f, "{} is not installed", package)?;
                if !searched.is_empty() {
                    let dirs: Vec<String> =
                        searched.iter().map(|p| p.display().to_string()).collect();
                    write!(f, " (searched {})", dirs.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ToolkitError {}

/// Ask an interpreter where it imports `package` from.
pub fn locate_with_interpreter(python: &Path, package: &str) -> Result<PathBuf, ToolkitError> {
    debug!("Probing {} for package {}", python.display(), package);

    let import_failed = |detail: String| ToolkitError::ImportFailed {
        package: package.to_string(),
        detail,
    };

    let output = Command::new(python)
        .args(["-c", LOCATE_SCRIPT, package])
        .output()
        .map_err(|e| import_failed(format!("could not run {}: {}", python.display(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().last().unwrap_or("").trim().to_string();
        return Err(import_failed(last_line));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let dir = PathBuf::from(stdout.trim());
    if dir.as_os_str().is_empty() || !probe::is_dir(&dir) {
        return Err(import_failed(format!(
            "interpreter reported '{}' which is not a directory",
            dir.display()
        )));
    }

    Ok(dir)
}

/// Find `package` as a regular package in the first site-packages that has it.
pub fn locate_in_site_packages(
    package: &str,
    site_packages: &[PathBuf],
) -> Result<PathBuf, ToolkitError> {
    site_packages
        .iter()
        .map(|site| site.join(package))
        .find(|dir| probe::is_file(&dir.join("__init__.py")))
        .ok_or_else(|| ToolkitError::NotInstalled {
            package: package.to_string(),
            searched: site_packages.to_vec(),
        })
}

/// Every importable module under a package directory, the package included.
///
/// Recurses only into sub-packages (directories with `__init__.py`); data
/// directories such as `Qt5/` are skipped.
pub fn enumerate_submodules(package: &str, package_dir: &Path) -> BTreeSet<String> {
    let mut modules = BTreeSet::new();
    modules.insert(package.to_string());

    let walker = WalkDir::new(package_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_type().is_dir() || e.path().join("__init__.py").is_file()
        });

    for entry in walker.filter_map(|e| e.ok()) {
        let Ok(relative) = entry.path().strip_prefix(package_dir) else {
            continue;
        };

        let mut parts: Vec<String> = relative
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let file_name = entry.file_name().to_string_lossy().to_string();
        let leaf = if entry.file_type().is_dir() {
            Some(file_name)
        } else {
            module_name_of_file(&file_name)
        };

        let Some(leaf) = leaf else {
            continue;
        };
        if leaf == "__init__" {
            continue;
        }
        parts.push(leaf);

        if parts.iter().all(|p| is_identifier(p)) {
            modules.insert(format!("{}.{}", package, parts.join(".")));
        }
    }

    debug!("Found {} modules under {}", modules.len(), package_dir.display());
    modules
}

/// Module name of a source or extension file.
///
/// `QtCore.cpython-311-x86_64-linux-gnu.so` and `QtCore.pyd` both give `QtCore`.
fn module_name_of_file(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    match extension {
        "py" => Some(stem.to_string()),
        ext if EXTENSION_SUFFIXES.contains(&ext) => {
            stem.split('.').next().map(|name| name.to_string())
        }
        _ => None,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
