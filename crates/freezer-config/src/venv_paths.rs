//! Path resolution inside Python virtual environments
//!
//! Bundles are built from a project-local environment (`.venv`), so the
//! resolver needs to find that environment, its site-packages directory and
//! its interpreter without running Python.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const PYTHON_LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const PYTHON_LIB_DIR: &str = "lib";

/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Environment variables naming the active Python environment, in priority order.
pub const ACTIVE_ENV_VARS: &[&str] = &["VIRTUAL_ENV", "CONDA_PREFIX"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenvPathError {
    /// The environment root does not exist or is not a directory
    VenvNotFound(PathBuf),
    /// The environment exists but lacks the expected layout
    PathResolution(String),
}

impl std::fmt::Display for VenvPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenvPathError::VenvNotFound(path) => {
                write!(f, "Virtual environment not found: {}", path.display())
            }
            VenvPathError::PathResolution(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for VenvPathError {}

/// Find the dependency environment of a project.
///
/// Returns the first of `dir_names` that exists as a directory under
/// `project_root`.
pub fn detect_environment_root(project_root: &Path, dir_names: &[String]) -> Option<PathBuf> {
    dir_names
        .iter()
        .map(|name| project_root.join(name))
        .find(|candidate| {
            let found = candidate.is_dir();
            debug!("Environment candidate {}: {}", candidate.display(), found);
            found
        })
}

/// Pick the active environment from a variable lookup.
///
/// Takes the lookup as a closure so callers can pass `std::env::var` or a
/// fixed map in tests.
pub fn active_environment<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    ACTIVE_ENV_VARS.iter().find_map(|var| {
        lookup(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Resolve the site-packages directory of an environment.
///
/// - **Windows**: `<env>/Lib/site-packages`
/// - **Unix/macOS**: `<env>/lib/python3.X/site-packages`
pub fn resolve_site_packages(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    let lib_dir = venv_path.join(PYTHON_LIB_DIR);
    if !lib_dir.is_dir() {
        return Err(VenvPathError::PathResolution(format!(
            "lib directory not found: {}",
            lib_dir.display()
        )));
    }

    // Flat layout first: Windows venvs and some conda installs
    let flat = lib_dir.join("site-packages");
    if flat.is_dir() {
        return Ok(flat);
    }

    // Versioned layout, newest first so a leftover python3.8 dir does not win
    let mut versioned: Vec<PathBuf> = fs::read_dir(&lib_dir)
        .map_err(|e| VenvPathError::PathResolution(format!("Failed to read lib dir: {}", e)))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("python"))
        .map(|e| e.path().join("site-packages"))
        .filter(|p| p.is_dir())
        .collect();
    versioned.sort_by_key(|p| std::cmp::Reverse(python_dir_version(p)));

    versioned.into_iter().next().ok_or_else(|| {
        VenvPathError::PathResolution(format!(
            "No site-packages directory found under {}",
            lib_dir.display()
        ))
    })
}

/// Resolve the interpreter of an environment.
pub fn resolve_python_exe(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    // Conda puts python.exe at the prefix root on Windows
    let search_dirs = [venv_path.join(PYTHON_BIN_DIR), venv_path.to_path_buf()];
    for dir in &search_dirs {
        for exe in PYTHON_EXE_CANDIDATES {
            let candidate = dir.join(exe);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(VenvPathError::PathResolution(format!(
        "Python executable not found in {}",
        venv_path.display()
    )))
}

/// `(major, minor)` parsed from a `.../pythonX.Y/site-packages` path.
fn python_dir_version(site_packages: &Path) -> (u32, u32) {
    let name = site_packages
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut parts = name.trim_start_matches("python").split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[cfg(not(windows))]
    fn create_mock_venv(python_versions: &[&str]) -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        for version in python_versions {
            let site_packages = temp_dir.path().join("lib").join(version).join("site-packages");
            fs::create_dir_all(&site_packages).ok()?;
        }
        let bin_dir = temp_dir.path().join("bin");
        fs::create_dir_all(&bin_dir).ok()?;
        fs::write(bin_dir.join("python3"), "").ok()?;
        Some(temp_dir)
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_unix() {
        let Some(venv) = create_mock_venv(&["python3.12"]) else {
            return;
        };
        let result = resolve_site_packages(venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("lib/python3.12/site-packages")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_prefers_newest_version() {
        let Some(venv) = create_mock_venv(&["python3.9", "python3.11", "python3.10"]) else {
            return;
        };
        let result = resolve_site_packages(venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("lib/python3.11/site-packages")));
    }

    #[test]
    fn test_resolve_site_packages_flat_layout() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let flat = temp_dir.path().join(PYTHON_LIB_DIR).join("site-packages");
        if fs::create_dir_all(&flat).is_err() {
            return;
        }
        let result = resolve_site_packages(temp_dir.path());
        assert_eq!(result, Ok(flat));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_python_exe_unix() {
        let Some(venv) = create_mock_venv(&["python3.12"]) else {
            return;
        };
        let result = resolve_python_exe(venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("bin/python3")));
    }

    #[test]
    fn test_venv_not_found() {
        let non_existent = PathBuf::from("/tmp/freezer_non_existent_venv_12345");
        let result = resolve_site_packages(&non_existent);
        assert!(matches!(result, Err(VenvPathError::VenvNotFound(_))));
    }

    #[test]
    fn test_detect_environment_root_order() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        if fs::create_dir_all(temp_dir.path().join("venv")).is_err() {
            return;
        }
        let names = vec![".venv".to_string(), "venv".to_string()];
        assert_eq!(
            detect_environment_root(temp_dir.path(), &names),
            Some(temp_dir.path().join("venv"))
        );

        if fs::create_dir_all(temp_dir.path().join(".venv")).is_err() {
            return;
        }
        assert_eq!(
            detect_environment_root(temp_dir.path(), &names),
            Some(temp_dir.path().join(".venv"))
        );
    }

    #[test]
    fn test_detect_environment_root_ignores_files() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        if fs::write(temp_dir.path().join(".venv"), "").is_err() {
            return;
        }
        assert_eq!(
            detect_environment_root(temp_dir.path(), &[".venv".to_string()]),
            None
        );
    }

    #[test]
    fn test_active_environment_priority() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("VIRTUAL_ENV", "/opt/venv"), ("CONDA_PREFIX", "/opt/conda")]);
        let found = active_environment(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(found, Some(PathBuf::from("/opt/venv")));

        let conda_only: HashMap<&str, &str> =
            HashMap::from([("VIRTUAL_ENV", "  "), ("CONDA_PREFIX", "/opt/conda")]);
        let found = active_environment(|k| conda_only.get(k).map(|v| (*v).to_string()));
        assert_eq!(found, Some(PathBuf::from("/opt/conda")));

        assert_eq!(active_environment(|_| None), None);
    }

    #[test]
    fn test_platform_constants() {
        #[cfg(not(windows))]
        {
            assert_eq!(PYTHON_LIB_DIR, "lib");
            assert_eq!(PYTHON_BIN_DIR, "bin");
        }
        #[cfg(windows)]
        {
            assert_eq!(PYTHON_LIB_DIR, "Lib");
            assert_eq!(PYTHON_BIN_DIR, "Scripts");
        }
    }
}
