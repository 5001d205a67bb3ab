//! Bundle rules: the fixed name lists that drive manifest resolution
//!
//! The defaults describe the desktop application this tool was written for.
//! A project can override any field with a `freezer.toml` next to its entry
//! script, or the caller can point at another file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name looked up in the project root when no rules file is given.
pub const PROJECT_RULES_FILE: &str = "freezer.toml";

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rules file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rules file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize rules: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where a third-party asset path is anchored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AssetAnchor {
    /// Relative to the environment root itself
    Environment,
    /// Relative to the environment's site-packages directory
    #[default]
    SitePackages,
}

/// A dependency's runtime asset directory that static analysis cannot see.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyAsset {
    pub path: String,
    pub dest: String,
    #[serde(default)]
    pub anchor: AssetAnchor,
}

/// GUI toolkit whose submodules and runtime plugins must be force-included.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolkitRules {
    /// Importable package name, e.g. `PyQt5`
    pub package: String,
    /// Plugin directories relative to the package directory, in priority order
    pub plugin_dirs: Vec<String>,
    /// Plugin categories looked up under a plugin directory
    pub plugin_categories: Vec<String>,
    /// Bundle destination prefix; each category lands at `<plugin_dest>/<category>`
    pub plugin_dest: String,
}

impl Default for ToolkitRules {
    fn default() -> Self {
        ToolkitRules {
            package: "PyQt5".to_string(),
            plugin_dirs: strings(&["Qt5/plugins", "Qt/plugins"]),
            plugin_categories: strings(&["platforms", "imageformats"]),
            plugin_dest: "PyQt5/Qt5/plugins".to_string(),
        }
    }
}

/// Everything the resolver needs to know about what goes into a bundle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct BundleRules {
    /// Entry script relative to the project root
    pub entry_script: String,
    /// Bundle name; defaults to the entry script's stem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Icon file relative to the project root, used only if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Attach a console to the produced executable
    pub console: bool,
    /// Directory names probed under the project root for the dependency environment
    pub environment_dirs: Vec<String>,
    pub core_dirs: Vec<String>,
    pub doc_files: Vec<String>,
    /// User-editable trees shipped next to the executable, never inside the bundle
    pub excluded_dirs: Vec<String>,
    pub excluded_files: Vec<String>,
    pub third_party_assets: Vec<ThirdPartyAsset>,
    /// Modules loaded dynamically by the application
    pub hidden_imports: Vec<String>,
    pub toolkit: ToolkitRules,
}

impl Default for BundleRules {
    fn default() -> Self {
        BundleRules {
            entry_script: "main_ui.py".to_string(),
            name: None,
            icon: Some("icon.ico".to_string()),
            console: true,
            environment_dirs: strings(&[".venv", "venv"]),
            core_dirs: strings(&["models"]),
            doc_files: strings(&["LICENSE", "README.md", "PACKAGING.md"]),
            excluded_dirs: strings(&["quanka", "shadowverse_cards_cost", "Image"]),
            excluded_files: strings(&["config.json"]),
            third_party_assets: vec![ThirdPartyAsset {
                path: "adbutils/binaries".to_string(),
                dest: "adbutils/binaries".to_string(),
                anchor: AssetAnchor::SitePackages,
            }],
            hidden_imports: strings(&[
                "cv2",
                "numpy",
                "PIL",
                "torch",
                "torchvision",
                "requests",
                "adbutils",
                "uiautomator2",
                "click",
            ]),
            toolkit: ToolkitRules::default(),
        }
    }
}

impl BundleRules {
    /// Pick the rules file for a project.
    ///
    /// Order: explicit path, then `<project_root>/freezer.toml`.
    /// Returns `None` when the built-in defaults apply.
    pub fn locate(explicit: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let project_file = project_root.join(PROJECT_RULES_FILE);
        project_file.is_file().then_some(project_file)
    }

    /// Load rules for a project, falling back to the defaults.
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self, RulesError> {
        match Self::locate(explicit, project_root) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No rules file found, using built-in defaults");
                Ok(BundleRules::default())
            }
        }
    }

    /// Load rules from a TOML file. Missing keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, RulesError> {
        debug!("Loading bundle rules from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| RulesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, RulesError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Bundle name, from the explicit setting or the entry script's stem.
    pub fn bundle_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        Path::new(&self.entry_script)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "app".to_string())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
