//! Types describing a bundle manifest
//!
//! A manifest is the hand-off to the external packaging tool: which files to
//! copy into the bundle and where, which modules to force-import, and the
//! names that are deliberately left out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::exclusions::ExclusionSet;

/// Manifest format version written into every manifest
pub const MANIFEST_VERSION: &str = "1.0";

/// Destination meaning "bundle root, keep the source's file name"
pub const BUNDLE_ROOT: &str = ".";

/// Module names the packaging tool must include despite static analysis
pub type HiddenImportSet = BTreeSet<String>;

/// Why an entry is in the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Application resource directory from the project root
    Core,
    /// Documentation file copied to the bundle root
    Doc,
    /// Runtime assets of a dependency
    ThirdParty,
    /// GUI toolkit runtime plugin directory
    Plugin,
}

/// One file or directory copied verbatim into the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub source: PathBuf,
    pub dest: String,
    pub kind: ResourceKind,
    /// Plugin category, only set for [`ResourceKind::Plugin`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ResourceEntry {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<String>, kind: ResourceKind) -> Self {
        ResourceEntry {
            source: source.into(),
            dest: dest.into(),
            kind,
            category: None,
        }
    }

    pub fn plugin(
        source: impl Into<PathBuf>,
        dest: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        ResourceEntry {
            source: source.into(),
            dest: dest.into(),
            kind: ResourceKind::Plugin,
            category: Some(category.into()),
        }
    }

    /// Path the entry occupies inside the bundle.
    ///
    /// A `.` destination keeps the source's file name at the bundle root.
    pub fn bundle_path(&self) -> PathBuf {
        if self.dest == BUNDLE_ROOT {
            return self
                .source
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
        }
        PathBuf::from(&self.dest)
    }

    pub fn is_plugin(&self) -> bool {
        self.kind == ResourceKind::Plugin
    }
}

/// Top-level manifest consumed by the packaging tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub version: String,
    pub generated_at: String,
    pub name: String,
    pub entry_script: PathBuf,
    pub project_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<PathBuf>,
    /// Attach an interactive console to the executable
    pub console: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub hidden_imports: HiddenImportSet,
    /// Documentary only; these names never appear in `datas`
    #[serde(default)]
    pub excludes: ExclusionSet,
    #[serde(default)]
    pub datas: Vec<ResourceEntry>,
}

impl BundleManifest {
    pub fn new(name: impl Into<String>, project_root: &Path, entry_script: &Path) -> Self {
        BundleManifest {
            version: MANIFEST_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            name: name.into(),
            entry_script: entry_script.to_path_buf(),
            project_root: project_root.to_path_buf(),
            environment: None,
            console: true,
            icon: None,
            hidden_imports: HiddenImportSet::new(),
            excludes: ExclusionSet::default(),
            datas: Vec::new(),
        }
    }

    pub fn plugin_entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.datas.iter().filter(|e| e.is_plugin())
    }

    pub fn entries_of(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceEntry> {
        self.datas.iter().filter(move |e| e.kind == kind)
    }
}
