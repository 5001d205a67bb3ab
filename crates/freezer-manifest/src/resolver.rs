//! Manifest resolution
//!
//! A single pass over the project tree and the dependency environment:
//!
//! 1. core resource directories (`models/`)
//! 2. documentation files copied to the bundle root
//! 3. dependency runtime assets the import scan cannot see
//! 4. GUI toolkit plugins from one installation
//!
//! The collected entries then go through the exclusion filter, and the
//! hidden-import set is built from the toolkit's submodules plus the
//! configured list.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use freezer_config::venv_paths::{detect_environment_root, resolve_site_packages};
use freezer_config::{AssetAnchor, BundleRules, ThirdPartyAsset};

use crate::errors::ResolveError;
use crate::exclusions::{self, ExclusionSet};
use crate::plugins::{self, PluginResolution};
use crate::probe;
use crate::toolkit::{self, ToolkitError};
use crate::types::{BundleManifest, HiddenImportSet, ResourceEntry, ResourceKind, BUNDLE_ROOT};

/// Result of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub manifest: BundleManifest,
    pub plugins: PluginResolution,
    /// Entries removed because they reached an excluded name
    pub dropped: Vec<ResourceEntry>,
}

impl Resolution {
    pub fn has_plugins(&self) -> bool {
        !self.plugins.entries().is_empty()
    }

    pub fn toolkit_unavailable(&self) -> bool {
        matches!(self.plugins, PluginResolution::ToolkitUnavailable { .. })
    }
}

/// One directory per present core name, mapped to its own name.
pub fn resolve_core_resources(project_root: &Path, core_dirs: &[String]) -> Vec<ResourceEntry> {
    core_dirs
        .iter()
        .filter_map(|name| {
            let source = project_root.join(name);
            probe::exists(&source).then(|| ResourceEntry::new(source, name, ResourceKind::Core))
        })
        .collect()
}

/// One entry per present documentation file, mapped to the bundle root.
pub fn resolve_doc_files(project_root: &Path, doc_files: &[String]) -> Vec<ResourceEntry> {
    doc_files
        .iter()
        .filter_map(|name| {
            let source = project_root.join(name);
            probe::exists(&source)
                .then(|| ResourceEntry::new(source, BUNDLE_ROOT, ResourceKind::Doc))
        })
        .collect()
}

/// The asset's directory inside the environment, if the environment has it.
pub fn resolve_third_party_asset(
    environment_root: Option<&Path>,
    asset: &ThirdPartyAsset,
) -> Option<ResourceEntry> {
    let environment_root = environment_root?;

    let base = match asset.anchor {
        AssetAnchor::Environment => environment_root.to_path_buf(),
        AssetAnchor::SitePackages => match resolve_site_packages(environment_root) {
            Ok(site) => site,
            Err(e) => {
                debug!("Skipping asset {}: {}", asset.path, e);
                return None;
            }
        },
    };

    let source = base.join(&asset.path);
    probe::exists(&source)
        .then(|| ResourceEntry::new(source, asset.dest.as_str(), ResourceKind::ThirdParty))
}

/// Union of the toolkit's submodules and the configured module names.
pub fn build_hidden_import_set<I, S>(toolkit_modules: I, fixed_modules: &[String]) -> HiddenImportSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    toolkit_modules
        .into_iter()
        .map(Into::into)
        .chain(fixed_modules.iter().cloned())
        .collect()
}

/// Resolves the bundle manifest for one project
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    rules: BundleRules,
    project_root: PathBuf,
    environment_root: Option<PathBuf>,
    active_environment: Option<PathBuf>,
    interpreter: Option<PathBuf>,
}

impl ManifestResolver {
    pub fn new(project_root: impl Into<PathBuf>, rules: BundleRules) -> Self {
        ManifestResolver {
            rules,
            project_root: project_root.into(),
            environment_root: None,
            active_environment: None,
            interpreter: None,
        }
    }

    /// Use an explicit dependency environment instead of auto-detection.
    ///
    /// A path that is not a directory is dropped with a warning, leaving the
    /// environment to [`Self::detect_environment`].
    pub fn with_environment_root(mut self, environment_root: Option<PathBuf>) -> Self {
        self.environment_root = environment_root.filter(|env| {
            let present = probe::is_dir(env);
            if !present {
                warn!("Dependency environment {} does not exist, ignoring it", env.display());
            }
            present
        });
        self
    }

    /// Fill in the environment root from the project's environment dirs, if unset.
    pub fn detect_environment(mut self) -> Self {
        if self.environment_root.is_none() {
            self.environment_root =
                detect_environment_root(&self.project_root, &self.rules.environment_dirs);
        }
        self
    }

    pub fn with_active_environment(mut self, active_environment: Option<PathBuf>) -> Self {
        self.active_environment = active_environment;
        self
    }

    /// Locate the toolkit by importing it with this interpreter.
    pub fn with_interpreter(mut self, interpreter: Option<PathBuf>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn rules(&self) -> &BundleRules {
        &self.rules
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn environment_root(&self) -> Option<&Path> {
        self.environment_root.as_deref()
    }

    pub fn entry_script(&self) -> PathBuf {
        self.project_root.join(&self.rules.entry_script)
    }

    pub fn resolve_core_resources(&self) -> Vec<ResourceEntry> {
        resolve_core_resources(&self.project_root, &self.rules.core_dirs)
    }

    pub fn resolve_doc_files(&self) -> Vec<ResourceEntry> {
        resolve_doc_files(&self.project_root, &self.rules.doc_files)
    }

    pub fn resolve_third_party_assets(&self) -> Vec<ResourceEntry> {
        self.rules
            .third_party_assets
            .iter()
            .filter_map(|asset| resolve_third_party_asset(self.environment_root(), asset))
            .collect()
    }

    pub fn list_exclusions(&self) -> ExclusionSet {
        ExclusionSet::from_rules(&self.rules)
    }

    fn active_site_packages(&self) -> Option<PathBuf> {
        let active = self.active_environment.as_deref()?;
        resolve_site_packages(active)
            .map_err(|e| debug!("Active environment unusable: {}", e))
            .ok()
    }

    fn environment_site_packages(&self) -> Option<PathBuf> {
        let environment = self.environment_root()?;
        resolve_site_packages(environment)
            .map_err(|e| debug!("Environment site-packages unusable: {}", e))
            .ok()
    }

    /// Locate the toolkit package directory.
    ///
    /// Tries the interpreter first when one is set, then the active and the
    /// dependency environments' site-packages.
    pub fn locate_toolkit(&self) -> Result<PathBuf, ToolkitError> {
        let package = &self.rules.toolkit.package;

        if let Some(python) = &self.interpreter {
            match toolkit::locate_with_interpreter(python, package) {
                Ok(dir) => return Ok(dir),
                Err(e) => debug!("{}", e),
            }
        }

        let site_dirs: Vec<PathBuf> = [self.active_site_packages(), self.environment_site_packages()]
            .into_iter()
            .flatten()
            .collect();
        toolkit::locate_in_site_packages(package, &site_dirs)
    }

    pub fn plugin_candidate_roots(&self, toolkit_dir: &Path) -> Vec<PathBuf> {
        plugins::candidate_roots(
            &self.rules.toolkit,
            Some(toolkit_dir),
            self.active_site_packages().as_deref(),
            self.environment_site_packages().as_deref(),
        )
    }

    /// Plugin discovery; a missing toolkit is a warning, never an error.
    pub fn resolve_plugin_assets(&self, toolkit: &Result<PathBuf, ToolkitError>) -> PluginResolution {
        let toolkit_dir = match toolkit {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Skipping GUI toolkit plugins: {}", e);
                return PluginResolution::ToolkitUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        let candidates = self.plugin_candidate_roots(toolkit_dir);
        match plugins::resolve_plugin_assets(
            &candidates,
            &self.rules.toolkit.plugin_categories,
            &self.rules.toolkit.plugin_dest,
        ) {
            Some((root, entries)) => PluginResolution::Resolved { root, entries },
            None => {
                warn!(
                    "No {} plugin directories found in {} candidate locations",
                    self.rules.toolkit.package,
                    candidates.len()
                );
                PluginResolution::NoMatch { candidates }
            }
        }
    }

    pub fn build_hidden_import_set(&self, toolkit: &Result<PathBuf, ToolkitError>) -> HiddenImportSet {
        let toolkit_modules = match toolkit {
            Ok(dir) => toolkit::enumerate_submodules(&self.rules.toolkit.package, dir),
            Err(_) => Default::default(),
        };
        build_hidden_import_set(toolkit_modules, &self.rules.hidden_imports)
    }

    fn resolve_icon(&self) -> Option<PathBuf> {
        let icon = self.project_root.join(self.rules.icon.as_ref()?);
        probe::is_file(&icon).then_some(icon)
    }

    /// Run the full resolution.
    ///
    /// Fails only when the project root or the entry script is missing.
    pub fn resolve(&self) -> Result<Resolution, ResolveError> {
        if !probe::is_dir(&self.project_root) {
            return Err(ResolveError::ProjectRootMissing {
                path: self.project_root.clone(),
            });
        }

        let entry_script = self.entry_script();
        if !probe::is_file(&entry_script) {
            return Err(ResolveError::EntryScriptMissing { path: entry_script });
        }

        info!("Resolving bundle for {}", entry_script.display());
        match self.environment_root() {
            Some(env) => info!("Dependency environment: {}", env.display()),
            None => info!("No dependency environment, skipping environment lookups"),
        }

        let toolkit = self.locate_toolkit();
        let plugins = self.resolve_plugin_assets(&toolkit);

        let mut candidates = self.resolve_core_resources();
        candidates.extend(self.resolve_doc_files());
        candidates.extend(self.resolve_third_party_assets());
        candidates.extend(plugins.entries().iter().cloned());

        let excludes = self.list_exclusions();
        let (datas, dropped) = exclusions::enforce(candidates, &excludes);
        let plugins = plugins.retain_kept(&datas);

        let mut manifest =
            BundleManifest::new(self.rules.bundle_name(), &self.project_root, &entry_script);
        manifest.environment = self.environment_root.clone();
        manifest.console = self.rules.console;
        manifest.icon = self.resolve_icon();
        manifest.hidden_imports = self.build_hidden_import_set(&toolkit);
        manifest.excludes = excludes;
        manifest.datas = datas;

        info!(
            "Resolved {} resources and {} hidden imports",
            manifest.datas.len(),
            manifest.hidden_imports.len()
        );

        Ok(Resolution {
            manifest,
            plugins,
            dropped,
        })
    }
}
