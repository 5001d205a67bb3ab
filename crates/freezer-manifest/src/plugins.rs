//! GUI toolkit runtime plugin discovery
//!
//! Plugin directories (platform and image-format backends) must come from a
//! single installation. Candidate roots are probed in priority order and the
//! first root holding any plugin category wins; later roots are never
//! consulted, even when the winner lacks a category.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use freezer_config::ToolkitRules;

use crate::probe;
use crate::types::ResourceEntry;

/// Outcome of plugin discovery for one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginResolution {
    /// Plugins taken from `root`
    Resolved {
        root: PathBuf,
        entries: Vec<ResourceEntry>,
    },
    /// Toolkit located, but no candidate root holds any plugin category
    NoMatch { candidates: Vec<PathBuf> },
    /// Toolkit package could not be located; plugins skipped
    ToolkitUnavailable { reason: String },
}

impl PluginResolution {
    pub fn entries(&self) -> &[ResourceEntry] {
        match self {
            PluginResolution::Resolved { entries, .. } => entries,
            _ => &[],
        }
    }

    pub fn root(&self) -> Option<&Path> {
        match self {
            PluginResolution::Resolved { root, .. } => Some(root),
            _ => None,
        }
    }

    /// Keep only the entries that survived the exclusion filter.
    ///
    /// The root stays recorded even when every category was excluded.
    #[must_use]
    pub fn retain_kept(self, kept: &[ResourceEntry]) -> Self {
        match self {
            PluginResolution::Resolved { root, entries } => PluginResolution::Resolved {
                root,
                entries: entries.into_iter().filter(|e| kept.contains(e)).collect(),
            },
            other => other,
        }
    }
}

/// Ordered plugin candidate roots.
///
/// Sources, highest priority first: the located toolkit package, the active
/// environment's site-packages, the dependency environment's site-packages.
/// Each source contributes every configured plugin dir; duplicates keep the
/// first position.
pub fn candidate_roots(
    rules: &ToolkitRules,
    toolkit_dir: Option<&Path>,
    active_site_packages: Option<&Path>,
    environment_site_packages: Option<&Path>,
) -> Vec<PathBuf> {
    let package_dirs = [
        toolkit_dir.map(Path::to_path_buf),
        active_site_packages.map(|site| site.join(&rules.package)),
        environment_site_packages.map(|site| site.join(&rules.package)),
    ];

    let mut roots: Vec<PathBuf> = Vec::new();
    for package_dir in package_dirs.iter().flatten() {
        for plugin_dir in &rules.plugin_dirs {
            let root = package_dir.join(plugin_dir);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
    }
    roots
}

/// Commit to the first candidate root that holds any category.
///
/// Returns the root and one entry per category present under it, mapped to
/// `<dest_prefix>/<category>`.
pub fn resolve_plugin_assets(
    candidates: &[PathBuf],
    categories: &[String],
    dest_prefix: &str,
) -> Option<(PathBuf, Vec<ResourceEntry>)> {
    for root in candidates {
        if !probe::is_dir(root) {
            debug!("Plugin candidate missing: {}", root.display());
            continue;
        }

        let entries: Vec<ResourceEntry> = categories
            .iter()
            .filter_map(|category| {
                let source = root.join(category);
                probe::is_dir(&source).then(|| {
                    ResourceEntry::plugin(source, plugin_dest(dest_prefix, category), category)
                })
            })
            .collect();

        if entries.is_empty() {
            debug!("Plugin candidate has no categories: {}", root.display());
            continue;
        }

        info!(
            "Using {} plugin categories from {}",
            entries.len(),
            root.display()
        );
        return Some((root.clone(), entries));
    }
    None
}

fn plugin_dest(prefix: &str, category: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        category.to_string()
    } else {
        format!("{}/{}", prefix, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn categories() -> Vec<String> {
        vec!["platforms".to_string(), "imageformats".to_string()]
    }

    fn make_root(base: &Path, name: &str, present: &[&str]) -> Option<PathBuf> {
        let root = base.join(name);
        fs::create_dir_all(&root).ok()?;
        for category in present {
            fs::create_dir_all(root.join(category)).ok()?;
        }
        Some(root)
    }

    #[test]
    fn test_first_root_wins_without_mixing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let Some(a) = make_root(temp_dir.path(), "a", &["platforms"]) else {
            return;
        };
        let Some(b) = make_root(temp_dir.path(), "b", &["platforms", "imageformats"]) else {
            return;
        };

        let result = resolve_plugin_assets(&[a.clone(), b.clone()], &categories(), "PyQt5/Qt5/plugins");
        let Some((root, entries)) = result else {
            panic!("expected plugins from the first root");
        };
        assert_eq!(root, a);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, a.join("platforms"));
        assert_eq!(entries[0].dest, "PyQt5/Qt5/plugins/platforms");
        assert!(entries.iter().all(|e| !e.source.starts_with(&b)));
    }

    #[test]
    fn test_missing_and_empty_roots_are_skipped() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let missing = temp_dir.path().join("missing");
        let Some(empty) = make_root(temp_dir.path(), "empty", &[]) else {
            return;
        };
        let Some(full) = make_root(temp_dir.path(), "full", &["platforms", "imageformats"]) else {
            return;
        };

        let result = resolve_plugin_assets(&[missing, empty, full.clone()], &categories(), "plugins");
        let Some((root, entries)) = result else {
            panic!("expected plugins from the full root");
        };
        assert_eq!(root, full);
        let dests: Vec<&str> = entries.iter().map(|e| e.dest.as_str()).collect();
        assert_eq!(dests, vec!["plugins/platforms", "plugins/imageformats"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let Some(a) = make_root(temp_dir.path(), "a", &["imageformats"]) else {
            return;
        };
        let candidates = vec![temp_dir.path().join("none"), a];
        let first = resolve_plugin_assets(&candidates, &categories(), "p");
        let second = resolve_plugin_assets(&candidates, &categories(), "p");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_candidates_match() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = resolve_plugin_assets(&[temp_dir.path().join("x")], &categories(), "p");
        assert!(result.is_none());
    }

    #[test]
    fn test_candidate_roots_priority_and_dedup() {
        let rules = ToolkitRules::default();
        let toolkit = PathBuf::from("/env/site/PyQt5");
        let active = PathBuf::from("/active/site");
        let env_site = PathBuf::from("/env/site");

        let roots = candidate_roots(&rules, Some(&toolkit), Some(&active), Some(&env_site));
        assert_eq!(
            roots,
            vec![
                PathBuf::from("/env/site/PyQt5/Qt5/plugins"),
                PathBuf::from("/env/site/PyQt5/Qt/plugins"),
                PathBuf::from("/active/site/PyQt5/Qt5/plugins"),
                PathBuf::from("/active/site/PyQt5/Qt/plugins"),
            ]
        );
    }

    #[test]
    fn test_candidate_roots_without_environment() {
        let rules = ToolkitRules::default();
        let roots = candidate_roots(&rules, None, None, None);
        assert!(roots.is_empty());
    }
}
