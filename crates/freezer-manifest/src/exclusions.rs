//! User-editable names that stay outside the bundle
//!
//! The inclusion rules never mention these names, and [`enforce`] removes
//! any entry that reaches them anyway, so a new inclusion rule cannot
//! silently ship a user's configuration inside the executable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Component;
use tracing::warn;

use freezer_config::BundleRules;

use crate::types::ResourceEntry;

/// Directory and file names that never become part of the bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    #[serde(default)]
    pub dirs: BTreeSet<String>,
    #[serde(default)]
    pub files: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn from_rules(rules: &BundleRules) -> Self {
        ExclusionSet {
            dirs: rules.excluded_dirs.iter().cloned().collect(),
            files: rules.excluded_files.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    /// The excluded name an entry collides with, if any.
    ///
    /// A directory name matches any component of the entry's bundle path; a
    /// file name matches the last component.
    pub fn matching(&self, entry: &ResourceEntry) -> Option<&str> {
        let bundle_path = entry.bundle_path();
        let components: Vec<String> = bundle_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        if let Some(dir) = components
            .iter()
            .find_map(|part| self.dirs.get(part.as_str()))
        {
            return Some(dir.as_str());
        }

        components
            .last()
            .and_then(|last| self.files.get(last.as_str()))
            .map(String::as_str)
    }

    pub fn is_excluded(&self, entry: &ResourceEntry) -> bool {
        self.matching(entry).is_some()
    }
}

/// Split entries into those kept and those removed by the exclusion set.
///
/// Order of the kept entries is preserved.
pub fn enforce(
    entries: Vec<ResourceEntry>,
    exclusions: &ExclusionSet,
) -> (Vec<ResourceEntry>, Vec<ResourceEntry>) {
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();

    for entry in entries {
        match exclusions.matching(&entry) {
            Some(name) => {
                warn!(
                    "Dropping {} -> {}: '{}' is excluded from the bundle",
                    entry.source.display(),
                    entry.dest,
                    name
                );
                dropped.push(entry);
            }
            None => kept.push(entry),
        }
    }

    (kept, dropped)
}
