//! Operator-facing summary printed after resolution

use std::fmt;

use crate::plugins::PluginResolution;
use crate::resolver::Resolution;
use crate::types::ResourceKind;

/// Plain-text summary of a [`Resolution`]
pub struct Summary<'a> {
    resolution: &'a Resolution,
}

impl<'a> Summary<'a> {
    pub fn new(resolution: &'a Resolution) -> Self {
        Summary { resolution }
    }

    pub fn environment_line(&self) -> String {
        match &self.resolution.manifest.environment {
            Some(env) => env.display().to_string(),
            None => "not found".to_string(),
        }
    }
}

fn join_or_none<'b>(names: impl Iterator<Item = &'b str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let manifest = &self.resolution.manifest;

        writeln!(f, "Environment: {}", self.environment_line())?;
        writeln!(
            f,
            "Excluded directories (place next to the executable manually): {}",
            join_or_none(manifest.excludes.dirs.iter().map(String::as_str))
        )?;
        writeln!(
            f,
            "Excluded files: {}",
            join_or_none(manifest.excludes.files.iter().map(String::as_str))
        )?;
        writeln!(
            f,
            "Included resources: {}",
            join_or_none(
                manifest
                    .entries_of(ResourceKind::Core)
                    .map(|e| e.dest.as_str())
            )
        )?;

        match &self.resolution.plugins {
            PluginResolution::Resolved { root, entries } if entries.is_empty() => writeln!(
                f,
                "Toolkit plugins: all excluded from {}",
                root.display()
            )?,
            PluginResolution::Resolved { root, entries } => writeln!(
                f,
                "Toolkit plugins: {} from {}",
                join_or_none(entries.iter().filter_map(|e| e.category.as_deref())),
                root.display()
            )?,
            PluginResolution::NoMatch { .. } => writeln!(f, "Toolkit plugins: none found")?,
            PluginResolution::ToolkitUnavailable { reason } => {
                writeln!(f, "Toolkit plugins: skipped ({})", reason)?
            }
        }

        if !self.resolution.dropped.is_empty() {
            writeln!(
                f,
                "Dropped by exclusion rules: {}",
                join_or_none(self.resolution.dropped.iter().map(|e| e.dest.as_str()))
            )?;
        }

        write!(f, "Hidden imports: {}", manifest.hidden_imports.len())
    }
}
