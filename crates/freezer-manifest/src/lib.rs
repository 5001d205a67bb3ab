//! Bundle manifest resolution
//!
//! Decides what a packaged application bundle contains: resource
//! directories, documentation, dependency runtime assets, GUI toolkit
//! plugins and hidden imports. The manifest is handed to an external
//! packaging tool; nothing here copies or builds anything.

pub mod errors;
pub mod exclusions;
pub mod manifest_writer;
pub mod plugins;
mod probe;
pub mod resolver;
pub mod summary;
pub mod toolkit;
pub mod types;

pub use errors::{ManifestError, ResolveError};
pub use exclusions::ExclusionSet;
pub use manifest_writer::{write_to_path, ManifestFormat};
pub use plugins::PluginResolution;
pub use resolver::{ManifestResolver, Resolution};
pub use summary::Summary;
pub use types::{BundleManifest, HiddenImportSet, ResourceEntry, ResourceKind};
