//! Configuration for the freezer bundle resolver
//!
//! - [`rules`]: the `BundleRules` structure describing what a bundle contains
//! - [`venv_paths`]: platform-specific layout of Python virtual environments

pub mod rules;
pub mod venv_paths;

pub use rules::{AssetAnchor, BundleRules, RulesError, ThirdPartyAsset, ToolkitRules};
