//! Error types for the freezer CLI

use freezer_config::RulesError;
use freezer_manifest::{ManifestError, ResolveError};
use std::io;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No Python interpreter found in the environment or on PATH")]
    NoInterpreter,
}
