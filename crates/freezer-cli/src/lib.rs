//! freezer library - expose command handlers for testing

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use freezer_logger as logger;
