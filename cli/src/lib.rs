//! LeadFive CLI library
//!
//! This module exports the CLI functionality for testing and potential library use.

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod error;
pub mod store;
pub mod utils;

// Re-export for easy access
pub use commands::*;
pub use config::*;
pub use error::{CliError, Result};
pub use store::StateStore;
pub use utils::formatting::OutputFormat;
