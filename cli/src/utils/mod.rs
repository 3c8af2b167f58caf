//! Shared helpers for CLI commands

pub mod formatting;

use std::str::FromStr;

use anchor_lang::prelude::Pubkey;

use crate::error::{CliError, Result};

/// Parse a base58 address supplied on the command line
///
/// # Errors
/// Returns `InvalidArgument` naming `field` when `value` is not a valid pubkey.
pub fn parse_pubkey(field: &'static str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|e| CliError::InvalidArgument {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
