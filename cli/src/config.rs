//! Configuration management for the LeadFive CLI
//!
//! Every value has a default and can be overridden through an environment
//! variable.

use std::{env, path::PathBuf};

/// Centralized configuration for the LeadFive CLI
#[derive(Debug, Clone)]
pub struct LeadFiveCliConfig {
    /// Ledger snapshot file used when `--state` is not given
    pub state_path: PathBuf,

    /// Default output format for CLI commands
    pub default_output_format: String,

    /// Token decimals divisor for converting base units to display units
    pub token_decimals_divisor: u64,

    /// Divisor turning basis points into a percentage
    pub basis_points_divisor: f64,
}

impl LeadFiveCliConfig {
    /// Create a new configuration instance with values from environment variables
    /// or defaults if not set
    #[must_use]
    pub fn new() -> Self {
        Self {
            state_path: env::var("LEADFIVE_STATE_PATH")
                .map_or_else(|_| PathBuf::from("leadfive-ledger.bin"), PathBuf::from),

            default_output_format: env::var("LEADFIVE_DEFAULT_OUTPUT_FORMAT")
                .unwrap_or_else(|_| "human".to_string()),

            token_decimals_divisor: env::var("LEADFIVE_TOKEN_DECIMALS_DIVISOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|divisor| *divisor > 0)
                .unwrap_or(1_000_000),

            basis_points_divisor: env::var("BASIS_POINTS_DIVISOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100.0),
        }
    }

    /// Convert token base units to display units
    #[allow(clippy::cast_precision_loss)] // Acceptable for display formatting
    #[must_use]
    pub fn format_tokens(&self, base_units: u64) -> f64 {
        base_units as f64 / self.token_decimals_divisor as f64
    }

    /// Convert basis points to percentage
    #[must_use]
    pub fn format_bps_percentage(&self, bps: u16) -> f64 {
        f64::from(bps) / self.basis_points_divisor
    }
}

impl Default for LeadFiveCliConfig {
    fn default() -> Self {
        Self::new()
    }
}
