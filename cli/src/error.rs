//! Error types for the LeadFive CLI
//!
//! Engine failures arrive as Anchor errors carrying a 6000-based code. The CLI
//! maps known codes back to their [`LedgerError`] variant so callers can match
//! on them and JSON output can report the code:
//!
//! - **6004**: `InsufficientBalance` - Withdrawal larger than the withdrawable balance
//! - **6006**: `SystemPaused` - Purchases and withdrawals are halted
//! - **6007**: `CircuitBreakerTriggered` - Daily withdrawal volume limit reached
//! - **6008**: `TooEarly` - Pool distribution interval has not elapsed
//! - **6009**: `Unauthorized` - Signer is not an admin

use std::path::PathBuf;

use leadfive_program::errors::LedgerError;
use thiserror::Error;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error types that can occur when running a CLI command
#[derive(Error, Debug)]
pub enum CliError {
    /// A ledger operation was rejected
    #[error("{error:?} ({code}): {error}", code = .error.code())]
    Ledger { error: LedgerError },

    /// Anchor error outside the ledger's own codes (snapshot encoding and the like)
    #[error("Engine error {code}: {message}")]
    Engine { code: u32, message: String },

    /// Raw program error without a custom code
    #[error("Program error: {0}")]
    Program(String),

    #[error("No ledger state at {}; run `leadfive-cli init` first", .0.display())]
    StateNotFound(PathBuf),

    #[error("Ledger state already exists at {}; pass --force to overwrite", .0.display())]
    StateExists(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Numeric engine code, when the failure came from the engine.
    #[must_use]
    pub const fn code(&self) -> Option<u32> {
        match self {
            Self::Ledger { error } => Some(error.code()),
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The ledger variant, when the failure is one of the ledger's own codes.
    #[must_use]
    pub const fn ledger_error(&self) -> Option<LedgerError> {
        match self {
            Self::Ledger { error } => Some(*error),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<anchor_lang::error::Error> for CliError {
    fn from(err: anchor_lang::error::Error) -> Self {
        match err {
            anchor_lang::error::Error::AnchorError(anchor_err) => {
                LedgerError::from_code(anchor_err.error_code_number).map_or_else(
                    || Self::Engine {
                        code: anchor_err.error_code_number,
                        message: anchor_err.error_msg.clone(),
                    },
                    |error| Self::Ledger { error },
                )
            }
            anchor_lang::error::Error::ProgramError(program_err) => {
                Self::Program(format!("{:?}", program_err.program_error))
            }
        }
    }
}
