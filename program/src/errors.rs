use anchor_lang::prelude::*;

/// Custom error codes for the compensation engine
///
/// Note: Anchor automatically assigns error codes starting from 6000.
/// Codes are part of the external interface; append new variants at the end.
#[error_code]
pub enum LedgerError {
    /// Error Code: 6000
    /// When a package level is not present in the catalog
    #[msg("Invalid package level. The requested level is not in the package catalog.")]
    InvalidLevel,

    /// Error Code: 6001
    /// When registering an address that already has a participant record
    #[msg("Participant is already registered.")]
    AlreadyRegistered,

    /// Error Code: 6002
    /// When the sponsor is neither registered nor the root bootstrap
    #[msg("Unknown sponsor. The sponsor must be a registered participant.")]
    UnknownSponsor,

    /// Error Code: 6003
    /// When the paid value does not equal the package price exactly
    #[msg("Payment value must equal the package price exactly.")]
    InsufficientPayment,

    /// Error Code: 6004
    /// When a withdrawal exceeds the withdrawable balance
    #[msg("Insufficient withdrawable balance for the requested amount.")]
    InsufficientBalance,

    /// Error Code: 6005
    /// When a blacklisted participant attempts a frozen operation
    #[msg("Participant is blacklisted and cannot perform this operation.")]
    Blacklisted,

    /// Error Code: 6006
    /// When payments or withdrawals are attempted while the system is paused
    #[msg("System is paused. Payments and withdrawals are halted.")]
    SystemPaused,

    /// Error Code: 6007
    /// When a withdrawal would push today's outflow above the breaker threshold
    #[msg("Circuit breaker triggered. Daily withdrawal volume limit reached.")]
    CircuitBreakerTriggered,

    /// Error Code: 6008
    /// When a pool distribution is requested before its interval elapsed
    #[msg("Pool distribution interval has not elapsed yet.")]
    TooEarly,

    /// Error Code: 6009
    /// When a non-admin calls an admin operation
    #[msg("Unauthorized access. Only an admin can perform this action.")]
    Unauthorized,

    /// Error Code: 6010
    /// When a mutating operation is entered while another is in flight
    #[msg("Reentrancy detected. A ledger operation is already in progress.")]
    ReentrancyDetected,

    /// Error Code: 6011
    /// When an address has no participant record
    #[msg("Participant not found. Register before performing this operation.")]
    ParticipantNotFound,

    /// Error Code: 6012
    /// When a monetary amount is zero or otherwise unusable
    #[msg("Invalid amount provided. Amount must be greater than zero.")]
    InvalidAmount,

    /// Error Code: 6013
    /// When a participant tries to purchase a lower package than the one held
    #[msg("Package downgrade is not allowed.")]
    DowngradeNotAllowed,

    /// Error Code: 6014
    /// When a withdrawal exceeds the per-participant daily limit
    #[msg("Withdrawal exceeds the per-participant daily limit.")]
    WithdrawalLimitExceeded,

    /// Error Code: 6015
    /// When catalog or configuration parameters are invalid or inconsistent
    #[msg("Invalid configuration parameters.")]
    InvalidConfiguration,

    /// Error Code: 6016
    /// When arithmetic operations would overflow/underflow
    #[msg("Arithmetic operation would result in overflow or underflow.")]
    ArithmeticError,

    /// Error Code: 6017
    /// When the credits of a cascade do not add up to the amount being split
    #[msg("Accounting mismatch. Distributed amounts do not sum to the input amount.")]
    AccountingMismatch,
}

impl LedgerError {
    /// Every variant in code order.
    pub const ALL: [Self; 18] = [
        Self::InvalidLevel,
        Self::AlreadyRegistered,
        Self::UnknownSponsor,
        Self::InsufficientPayment,
        Self::InsufficientBalance,
        Self::Blacklisted,
        Self::SystemPaused,
        Self::CircuitBreakerTriggered,
        Self::TooEarly,
        Self::Unauthorized,
        Self::ReentrancyDetected,
        Self::ParticipantNotFound,
        Self::InvalidAmount,
        Self::DowngradeNotAllowed,
        Self::WithdrawalLimitExceeded,
        Self::InvalidConfiguration,
        Self::ArithmeticError,
        Self::AccountingMismatch,
    ];

    /// Maps a numeric code back to its variant.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.code() == code)
    }

    /// Numeric code as reported to the host (6000-based).
    #[must_use]
    pub const fn code(self) -> u32 {
        anchor_lang::error::ERROR_CODE_OFFSET.saturating_add(self as u32)
    }

    /// Returns true if `error` carries this variant's code.
    #[must_use]
    pub fn matches(self, error: &anchor_lang::error::Error) -> bool {
        error_code(error) == Some(self.code())
    }
}

/// Extracts the numeric custom error code from an Anchor error, if any.
#[must_use]
pub fn error_code(error: &anchor_lang::error::Error) -> Option<u32> {
    match error {
        anchor_lang::error::Error::AnchorError(anchor_err) => Some(anchor_err.error_code_number),
        anchor_lang::error::Error::ProgramError(_) => None,
    }
}
