use anchor_lang::prelude::*;

use crate::constants::BASIS_POINTS_DIVISOR;
use crate::errors::LedgerError;

/// Computes `amount × bps / 10_000`, rounding down.
///
/// Uses a `u128` intermediate so the multiplication cannot overflow, then converts
/// back to `u64` with an explicit check.
///
/// # Errors
///
/// Returns `ArithmeticError` if the result does not fit in a `u64` (only possible
/// when `bps > 10_000`).
///
/// # Usage
///
/// ```ignore
/// let fee = bps_of(80_000_000, 500)?; // 5% of 80 USDT
/// assert_eq!(fee, 4_000_000);
/// ```
pub fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let scaled = u128::from(amount)
        .checked_mul(u128::from(bps))
        .ok_or(LedgerError::ArithmeticError)?
        .checked_div(BASIS_POINTS_DIVISOR)
        .ok_or(LedgerError::ArithmeticError)?;
    u64::try_from(scaled).map_err(|_| LedgerError::ArithmeticError.into())
}

/// Checked `a + b`.
pub fn add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or_else(|| LedgerError::ArithmeticError.into())
}

/// Checked `a - b`.
pub fn sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or_else(|| LedgerError::ArithmeticError.into())
}

/// Checked `a × b`.
pub fn mul(a: u64, b: u64) -> Result<u64> {
    a.checked_mul(b).ok_or_else(|| LedgerError::ArithmeticError.into())
}

/// Checked `a / b` (zero divisor is an arithmetic error).
pub fn div(a: u64, b: u64) -> Result<u64> {
    a.checked_div(b).ok_or_else(|| LedgerError::ArithmeticError.into())
}

/// Sums a sequence of amounts with overflow checking.
pub fn checked_sum<I>(amounts: I) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
{
    amounts.into_iter().try_fold(0_u64, add)
}

/// Seconds elapsed between two timestamps; negative spans clamp to zero.
#[must_use]
pub fn elapsed_secs(since: i64, now: i64) -> u64 {
    u64::try_from(now.saturating_sub(since)).unwrap_or(0)
}
