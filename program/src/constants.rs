//! Program constants
//!
//! Mathematical and protocol constants used throughout the compensation engine.
//! Values that operators may tune live in [`crate::state::Config`]; the values here
//! are structural and never change for the life of a ledger.

/// Basis points divisor for percentage calculations
///
/// Basis points are a unit of measure for percentages, where 1 basis point = 0.01%.
/// This constant represents 10,000 basis points = 100%, used for every split.
///
/// # Examples
/// ```ignore
/// // 40% direct bonus (4000 basis points) on a 50 USDT package:
/// let price: u64 = 50_000_000;
/// let direct = (price as u128 * 4000) / BASIS_POINTS_DIVISOR;
/// // direct = 20_000_000
/// ```
pub const BASIS_POINTS_DIVISOR: u128 = 10_000;

/// Same divisor as a `u16`, for validating bps tables.
pub const BASIS_POINTS_TOTAL: u16 = 10_000;

/// Token base units per whole token (6 decimals, USDT-style).
pub const TOKEN_UNIT: u64 = 1_000_000;

/// Number of ancestors stored in a participant's upline chain.
pub const UPLINE_CHAIN_LEN: usize = 30;

/// Number of upline levels paid by the level bonus.
pub const LEVEL_BONUS_DEPTH: usize = 10;

/// Lifetime earnings cap as a multiple of cumulative package spend.
pub const EARNINGS_CAP_MULTIPLIER: u64 = 4;

/// Length of a UTC day in seconds (circuit breaker window).
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Default Leader and Help pool distribution interval (weekly).
pub const WEEKLY_INTERVAL_SECS: u64 = 604_800;

/// Default Club pool distribution interval (monthly).
pub const MONTHLY_INTERVAL_SECS: u64 = 2_592_000;

/// Default window in which a participant counts as active for the Help pool.
pub const DEFAULT_ACTIVITY_WINDOW_SECS: u64 = 2_592_000;

/// Default platform fee on the cash portion of a withdrawal (5%).
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 500;

/// Maximum platform fee an admin may configure (20%).
pub const MAX_PLATFORM_FEE_BPS: u16 = 2_000;

/// Bonus applied to the reinvested amount of auto-compounding participants (5%).
pub const DEFAULT_COMPOUND_BONUS_BPS: u16 = 500;

/// Default share of each payment carved from the help share into the Club pool (5%).
pub const DEFAULT_CLUB_BPS: u16 = 500;

/// Minimum package level for Club pool membership.
pub const DEFAULT_CLUB_MIN_LEVEL: u8 = 3;

/// Default daily circuit breaker threshold (1,000,000 USDT).
pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u64 = 1_000_000_000_000;

/// Reinvestment routing: share of the reinvested amount paid as level bonus.
pub const REINVEST_LEVEL_BPS: u16 = 4_000;

/// Reinvestment routing: share of the reinvested amount paid across the upline chain.
pub const REINVEST_UPLINE_BPS: u16 = 3_000;

/// Reinvestment routing: share of the reinvested amount accrued to the Help pool.
pub const REINVEST_HELP_BPS: u16 = 3_000;

/// Direct referral thresholds for the withdrawal tiers.
pub const TIER_MID_MIN_DIRECTS: u32 = 5;
pub const TIER_TOP_MIN_DIRECTS: u32 = 20;

/// Cash share (bps) of a withdrawal for each tier.
pub const TIER_BASE_WITHDRAW_BPS: u16 = 7_000;
pub const TIER_MID_WITHDRAW_BPS: u16 = 7_500;
pub const TIER_TOP_WITHDRAW_BPS: u16 = 8_000;

/// Leader rank qualification.
pub const SHINING_STAR_MIN_TEAM: u32 = 250;
pub const SHINING_STAR_MIN_DIRECTS: u32 = 10;
pub const SILVER_STAR_MIN_TEAM: u32 = 500;
