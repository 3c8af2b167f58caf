use anchor_lang::prelude::*;

use crate::{
    constants::SECONDS_PER_DAY,
    errors::LedgerError,
    state::Money,
    utils::add,
};

/// UTC day index of a unix timestamp.
#[must_use]
pub const fn utc_day(unix_timestamp: i64) -> i64 {
    unix_timestamp.div_euclid(SECONDS_PER_DAY)
}

/// Daily cash-outflow limit across all participants
///
/// The window is the UTC day. A withdrawal that would push the day's total above
/// `threshold` is rejected; the counter starts over on the next day. The window
/// only moves forward: a timestamp from an earlier day than the last recorded
/// one counts against the latest day.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitBreaker {
    pub threshold: Money,
    current_day: i64,
    withdrawn_today: Money,
}

/// Read-only view of the breaker at a point in time
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitBreakerStatus {
    pub threshold: Money,
    pub withdrawn_today: Money,
    pub remaining_today: Money,
    /// True when no further outflow fits in today's window
    pub tripped: bool,
}

impl CircuitBreaker {
    #[must_use]
    pub const fn new(threshold: Money) -> Self {
        Self {
            threshold,
            current_day: 0,
            withdrawn_today: 0,
        }
    }

    /// Outflow recorded for the window `now` falls in.
    #[must_use]
    pub const fn withdrawn_on(&self, now: i64) -> Money {
        if utc_day(now) > self.current_day {
            0
        } else {
            self.withdrawn_today
        }
    }

    #[must_use]
    pub const fn status(&self, now: i64) -> CircuitBreakerStatus {
        let withdrawn_today = self.withdrawn_on(now);
        let remaining_today = self.threshold.saturating_sub(withdrawn_today);
        CircuitBreakerStatus {
            threshold: self.threshold,
            withdrawn_today,
            remaining_today,
            tripped: remaining_today == 0,
        }
    }

    /// Adds `amount` to today's outflow.
    ///
    /// # Errors
    /// Returns `CircuitBreakerTriggered` if the new total would exceed the threshold.
    pub fn record(&mut self, now: i64, amount: Money) -> Result<()> {
        let day = utc_day(now).max(self.current_day);
        let post = add(self.withdrawn_on(now), amount)?;
        if post > self.threshold {
            tracing::warn!(
                threshold = self.threshold,
                attempted = post,
                "circuit breaker rejected withdrawal"
            );
            return Err(LedgerError::CircuitBreakerTriggered.into());
        }
        self.current_day = day;
        self.withdrawn_today = post;
        Ok(())
    }

    /// # Errors
    /// Returns `InvalidConfiguration` for a zero threshold.
    pub fn set_threshold(&mut self, threshold: Money) -> Result<()> {
        require!(threshold > 0, LedgerError::InvalidConfiguration);
        self.threshold = threshold;
        Ok(())
    }
}
