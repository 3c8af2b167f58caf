//! Execution context shared by every operation handler

use anchor_lang::prelude::*;

use crate::{errors::LedgerError, events::EventLog, state::{Ledger, Money}, Engine};

/// Caller identity and clock supplied by the host for one call
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub signer: Pubkey,
    pub unix_timestamp: i64,
}

impl Invocation {
    #[must_use]
    pub const fn new(signer: Pubkey, unix_timestamp: i64) -> Self {
        Self {
            signer,
            unix_timestamp,
        }
    }
}

/// Destination of an external token movement
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayoutKind {
    /// Cash portion of a withdrawal, net of the platform fee
    Withdrawal,
    /// Platform fee to the treasury
    PlatformFee,
}

/// Token transfer the host must perform
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub recipient: Pubkey,
    pub amount: Money,
    pub kind: PayoutKind,
}

/// Host callback for external transfers
///
/// Invoked at most once per call, with every payout of the call, after all
/// internal mutation is final. The host must perform the whole batch or none of
/// it: returning an error rolls the call back, so no transfer of a rejected
/// batch may have been made. The engine is lent read-only and reports
/// `is_in_flight() == true` for the duration.
pub trait PayoutHook {
    fn on_payouts(&mut self, engine: &Engine, payouts: &[Payout]) -> Result<()>;
}

/// Hook that accepts every payout without side effects
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPayoutHook;

impl PayoutHook for NoopPayoutHook {
    fn on_payouts(&mut self, _engine: &Engine, _payouts: &[Payout]) -> Result<()> {
        Ok(())
    }
}

/// Records payouts in order
impl PayoutHook for Vec<Payout> {
    fn on_payouts(&mut self, _engine: &Engine, payouts: &[Payout]) -> Result<()> {
        self.extend_from_slice(payouts);
        Ok(())
    }
}

/// Mutable view of the engine handed to an operation handler
pub struct ExecContext<'a> {
    pub ledger: &'a mut Ledger,
    pub events: &'a mut EventLog,
    pub payouts: &'a mut Vec<Payout>,
    pub invocation: Invocation,
}

impl ExecContext<'_> {
    #[must_use]
    pub const fn signer(&self) -> &Pubkey {
        &self.invocation.signer
    }

    #[must_use]
    pub const fn now(&self) -> i64 {
        self.invocation.unix_timestamp
    }

    /// # Errors
    /// Returns `Unauthorized` unless the signer is the authority or an admin.
    pub fn require_admin(&self) -> Result<()> {
        require!(
            self.ledger.config.is_admin(self.signer()),
            LedgerError::Unauthorized
        );
        Ok(())
    }

    /// # Errors
    /// Returns `SystemPaused` while the pause flag is set.
    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.ledger.config.paused, LedgerError::SystemPaused);
        Ok(())
    }

    /// Queues an external transfer; zero amounts are dropped.
    pub fn queue_payout(&mut self, recipient: Pubkey, amount: Money, kind: PayoutKind) {
        if amount > 0 {
            self.payouts.push(Payout {
                recipient,
                amount,
                kind,
            });
        }
    }
}
