//! LeadFive Compensation & Distribution Engine
//!
//! A deterministic state machine for a participant-funded reward ledger. Members
//! pay into fixed-price packages; each payment is split across a referral
//! hierarchy and shared pools under a lifetime earnings cap. Earnings leave the
//! system through tiered withdrawals that reinvest part of every amount.
//!
//! ## Core Features
//! - Package catalog with per-package payment splits
//! - Binary matrix placement with breadth-first spillover and a 30-slot upline chain
//! - Bonus cascade (direct, level, upline, pools) with cap overflow to the Help pool
//! - Leader, Help, and Club pools with scheduled distribution
//! - Tiered withdrawals, platform fee, reinvestment, and auto-compounding
//! - Daily circuit breaker, manual pause, blacklist, and reentrancy guard
//!
//! Every mutating call is atomic: a failing call (or a failing payout hook)
//! leaves the ledger and the event log exactly as they were.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(unexpected_cfgs)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::needless_pass_by_value)] // Handlers take owned args for a uniform call shape
#![allow(clippy::module_name_repetitions)]

use anchor_lang::prelude::*;

pub mod breaker;
pub mod cascade;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod matrix;
pub mod pools;
pub mod queries;
pub mod runtime;
pub mod state;
pub mod utils;
pub mod withdrawal;

mod blacklist;
mod distribute_pool;
mod initialize;
mod pause;
mod purchase;
mod register;
mod set_admin;
mod set_auto_compound;
mod unpause;
mod update_config;
mod withdraw;

pub use blacklist::BlacklistArgs;
pub use distribute_pool::{DistributePoolArgs, PoolDistributionOutcome};
pub use initialize::InitializeArgs;
pub use pause::PauseArgs;
pub use purchase::{PurchaseArgs, PurchaseReceipt};
pub use register::RegisterArgs;
pub use set_admin::SetAdminArgs;
pub use set_auto_compound::SetAutoCompoundArgs;
pub use unpause::UnpauseArgs;
pub use update_config::UpdateConfigArgs;
pub use withdraw::{WithdrawArgs, WithdrawalReceipt};

use crate::{
    breaker::CircuitBreakerStatus,
    catalog::Package,
    errors::LedgerError,
    events::{EventLog, LedgerEvent},
    pools::{PoolBalances, PoolKind},
    queries::{PoolStatus, SystemHealth},
    runtime::{ExecContext, Invocation, NoopPayoutHook, Payout, PayoutHook},
    state::{LeaderRank, Ledger, Participant, UplineChain},
    withdrawal::WithdrawalSplit,
};

/// The engine: ledger state, buffered events, and the reentrancy guard
#[derive(Debug)]
pub struct Engine {
    ledger: Ledger,
    events: EventLog,
    in_flight: bool,
}

impl Engine {
    /// Initialize a new ledger with the signer as authority
    ///
    /// # Errors
    /// Returns an error if:
    /// - The package table is empty, has duplicate levels, zero prices, or splits
    ///   that do not sum to 10,000 bps
    /// - The level schedule does not sum to 10,000 bps
    /// - Root or treasury is the default key
    /// - Any interval, fee, or threshold is out of range
    pub fn initialize(invocation: Invocation, args: InitializeArgs) -> Result<Self> {
        let mut events = EventLog::new();
        let ledger = initialize::handler(invocation, args, &mut events)?;
        Ok(Self {
            ledger,
            events,
            in_flight: false,
        })
    }

    /// Resume from previously persisted state.
    #[must_use]
    pub const fn from_ledger(ledger: Ledger) -> Self {
        Self {
            ledger,
            events: EventLog::new(),
            in_flight: false,
        }
    }

    /// Serialize the ledger into a Borsh snapshot
    ///
    /// # Errors
    /// Returns `AccountDidNotSerialize` if serialization fails.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        AnchorSerialize::serialize(&self.ledger, &mut buf)
            .map_err(|_| anchor_lang::error::ErrorCode::AccountDidNotSerialize)?;
        Ok(buf)
    }

    /// Restore an engine from a Borsh snapshot
    ///
    /// # Errors
    /// Returns `AccountDidNotDeserialize` for malformed bytes.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let ledger =
            Ledger::try_from_slice(bytes).map_err(|_| anchor_lang::error::ErrorCode::AccountDidNotDeserialize)?;
        Ok(Self::from_ledger(ledger))
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Removes and returns every buffered event.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    /// True while a mutating call is in progress (observable from a payout hook).
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Register the signer under a sponsor without purchasing
    ///
    /// # Errors
    /// Returns an error if:
    /// - The signer is already registered
    /// - The sponsor is missing, unregistered, or blacklisted
    /// - Another call is in flight
    pub fn register(&mut self, invocation: Invocation, args: RegisterArgs) -> Result<()> {
        self.execute("register", invocation, &mut NoopPayoutHook, |ctx| {
            register::handler(ctx, args)
        })
    }

    /// Purchase a package; registers the payer on first purchase
    ///
    /// # Errors
    /// Returns an error if:
    /// - The system is paused
    /// - The level is unknown or `value` differs from the price
    /// - Registration fails for a new payer
    /// - The payer is blacklisted or attempts a downgrade
    /// - Another call is in flight
    pub fn purchase(&mut self, invocation: Invocation, args: PurchaseArgs) -> Result<PurchaseReceipt> {
        self.execute("purchase", invocation, &mut NoopPayoutHook, |ctx| {
            purchase::handler(ctx, args)
        })
    }

    /// Withdraw earnings; cash and fee are handed to `hook` as one batch
    ///
    /// # Errors
    /// Returns an error if:
    /// - The system is paused
    /// - The signer is unregistered or blacklisted
    /// - The amount is zero or exceeds the withdrawable balance
    /// - A daily limit would be exceeded
    /// - The payout hook fails
    /// - Another call is in flight
    pub fn withdraw(
        &mut self,
        invocation: Invocation,
        args: WithdrawArgs,
        hook: &mut dyn PayoutHook,
    ) -> Result<WithdrawalReceipt> {
        self.execute("withdraw", invocation, hook, |ctx| withdraw::handler(ctx, args))
    }

    /// Toggle auto-compounding for the signer
    ///
    /// # Errors
    /// Returns an error if the signer is unregistered or blacklisted.
    pub fn set_auto_compound(&mut self, invocation: Invocation, args: SetAutoCompoundArgs) -> Result<()> {
        self.execute("set_auto_compound", invocation, &mut NoopPayoutHook, |ctx| {
            set_auto_compound::handler(ctx, args)
        })
    }

    /// Distribute a pool to its eligible participants (admin only)
    ///
    /// # Errors
    /// Returns an error if:
    /// - The signer is not an admin
    /// - The pool's distribution interval has not elapsed
    pub fn distribute_pool(
        &mut self,
        invocation: Invocation,
        args: DistributePoolArgs,
    ) -> Result<PoolDistributionOutcome> {
        self.execute("distribute_pool", invocation, &mut NoopPayoutHook, |ctx| {
            distribute_pool::handler(ctx, args)
        })
    }

    /// Halt purchases and withdrawals (admin only)
    ///
    /// # Errors
    /// Returns an error if the signer is not an admin.
    pub fn pause(&mut self, invocation: Invocation) -> Result<()> {
        self.execute("pause", invocation, &mut NoopPayoutHook, |ctx| {
            pause::handler(ctx, PauseArgs {})
        })
    }

    /// Resume purchases and withdrawals (admin only)
    ///
    /// # Errors
    /// Returns an error if the signer is not an admin.
    pub fn unpause(&mut self, invocation: Invocation) -> Result<()> {
        self.execute("unpause", invocation, &mut NoopPayoutHook, |ctx| {
            unpause::handler(ctx, UnpauseArgs {})
        })
    }

    /// Set or clear a participant's blacklist flag (admin only)
    ///
    /// # Errors
    /// Returns an error if:
    /// - The signer is not an admin
    /// - The participant is unknown or is the root
    pub fn blacklist(&mut self, invocation: Invocation, args: BlacklistArgs) -> Result<()> {
        self.execute("blacklist", invocation, &mut NoopPayoutHook, |ctx| {
            blacklist::handler(ctx, args)
        })
    }

    /// Update operator parameters (admin only)
    ///
    /// # Errors
    /// Returns an error if:
    /// - The signer is not an admin
    /// - No field is set or any value is out of range
    pub fn update_config(&mut self, invocation: Invocation, args: UpdateConfigArgs) -> Result<()> {
        self.execute("update_config", invocation, &mut NoopPayoutHook, |ctx| {
            update_config::handler(ctx, args)
        })
    }

    /// Change the treasury receiving platform fees (admin only)
    ///
    /// # Errors
    /// Returns an error if the signer is not an admin or `treasury` is the default key.
    pub fn set_treasury(&mut self, invocation: Invocation, treasury: Pubkey) -> Result<()> {
        self.update_config(
            invocation,
            UpdateConfigArgs {
                treasury: Some(treasury),
                ..UpdateConfigArgs::default()
            },
        )
    }

    /// Change the daily circuit breaker threshold (admin only)
    ///
    /// # Errors
    /// Returns an error if the signer is not an admin or `threshold` is zero.
    pub fn set_circuit_breaker_threshold(&mut self, invocation: Invocation, threshold: u64) -> Result<()> {
        self.update_config(
            invocation,
            UpdateConfigArgs {
                circuit_breaker_threshold: Some(threshold),
                ..UpdateConfigArgs::default()
            },
        )
    }

    /// Add or remove an admin (authority only)
    ///
    /// # Errors
    /// Returns an error if the signer is not the authority or the target is invalid.
    pub fn set_admin(&mut self, invocation: Invocation, args: SetAdminArgs) -> Result<()> {
        self.execute("set_admin", invocation, &mut NoopPayoutHook, |ctx| {
            set_admin::handler(ctx, args)
        })
    }

    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address.
    pub fn get_participant(&self, address: &Pubkey) -> Result<Participant> {
        queries::get_participant(&self.ledger, address)
    }

    /// # Errors
    /// Returns `InvalidLevel` for a level outside the catalog.
    pub fn get_package(&self, level: u8) -> Result<Package> {
        queries::get_package(&self.ledger, level)
    }

    #[must_use]
    pub const fn get_pool_balances(&self) -> PoolBalances {
        queries::get_pool_balances(&self.ledger)
    }

    #[must_use]
    pub fn get_pool_status(&self, kind: PoolKind, now: i64) -> PoolStatus {
        queries::get_pool_status(&self.ledger, kind, now)
    }

    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address.
    pub fn get_withdrawal_split(&self, address: &Pubkey) -> Result<WithdrawalSplit> {
        queries::get_withdrawal_split(&self.ledger, address)
    }

    #[must_use]
    pub fn get_system_health(&self, now: i64) -> SystemHealth {
        queries::get_system_health(&self.ledger, now)
    }

    #[must_use]
    pub const fn get_circuit_breaker(&self, now: i64) -> CircuitBreakerStatus {
        self.ledger.breaker.status(now)
    }

    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address.
    pub fn get_leader_rank(&self, address: &Pubkey) -> Result<LeaderRank> {
        queries::get_leader_rank(&self.ledger, address)
    }

    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address.
    pub fn get_upline_chain(&self, address: &Pubkey) -> Result<UplineChain> {
        queries::get_upline_chain(&self.ledger, address)
    }

    #[must_use]
    pub fn total_participants(&self) -> u64 {
        queries::total_participants(&self.ledger)
    }

    /// Runs one mutating operation atomically.
    ///
    /// Holds the reentrancy guard for the whole call, including payout delivery.
    /// On any error the ledger is restored from the checkpoint and the events the
    /// call emitted are discarded. A call that unwinds leaves the guard set, so
    /// every later call fails with `ReentrancyDetected` until the engine is
    /// restored from a snapshot.
    fn execute<T, F>(
        &mut self,
        operation: &'static str,
        invocation: Invocation,
        hook: &mut dyn PayoutHook,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut ExecContext<'_>) -> Result<T>,
    {
        if self.in_flight {
            tracing::warn!(operation, signer = %invocation.signer, "reentrant call rejected");
            return Err(LedgerError::ReentrancyDetected.into());
        }
        let span = tracing::info_span!("ledger_op", operation, signer = %invocation.signer);
        let _enter = span.enter();

        self.in_flight = true;
        let checkpoint = self.ledger.clone();
        let event_mark = self.events.len();
        let mut payouts: Vec<Payout> = Vec::new();

        let mut result = {
            let mut ctx = ExecContext {
                ledger: &mut self.ledger,
                events: &mut self.events,
                payouts: &mut payouts,
                invocation,
            };
            op(&mut ctx)
        };

        if result.is_ok() && !payouts.is_empty() {
            if let Err(err) = hook.on_payouts(self, &payouts) {
                result = Err(err);
            }
        }

        self.in_flight = false;
        if let Err(err) = &result {
            tracing::warn!(operation, error = %err, "operation rolled back");
            self.ledger = checkpoint;
            self.events.truncate(event_mark);
        }
        result
    }
}
