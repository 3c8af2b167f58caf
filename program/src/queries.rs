//! Read-only views over the ledger

use anchor_lang::prelude::*;

use crate::{
    breaker::CircuitBreakerStatus,
    catalog::Package,
    errors::LedgerError,
    pools::{PoolBalances, PoolKind},
    state::{LeaderRank, Ledger, Money, Participant, UplineChain},
    withdrawal::WithdrawalSplit,
};

/// System-wide health snapshot
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemHealth {
    pub paused: bool,
    pub circuit_breaker: CircuitBreakerStatus,
    /// Funds held by the engine (pools plus withdrawable balances)
    pub total_locked_value: Money,
    pub total_participants: u64,
    pub pool_balances: PoolBalances,
}

/// Schedule state of one pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStatus {
    pub kind: PoolKind,
    pub balance: Money,
    pub last_distributed_at: i64,
    pub next_due_at: i64,
    pub due: bool,
}

pub fn get_participant(ledger: &Ledger, address: &Pubkey) -> Result<Participant> {
    ledger.participants.require(address).cloned()
}

pub fn get_package(ledger: &Ledger, level: u8) -> Result<Package> {
    ledger.catalog.lookup(level).copied()
}

#[must_use]
pub const fn get_pool_balances(ledger: &Ledger) -> PoolBalances {
    ledger.pools.balances()
}

#[must_use]
pub fn get_pool_status(ledger: &Ledger, kind: PoolKind, now: i64) -> PoolStatus {
    let pool = ledger.pools.get(kind);
    PoolStatus {
        kind,
        balance: pool.balance,
        last_distributed_at: pool.last_distributed_at,
        next_due_at: pool.next_due_at(),
        due: pool.is_due(now),
    }
}

pub fn get_withdrawal_split(ledger: &Ledger, address: &Pubkey) -> Result<WithdrawalSplit> {
    let participant = ledger.participants.require(address)?;
    Ok(WithdrawalSplit::for_participant(participant, &ledger.config))
}

pub fn get_leader_rank(ledger: &Ledger, address: &Pubkey) -> Result<LeaderRank> {
    Ok(ledger.participants.require(address)?.leader_rank())
}

pub fn get_upline_chain(ledger: &Ledger, address: &Pubkey) -> Result<UplineChain> {
    Ok(ledger.participants.require(address)?.upline_chain)
}

#[must_use]
pub fn total_participants(ledger: &Ledger) -> u64 {
    u64::try_from(ledger.participants.len()).unwrap_or(u64::MAX)
}

#[must_use]
pub fn get_system_health(ledger: &Ledger, now: i64) -> SystemHealth {
    SystemHealth {
        paused: ledger.config.paused,
        circuit_breaker: ledger.breaker.status(now),
        total_locked_value: ledger.vault_balance,
        total_participants: total_participants(ledger),
        pool_balances: ledger.pools.balances(),
    }
}

/// Checks that the vault equals pool balances plus withdrawable balances.
///
/// # Errors
/// Returns `AccountingMismatch` when they differ.
pub fn verify_solvency(ledger: &Ledger) -> Result<()> {
    require!(
        ledger.accounted_balance()? == ledger.vault_balance,
        LedgerError::AccountingMismatch
    );
    Ok(())
}
