//! Reentrancy guard and payout delivery tests
//!
//! Payouts reach the host hook as one batch after every internal mutation of the
//! call is final, while the guard is still held. The hook sees the engine
//! read-only, so nested mutating calls cannot be expressed; a call that unwinds
//! leaves the guard set and the engine refuses further work.
//!
//! Test coverage:
//! - The hook receives every payout of a withdrawal in a single batch
//! - The hook observes the final post-withdrawal state with the guard held
//! - A rejected batch delivers nothing and restores the ledger and events
//! - An unwound call leaves the guard set; restoring from a snapshot clears it
//! - The guard is released after both success and failure

mod common;

use std::panic::{self, AssertUnwindSafe};

use anchor_lang::prelude::*;
use common::{Harness, USDT};
use leadfive_program::{
    errors::LedgerError,
    runtime::{Payout, PayoutHook, PayoutKind},
    state::Money,
    Engine, PurchaseArgs, WithdrawArgs,
};

/// Records what the engine looks like from inside the hook.
#[derive(Default)]
struct ObservingHook {
    batches: Vec<Vec<Payout>>,
    in_flight: Vec<bool>,
    balances: Vec<Money>,
    participant: Option<Pubkey>,
}

impl PayoutHook for ObservingHook {
    fn on_payouts(&mut self, engine: &Engine, payouts: &[Payout]) -> Result<()> {
        self.batches.push(payouts.to_vec());
        self.in_flight.push(engine.is_in_flight());
        if let Some(participant) = self.participant {
            self.balances
                .push(engine.get_participant(&participant)?.balance_withdrawable);
        }
        Ok(())
    }
}

/// Token transfer host with a frozen treasury account.
///
/// Checks every transfer of the batch before moving anything, so a rejected
/// batch leaves `delivered` untouched.
#[derive(Default)]
struct FrozenTreasuryHost {
    delivered: Vec<Payout>,
}

impl PayoutHook for FrozenTreasuryHost {
    fn on_payouts(&mut self, _engine: &Engine, payouts: &[Payout]) -> Result<()> {
        if payouts
            .iter()
            .any(|payout| payout.kind == PayoutKind::PlatformFee)
        {
            return Err(LedgerError::AccountingMismatch.into());
        }
        self.delivered.extend_from_slice(payouts);
        Ok(())
    }
}

/// Panics in the middle of delivery.
struct PanickingHook;

impl PayoutHook for PanickingHook {
    fn on_payouts(&mut self, _engine: &Engine, _payouts: &[Payout]) -> Result<()> {
        panic!("transfer backend crashed");
    }
}

fn funded(harness: &mut Harness, amount: Money) -> Pubkey {
    let participant = harness.join(harness.root, 1);
    harness.fund(&participant, amount);
    participant
}

#[test]
fn test_payouts_arrive_as_one_batch() {
    let mut harness = Harness::new();
    let a = funded(&mut harness, 100 * USDT);

    let mut hook = ObservingHook::default();
    let invocation = harness.as_signer(a);
    let receipt = harness
        .engine
        .withdraw(invocation, WithdrawArgs { amount: 100 * USDT }, &mut hook)
        .unwrap();

    assert_eq!(hook.batches.len(), 1);
    let batch = &hook.batches[0];
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].kind, PayoutKind::Withdrawal);
    assert_eq!(batch[0].recipient, a);
    assert_eq!(batch[0].amount, receipt.withdrawn_to_user);
    assert_eq!(batch[1].kind, PayoutKind::PlatformFee);
    assert_eq!(batch[1].recipient, harness.treasury);
    assert_eq!(batch[1].amount, receipt.treasury_fee);
    harness.assert_solvent();
}

#[test]
fn test_hook_observes_final_state() {
    let mut harness = Harness::new();
    let a = funded(&mut harness, 100 * USDT);

    let mut hook = ObservingHook {
        participant: Some(a),
        ..ObservingHook::default()
    };
    let invocation = harness.as_signer(a);
    harness
        .engine
        .withdraw(invocation, WithdrawArgs { amount: 60 * USDT }, &mut hook)
        .unwrap();

    assert_eq!(hook.in_flight, vec![true]);
    assert_eq!(hook.balances, vec![40 * USDT]);
    assert!(!harness.engine.is_in_flight());
}

#[test]
fn test_rejected_batch_delivers_nothing() {
    let mut harness = Harness::new();
    let a = funded(&mut harness, 100 * USDT);
    let ledger_before = harness.engine.ledger().clone();
    let events_before = harness.event_count();

    let mut host = FrozenTreasuryHost::default();
    let invocation = harness.as_signer(a);
    assert_ledger_err!(
        harness.engine.withdraw(
            invocation,
            WithdrawArgs {
                amount: 100 * USDT,
            },
            &mut host,
        ),
        LedgerError::AccountingMismatch
    );

    assert!(host.delivered.is_empty());
    assert_eq!(harness.participant(&a).balance_withdrawable, 100 * USDT);
    assert_eq!(harness.engine.ledger(), &ledger_before);
    assert_eq!(harness.event_count(), events_before);
    assert_eq!(
        harness.engine.get_circuit_breaker(harness.now).withdrawn_today,
        0
    );
    assert!(!harness.engine.is_in_flight());

    // The guard is released: the same withdrawal now succeeds
    let mut payouts: Vec<Payout> = Vec::new();
    harness
        .engine
        .withdraw(
            invocation,
            WithdrawArgs {
                amount: 100 * USDT,
            },
            &mut payouts,
        )
        .unwrap();
    assert_eq!(payouts.len(), 2);
}

#[test]
fn test_unwound_call_keeps_guard_set() {
    let mut harness = Harness::new();
    let a = funded(&mut harness, 100 * USDT);
    let snapshot = harness.engine.snapshot().unwrap();
    let upgrade_price = harness.price(2);
    let admin = harness.as_admin();

    let invocation = harness.as_signer(a);
    let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
        harness
            .engine
            .withdraw(invocation, WithdrawArgs { amount: 50 * USDT }, &mut PanickingHook)
    }));
    assert!(unwound.is_err());
    assert!(harness.engine.is_in_flight());

    assert_ledger_err!(
        harness.engine.purchase(
            invocation,
            PurchaseArgs {
                package_level: 2,
                sponsor: None,
                value: upgrade_price,
            },
        ),
        LedgerError::ReentrancyDetected
    );
    assert_ledger_err!(
        harness.engine.pause(admin),
        LedgerError::ReentrancyDetected
    );

    harness.engine = Engine::restore(&snapshot).unwrap();
    assert!(!harness.engine.is_in_flight());
    assert_eq!(harness.participant(&a).balance_withdrawable, 100 * USDT);
    harness.withdraw(a, 50 * USDT).unwrap();
    harness.assert_solvent();
}

#[test]
fn test_failed_operation_releases_guard() {
    let mut harness = Harness::new();
    let a = funded(&mut harness, 10 * USDT);

    assert_ledger_err!(
        harness.withdraw(a, 11 * USDT),
        LedgerError::InsufficientBalance
    );
    assert!(!harness.engine.is_in_flight());
    harness.withdraw(a, 10 * USDT).unwrap();
}
