//! Circuit breaker and daily withdrawal limit tests
//!
//! The breaker caps total cash outflow (user payout plus platform fee) per UTC
//! day. An optional per-participant limit applies the same way to each
//! participant's own outflow. Reinvested amounts never count against either.
//!
//! Test coverage:
//! - Outflow exactly at the threshold passes, one unit above fails
//! - Counters reset at UTC midnight, not 24 hours after the first withdrawal
//! - A tripped breaker leaves balances untouched
//! - Threshold updates are admin-only and reject zero
//! - Per-participant daily limit

mod common;

use common::{Harness, DAY, T0, USDT};
use leadfive_program::{errors::LedgerError, UpdateConfigArgs};

fn harness_with_threshold(threshold: u64) -> Harness {
    Harness::with_args(|args| args.circuit_breaker_threshold = threshold)
}

/// Seconds from `T0` to the next UTC midnight.
fn until_midnight() -> i64 {
    DAY - T0.rem_euclid(DAY)
}

#[test]
fn test_breaker_counts_cash_outflow_only() {
    let mut harness = harness_with_threshold(100 * USDT);
    let a = harness.join(harness.root, 1);
    let b = harness.join(harness.root, 1);
    harness.fund(&a, 200 * USDT);
    harness.fund(&b, 200 * USDT);

    // Base tier: 70% of the amount leaves the vault
    harness.withdraw(a, 100 * USDT).unwrap();
    let status = harness.engine.get_circuit_breaker(harness.now);
    assert_eq!(status.withdrawn_today, 70 * USDT);
    assert_eq!(status.remaining_today, 30 * USDT);
    assert!(!status.tripped);

    let before = harness.participant(&b);
    assert_ledger_err!(
        harness.withdraw(b, 50 * USDT),
        LedgerError::CircuitBreakerTriggered
    );
    assert_eq!(harness.participant(&b), before);
    assert_eq!(
        harness.engine.get_circuit_breaker(harness.now).withdrawn_today,
        70 * USDT
    );

    // 40 -> 28 cash brings the day to 98
    harness.withdraw(b, 40 * USDT).unwrap();
    let status = harness.engine.get_circuit_breaker(harness.now);
    assert_eq!(status.withdrawn_today, 98 * USDT);
    assert_eq!(status.remaining_today, 2 * USDT);
    harness.assert_solvent();
}

#[test]
fn test_exact_threshold_then_one_unit_over() {
    let mut harness = harness_with_threshold(70 * USDT);
    let a = harness.join(harness.root, 1);
    harness.fund(&a, 200 * USDT);

    harness.withdraw(a, 100 * USDT).unwrap();
    let status = harness.engine.get_circuit_breaker(harness.now);
    assert_eq!(status.remaining_today, 0);
    assert!(status.tripped);
    assert!(harness.engine.get_system_health(harness.now).circuit_breaker.tripped);

    assert_ledger_err!(harness.withdraw(a, 2), LedgerError::CircuitBreakerTriggered);
}

#[test]
fn test_breaker_resets_at_utc_midnight() {
    let mut harness = harness_with_threshold(70 * USDT);
    let a = harness.join(harness.root, 1);
    harness.fund(&a, 300 * USDT);
    harness.withdraw(a, 100 * USDT).unwrap();

    harness.advance(until_midnight() - 1);
    assert_ledger_err!(
        harness.withdraw(a, 10 * USDT),
        LedgerError::CircuitBreakerTriggered
    );

    // Less than 24 hours after the first withdrawal, but a new UTC day
    harness.advance(1);
    assert_eq!(
        harness.engine.get_circuit_breaker(harness.now).withdrawn_today,
        0
    );
    harness.withdraw(a, 100 * USDT).unwrap();
}

#[test]
fn test_reinvestment_does_not_count() {
    let mut harness = harness_with_threshold(USDT);
    let a = harness.join(harness.root, 1);
    let invocation = harness.as_signer(a);
    harness
        .engine
        .set_auto_compound(
            invocation,
            leadfive_program::SetAutoCompoundArgs { enabled: true },
        )
        .unwrap();
    harness.fund(&a, 100 * USDT);

    harness.withdraw(a, 100 * USDT).unwrap();
    assert_eq!(
        harness.engine.get_circuit_breaker(harness.now).withdrawn_today,
        0
    );
}

#[test]
fn test_threshold_update_is_admin_only() {
    let mut harness = harness_with_threshold(70 * USDT);
    let a = harness.join(harness.root, 1);

    let invocation = harness.as_signer(a);
    assert_ledger_err!(
        harness
            .engine
            .set_circuit_breaker_threshold(invocation, 500 * USDT),
        LedgerError::Unauthorized
    );

    let admin = harness.as_admin();
    assert_ledger_err!(
        harness.engine.set_circuit_breaker_threshold(admin, 0),
        LedgerError::InvalidConfiguration
    );

    harness
        .engine
        .set_circuit_breaker_threshold(admin, 500 * USDT)
        .unwrap();
    assert_eq!(
        harness.engine.get_circuit_breaker(harness.now).threshold,
        500 * USDT
    );

    harness.fund(&a, 500 * USDT);
    harness.withdraw(a, 500 * USDT).unwrap();
}

#[test]
fn test_per_participant_daily_limit() {
    let mut harness = Harness::new();
    let admin = harness.as_admin();
    harness
        .engine
        .update_config(
            admin,
            UpdateConfigArgs {
                max_daily_withdrawal_per_participant: Some(50 * USDT),
                ..UpdateConfigArgs::default()
            },
        )
        .unwrap();

    let a = harness.join(harness.root, 1);
    let b = harness.join(harness.root, 1);
    harness.fund(&a, 200 * USDT);
    harness.fund(&b, 200 * USDT);

    // 60 -> 42 cash, then 20 -> 14 cash would make 56
    harness.withdraw(a, 60 * USDT).unwrap();
    assert_ledger_err!(
        harness.withdraw(a, 20 * USDT),
        LedgerError::WithdrawalLimitExceeded
    );
    assert_eq!(harness.participant(&a).withdrawn_today, 42 * USDT);

    // Other participants have their own allowance
    harness.withdraw(b, 60 * USDT).unwrap();

    harness.advance(until_midnight());
    harness.withdraw(a, 20 * USDT).unwrap();
    assert_eq!(harness.participant(&a).withdrawn_today, 14 * USDT);
}
