//! Withdrawal split tests
//!
//! A withdrawal debits the balance once and splits it into a cash portion (by
//! tier), a platform fee taken from the cash portion, and a reinvested portion
//! that runs through the cascade. Auto-compounding participants reinvest
//! everything and receive a compound bonus from the Help pool.
//!
//! Test coverage:
//! - Top tier with the default 5% fee (100 -> 76 user, 4 treasury, 20 reinvested)
//! - Tier boundaries at 5 and 20 direct referrals
//! - Auto-compound with the compound bonus, and the bonus capped by the Help pool
//! - Validation failures leave the ledger untouched

mod common;

use anchor_lang::prelude::*;
use common::{Harness, USDT};
use leadfive_program::{
    errors::LedgerError,
    events::LedgerEvent,
    runtime::{Payout, PayoutKind},
    withdrawal::WithdrawalTier,
    BlacklistArgs, Engine, SetAutoCompoundArgs, WithdrawArgs,
};

/// Joins under root at level 1 and brings `directs` registrations under the new participant.
fn participant_with_directs(harness: &mut Harness, directs: u32) -> Pubkey {
    let participant = harness.join(harness.root, 1);
    for _ in 0..directs {
        harness.register(participant);
    }
    participant
}

#[test]
fn test_top_tier_withdrawal_with_platform_fee() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 22);
    harness.fund(&a, 100 * USDT);
    let vault_before = harness.engine.ledger().vault_balance;

    let mut payouts: Vec<Payout> = Vec::new();
    let invocation = harness.as_signer(a);
    let receipt = harness
        .engine
        .withdraw(
            invocation,
            WithdrawArgs {
                amount: 100 * USDT,
            },
            &mut payouts,
        )
        .unwrap();

    assert_eq!(receipt.tier, WithdrawalTier::Top);
    assert_eq!(receipt.withdrawn_to_user, 76 * USDT);
    assert_eq!(receipt.treasury_fee, 4 * USDT);
    assert_eq!(receipt.reinvested, 20 * USDT);
    assert_eq!(receipt.compound_bonus, 0);

    assert_eq!(
        payouts,
        vec![
            Payout {
                recipient: a,
                amount: 76 * USDT,
                kind: PayoutKind::Withdrawal,
            },
            Payout {
                recipient: harness.treasury,
                amount: 4 * USDT,
                kind: PayoutKind::PlatformFee,
            },
        ]
    );

    let record = harness.participant(&a);
    assert_eq!(record.balance_withdrawable, 0);
    assert_eq!(record.total_withdrawn, 76 * USDT);

    let reinvestment = receipt.reinvestment.expect("reinvestment cascade ran");
    assert_eq!(reinvestment.total().unwrap(), 20 * USDT);
    assert_eq!(harness.engine.ledger().vault_balance, vault_before - 80 * USDT);
    assert!(harness
        .engine
        .events()
        .iter()
        .any(|event| matches!(event, LedgerEvent::ReinvestmentProcessed(r) if r.amount == 20 * USDT)));
    harness.assert_solvent();
}

#[test]
fn test_base_tier_split() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 0);
    harness.fund(&a, 100 * USDT);

    let receipt = harness.withdraw(a, 100 * USDT).unwrap();
    assert_eq!(receipt.tier, WithdrawalTier::Base);
    assert_eq!(receipt.withdrawn_to_user, 66_500_000);
    assert_eq!(receipt.treasury_fee, 3_500_000);
    assert_eq!(receipt.reinvested, 30 * USDT);
    assert_eq!(
        receipt.withdrawn_to_user + receipt.treasury_fee + receipt.reinvested,
        receipt.requested
    );
    harness.assert_solvent();
}

#[test]
fn test_tier_boundaries() {
    for (directs, tier, withdraw_bps) in [
        (0, WithdrawalTier::Base, 7_000),
        (4, WithdrawalTier::Base, 7_000),
        (5, WithdrawalTier::Mid, 7_500),
        (19, WithdrawalTier::Mid, 7_500),
        (20, WithdrawalTier::Top, 8_000),
    ] {
        let mut harness = Harness::new();
        let a = participant_with_directs(&mut harness, directs);
        let split = harness.engine.get_withdrawal_split(&a).unwrap();
        assert_eq!(split.tier, tier, "{directs} directs");
        assert_eq!(split.withdraw_bps, withdraw_bps);
        assert_eq!(split.reinvest_bps, 10_000 - withdraw_bps);
        assert_eq!(split.platform_fee_bps, 500);
        assert_eq!(split.compound_bonus_bps, 0);
    }
}

#[test]
fn test_auto_compound_reinvests_everything_with_bonus() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 22);
    let invocation = harness.as_signer(a);
    harness
        .engine
        .set_auto_compound(invocation, SetAutoCompoundArgs { enabled: true })
        .unwrap();
    harness.fund(&a, 100 * USDT);
    let help_before = harness.engine.get_pool_balances().help;
    assert!(help_before >= 5 * USDT);

    let mut payouts: Vec<Payout> = Vec::new();
    let invocation = harness.as_signer(a);
    let receipt = harness
        .engine
        .withdraw(
            invocation,
            WithdrawArgs {
                amount: 100 * USDT,
            },
            &mut payouts,
        )
        .unwrap();

    assert_eq!(receipt.tier, WithdrawalTier::AutoCompound);
    assert_eq!(receipt.withdrawn_to_user, 0);
    assert_eq!(receipt.treasury_fee, 0);
    assert_eq!(receipt.reinvested, 100 * USDT);
    assert_eq!(receipt.compound_bonus, 5 * USDT);
    assert!(payouts.is_empty());

    let reinvestment = receipt.reinvestment.unwrap();
    assert_eq!(reinvestment.total().unwrap(), 105 * USDT);
    assert_eq!(harness.participant(&a).total_withdrawn, 0);
    harness.assert_solvent();
}

#[test]
fn test_compound_bonus_capped_by_help_pool() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 0);

    let mut ledger = harness.engine.ledger().clone();
    {
        let record = ledger.participants.require_mut(&a).unwrap();
        record.auto_compound = true;
        record.balance_withdrawable = 100 * USDT;
        record.total_earnings = 100 * USDT;
    }
    let drained = ledger.pools.help.balance - USDT;
    ledger.pools.help.balance = USDT;
    ledger.vault_balance = ledger.vault_balance - drained + 100 * USDT;
    harness.engine = Engine::from_ledger(ledger);
    harness.assert_solvent();

    let receipt = harness.withdraw(a, 100 * USDT).unwrap();
    assert_eq!(receipt.compound_bonus, USDT);
    harness.assert_solvent();
}

#[test]
fn test_invalid_withdrawals_are_rejected() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 0);
    harness.fund(&a, 10 * USDT);
    let snapshot = harness.engine.ledger().clone();

    assert_ledger_err!(harness.withdraw(a, 0), LedgerError::InvalidAmount);
    assert_ledger_err!(
        harness.withdraw(a, 10 * USDT + 1),
        LedgerError::InsufficientBalance
    );
    assert_ledger_err!(
        harness.withdraw(Pubkey::new_unique(), USDT),
        LedgerError::ParticipantNotFound
    );
    assert_eq!(harness.engine.ledger(), &snapshot);

    let admin = harness.as_admin();
    harness
        .engine
        .blacklist(
            admin,
            BlacklistArgs {
                participant: a,
                blacklisted: true,
            },
        )
        .unwrap();
    assert_ledger_err!(harness.withdraw(a, USDT), LedgerError::Blacklisted);
    assert_eq!(harness.participant(&a).balance_withdrawable, 10 * USDT);
}

#[test]
fn test_withdrawal_rejected_while_paused() {
    let mut harness = Harness::new();
    let a = participant_with_directs(&mut harness, 0);
    harness.fund(&a, 10 * USDT);

    let admin = harness.as_admin();
    harness.engine.pause(admin).unwrap();
    assert_ledger_err!(harness.withdraw(a, USDT), LedgerError::SystemPaused);

    let admin = harness.as_admin();
    harness.engine.unpause(admin).unwrap();
    harness.withdraw(a, USDT).unwrap();
}
