//! Package purchase and upgrade tests
//!
//! Every purchase is a full payment of the package price. Upgrades and same-level
//! top-ups raise the cumulative spend (and with it the earnings cap) and run the
//! whole cascade again. Downgrades are rejected.
//!
//! Test coverage:
//! - First purchase registers the payer
//! - Upgrade pays the full new price and raises the cap
//! - Same-level repurchase is accepted
//! - Downgrade, wrong value, unknown level, and blacklisted payer are rejected atomically
//! - `PackagePurchased` event and ledger statistics

mod common;

use anchor_lang::prelude::*;
use common::{Harness, USDT};
use leadfive_program::{
    errors::LedgerError,
    events::{BonusKind, LedgerEvent},
    BlacklistArgs, PurchaseArgs,
};

fn purchase_with_value(
    harness: &mut Harness,
    payer: Pubkey,
    level: u8,
    value: u64,
) -> Result<leadfive_program::PurchaseReceipt> {
    let invocation = harness.as_signer(payer);
    harness.engine.purchase(
        invocation,
        PurchaseArgs {
            package_level: level,
            sponsor: Some(harness.root),
            value,
        },
    )
}

#[test]
fn test_first_purchase_registers_payer() {
    let mut harness = Harness::new();
    let payer = Pubkey::new_unique();
    let receipt = harness.buy(payer, 1, Some(harness.root)).unwrap();

    assert!(receipt.registered);
    assert!(!receipt.upgrade);
    let record = harness.participant(&payer);
    assert_eq!(record.package_level, 1);
    assert_eq!(record.cumulative_spend, 30 * USDT);
    assert_eq!(record.earnings_cap, 120 * USDT);

    match harness.last_event() {
        Some(LedgerEvent::PackagePurchased(event)) => {
            assert_eq!(event.payment_id, receipt.payment_id);
            assert_eq!(event.participant, payer);
            assert_eq!(event.package_level, 1);
            assert_eq!(event.price, 30 * USDT);
            assert_eq!(event.earnings_cap, 120 * USDT);
            assert!(!event.upgrade);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_upgrade_pays_full_price() {
    let mut harness = Harness::new();
    let sponsor = harness.join(harness.root, 4);
    let a = harness.join(sponsor, 1);
    let sponsor_before = harness.participant(&sponsor).balance_withdrawable;

    let receipt = harness.buy(a, 3, None).unwrap();
    assert!(!receipt.registered);
    assert!(receipt.upgrade);
    assert_eq!(receipt.price, 100 * USDT);

    let record = harness.participant(&a);
    assert_eq!(record.package_level, 3);
    assert_eq!(record.cumulative_spend, 130 * USDT);
    assert_eq!(record.earnings_cap, 520 * USDT);

    let direct: u64 = harness
        .bonuses_for(receipt.payment_id)
        .iter()
        .filter(|bonus| bonus.kind == BonusKind::Direct)
        .map(|bonus| bonus.amount)
        .sum();
    assert_eq!(direct, 40 * USDT);
    assert!(harness.participant(&sponsor).balance_withdrawable - sponsor_before >= 40 * USDT);
    harness.assert_solvent();
}

#[test]
fn test_same_level_repurchase_allowed() {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 2);
    let receipt = harness.buy(a, 2, None).unwrap();
    assert!(receipt.upgrade);

    let record = harness.participant(&a);
    assert_eq!(record.package_level, 2);
    assert_eq!(record.cumulative_spend, 100 * USDT);
    assert_eq!(record.earnings_cap, 400 * USDT);
}

#[test]
fn test_downgrade_rejected() {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 3);
    let before = harness.engine.ledger().clone();
    let events_before = harness.event_count();

    assert_ledger_err!(harness.buy(a, 1, None), LedgerError::DowngradeNotAllowed);
    assert_eq!(harness.engine.ledger(), &before);
    assert_eq!(harness.event_count(), events_before);
}

#[test]
fn test_value_must_equal_price() {
    let mut harness = Harness::new();
    let payer = Pubkey::new_unique();

    assert_ledger_err!(
        purchase_with_value(&mut harness, payer, 1, 30 * USDT - 1),
        LedgerError::InsufficientPayment
    );
    assert_ledger_err!(
        purchase_with_value(&mut harness, payer, 1, 30 * USDT + 1),
        LedgerError::InsufficientPayment
    );
    assert_ledger_err!(
        purchase_with_value(&mut harness, payer, 5, 30 * USDT),
        LedgerError::InvalidLevel
    );
    assert!(harness.engine.get_participant(&payer).is_err());
    assert_eq!(harness.engine.ledger().vault_balance, 0);

    purchase_with_value(&mut harness, payer, 1, 30 * USDT).unwrap();
}

#[test]
fn test_new_payer_needs_sponsor() {
    let mut harness = Harness::new();
    let payer = Pubkey::new_unique();
    assert_ledger_err!(harness.buy(payer, 1, None), LedgerError::UnknownSponsor);
    assert_ledger_err!(
        harness.buy(payer, 1, Some(Pubkey::new_unique())),
        LedgerError::UnknownSponsor
    );
    assert_eq!(harness.engine.total_participants(), 1);
}

#[test]
fn test_blacklisted_payer_rejected() {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 1);
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

    assert_ledger_err!(harness.buy(a, 2, None), LedgerError::Blacklisted);
    assert_eq!(harness.participant(&a).package_level, 1);
}

#[test]
fn test_purchase_statistics() {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 1);
    harness.buy(a, 4, None).unwrap();
    harness.join(a, 2);

    let stats = harness.engine.ledger().stats;
    assert_eq!(stats.payments_processed, 3);
    assert_eq!(stats.total_volume, 280 * USDT);
    assert_eq!(harness.engine.ledger().vault_balance, 280 * USDT);
    assert_eq!(
        harness.engine.get_system_health(harness.now).total_locked_value,
        280 * USDT
    );
}
