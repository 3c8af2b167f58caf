//! Snapshot persistence tests
//!
//! The ledger persists as a Borsh snapshot. A restored engine continues exactly
//! where the original left off; buffered events are not part of the snapshot.

mod common;

use anchor_lang::prelude::*;
use common::{Harness, DAY, USDT};
use leadfive_program::{errors::error_code, Engine, SetAutoCompoundArgs};

fn populated() -> (Harness, Vec<Pubkey>) {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 2);
    let b = harness.join(a, 3);
    let c = harness.join(b, 1);
    let invocation = harness.as_signer(c);
    harness
        .engine
        .set_auto_compound(invocation, SetAutoCompoundArgs { enabled: true })
        .unwrap();
    harness.advance(DAY);
    harness.withdraw(a, 10 * USDT).unwrap();
    (harness, vec![a, b, c])
}

#[test]
fn test_snapshot_restores_identical_ledger() {
    let (harness, _) = populated();
    let bytes = harness.engine.snapshot().unwrap();
    let restored = Engine::restore(&bytes).unwrap();

    assert_eq!(restored.ledger(), harness.engine.ledger());
    assert!(restored.events().is_empty());
    assert!(!restored.is_in_flight());
}

#[test]
fn test_restored_engine_continues() {
    let (mut original, members) = populated();
    let bytes = original.engine.snapshot().unwrap();

    let mut resumed = Harness {
        engine: Engine::restore(&bytes).unwrap(),
        authority: original.authority,
        treasury: original.treasury,
        root: original.root,
        now: original.now,
    };

    let payer = Pubkey::new_unique();
    let left = original.buy(payer, 4, Some(members[2])).unwrap();
    let right = resumed.buy(payer, 4, Some(members[2])).unwrap();

    // Same payment id, same credits
    assert_eq!(left, right);
    assert_eq!(original.engine.ledger(), resumed.engine.ledger());
    resumed.assert_solvent();
}

#[test]
fn test_malformed_snapshot_rejected() {
    let (harness, _) = populated();
    let mut bytes = harness.engine.snapshot().unwrap();

    let err = Engine::restore(&bytes[..bytes.len() / 2]).unwrap_err();
    assert_eq!(
        error_code(&err),
        Some(anchor_lang::error::ErrorCode::AccountDidNotDeserialize as u32)
    );

    bytes.push(0);
    assert!(Engine::restore(&bytes).is_err());
    assert!(Engine::restore(&[]).is_err());
}
