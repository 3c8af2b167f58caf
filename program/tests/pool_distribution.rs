//! Pool distribution tests
//!
//! Leader and Help pools distribute weekly, the Club pool monthly. Help and Club
//! split evenly among eligible participants; Leader splits half to Shining Stars
//! and half to Silver Stars. With nobody eligible the balance carries over and
//! the schedule is not advanced.
//!
//! Test coverage:
//! - Admin-only access and interval enforcement
//! - Even Help split with the remainder kept in the pool
//! - Carry-over when every candidate is blacklisted or inactive
//! - Carry-over when the balance is smaller than the number of recipients
//! - Leader split across Shining Star and Silver Star groups
//! - Club pool accrual and monthly distribution
//! - Distribution while paused

mod common;

use anchor_lang::prelude::*;
use common::{Harness, DAY, USDT};
use leadfive_program::{
    constants::{MONTHLY_INTERVAL_SECS, WEEKLY_INTERVAL_SECS},
    errors::LedgerError,
    events::{Beneficiary, BonusKind, LedgerEvent},
    pools::PoolKind,
    state::LeaderRank,
    BlacklistArgs, DistributePoolArgs, PoolDistributionOutcome, UpdateConfigArgs,
};

const WEEK: i64 = WEEKLY_INTERVAL_SECS as i64;
const MONTH: i64 = MONTHLY_INTERVAL_SECS as i64;

fn distribute(harness: &mut Harness, pool: PoolKind) -> Result<PoolDistributionOutcome> {
    let admin = harness.as_admin();
    harness
        .engine
        .distribute_pool(admin, DistributePoolArgs { pool })
}

#[test]
fn test_distribution_requires_elapsed_interval() {
    let mut harness = Harness::new();
    harness.join(harness.root, 1);

    assert_ledger_err!(distribute(&mut harness, PoolKind::Help), LedgerError::TooEarly);
    harness.advance(WEEK - 1);
    assert_ledger_err!(distribute(&mut harness, PoolKind::Help), LedgerError::TooEarly);
    harness.advance(1);
    distribute(&mut harness, PoolKind::Help).unwrap();

    // The next one is a full interval later
    assert_ledger_err!(distribute(&mut harness, PoolKind::Help), LedgerError::TooEarly);
}

#[test]
fn test_distribution_requires_admin() {
    let mut harness = Harness::new();
    let a = harness.join(harness.root, 1);
    harness.advance(WEEK);

    let invocation = harness.as_signer(a);
    assert_ledger_err!(
        harness.engine.distribute_pool(
            invocation,
            DistributePoolArgs {
                pool: PoolKind::Help,
            },
        ),
        LedgerError::Unauthorized
    );
}

#[test]
fn test_help_pool_even_split() {
    let mut harness = Harness::new();
    let members: Vec<Pubkey> = (0..3).map(|_| harness.join(harness.root, 1)).collect();
    harness.advance(WEEK);

    let balance = harness.engine.get_pool_balances().help;
    let per_share = balance / 3;

    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    let PoolDistributionOutcome::Distributed {
        batch_id,
        distributed,
        recipients,
        remainder,
    } = outcome
    else {
        panic!("expected a distribution, got {outcome:?}");
    };
    assert_eq!(recipients, 3);
    assert_eq!(distributed, per_share * 3);
    assert_eq!(remainder, balance - per_share * 3);

    for member in &members {
        assert_eq!(harness.participant(member).balance_withdrawable, per_share);
    }
    let shares = harness.bonuses_for(batch_id);
    assert_eq!(shares.len(), 3);
    assert!(shares
        .iter()
        .all(|bonus| bonus.kind == BonusKind::PoolShare(PoolKind::Help) && bonus.redirect.is_none()));

    let pool = harness.engine.get_pool_status(PoolKind::Help, harness.now);
    assert_eq!(pool.balance, remainder);
    assert_eq!(pool.last_distributed_at, harness.now);
    harness.assert_solvent();
}

#[test]
fn test_carry_over_when_nobody_is_eligible() {
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
    harness.advance(WEEK);

    let balance = harness.engine.get_pool_balances().help;
    assert!(balance > 0);
    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    assert_eq!(outcome, PoolDistributionOutcome::CarriedOver { balance });
    assert!(matches!(
        harness.last_event(),
        Some(LedgerEvent::PoolDistributionDeferred(_))
    ));

    let pool = harness.engine.get_pool_status(PoolKind::Help, harness.now);
    assert_eq!(pool.balance, balance);
    assert_eq!(pool.last_distributed_at, common::T0);

    // Schedule untouched: once someone qualifies the distribution runs immediately
    let b = harness.join(harness.root, 1);
    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    assert!(matches!(
        outcome,
        PoolDistributionOutcome::Distributed { recipients: 1, .. }
    ));
    assert!(harness.participant(&b).balance_withdrawable > 0);
    assert_eq!(harness.participant(&a).balance_withdrawable, 0);
}

#[test]
fn test_inactive_participants_excluded_from_help() {
    let mut harness = Harness::new();
    harness.join(harness.root, 1);
    harness.advance(31 * DAY);

    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    assert!(matches!(outcome, PoolDistributionOutcome::CarriedOver { .. }));
}

#[test]
fn test_dust_balance_carries_over() {
    let mut harness = Harness::new();
    let members: Vec<Pubkey> = (0..3).map(|_| harness.join(harness.root, 1)).collect();
    harness.set_pool_balance(PoolKind::Help, 2);
    harness.advance(8 * DAY);

    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    assert_eq!(outcome, PoolDistributionOutcome::CarriedOver { balance: 2 });
    assert!(matches!(
        harness.last_event(),
        Some(LedgerEvent::PoolDistributionDeferred(_))
    ));

    let pool = harness.engine.get_pool_status(PoolKind::Help, harness.now);
    assert_eq!(pool.balance, 2);
    assert_eq!(pool.last_distributed_at, common::T0);
    for member in &members {
        assert_eq!(harness.participant(member).balance_withdrawable, 0);
    }
    harness.assert_solvent();

    // Once the pool holds enough, the same window still pays out
    harness.set_pool_balance(PoolKind::Help, 3 * USDT);
    let outcome = distribute(&mut harness, PoolKind::Help).unwrap();
    assert!(matches!(
        outcome,
        PoolDistributionOutcome::Distributed {
            recipients: 3,
            distributed,
            ..
        } if distributed == 3 * USDT
    ));
    assert_eq!(
        harness.engine.get_pool_status(PoolKind::Help, harness.now).last_distributed_at,
        harness.now
    );
}

#[test]
fn test_leader_pool_split_between_ranks() {
    let mut harness = Harness::new();
    let root = harness.root;
    let shining = harness.join(root, 4);
    let silver = harness.join(root, 4);
    for _ in 0..250 {
        harness.register(shining);
    }
    for _ in 0..500 {
        harness.register(silver);
    }

    assert_eq!(
        harness.engine.get_leader_rank(&shining).unwrap(),
        LeaderRank::ShiningStar
    );
    assert_eq!(
        harness.engine.get_leader_rank(&silver).unwrap(),
        LeaderRank::SilverStar
    );
    // 752 team members under the root
    assert_eq!(
        harness.engine.get_leader_rank(&root).unwrap(),
        LeaderRank::SilverStar
    );

    assert_eq!(harness.engine.get_pool_balances().leader, 40 * USDT);
    let shining_before = harness.participant(&shining).balance_withdrawable;
    let silver_before = harness.participant(&silver).balance_withdrawable;

    harness.advance(WEEK);
    let outcome = distribute(&mut harness, PoolKind::Leader).unwrap();
    assert!(matches!(
        outcome,
        PoolDistributionOutcome::Distributed {
            distributed,
            recipients: 3,
            remainder: 0,
            ..
        } if distributed == 40 * USDT
    ));

    assert_eq!(
        harness.participant(&shining).balance_withdrawable - shining_before,
        20 * USDT
    );
    assert_eq!(
        harness.participant(&silver).balance_withdrawable - silver_before,
        10 * USDT
    );
    assert_eq!(harness.engine.get_pool_balances().leader, 0);
    harness.assert_solvent();
}

#[test]
fn test_club_pool_accrues_and_distributes_monthly() {
    let mut harness = Harness::new();
    let admin = harness.as_admin();
    harness
        .engine
        .update_config(
            admin,
            UpdateConfigArgs {
                club_pool_enabled: Some(true),
                ..UpdateConfigArgs::default()
            },
        )
        .unwrap();

    let member = harness.join(harness.root, 3);
    let outsider = harness.join(harness.root, 2);
    let balance = harness.engine.get_pool_balances().club;
    assert_eq!(balance, 5 * USDT + 2_500_000);

    harness.advance(WEEK);
    assert_ledger_err!(distribute(&mut harness, PoolKind::Club), LedgerError::TooEarly);

    harness.advance(MONTH - WEEK);
    let outsider_before = harness.participant(&outsider).balance_withdrawable;
    let outcome = distribute(&mut harness, PoolKind::Club).unwrap();
    assert!(matches!(
        outcome,
        PoolDistributionOutcome::Distributed { recipients: 1, .. }
    ));

    let payout: u64 = harness
        .engine
        .events()
        .iter()
        .filter_map(LedgerEvent::as_bonus)
        .filter(|bonus| {
            bonus.kind == BonusKind::PoolShare(PoolKind::Club)
                && bonus.to == Beneficiary::Participant(member)
        })
        .map(|bonus| bonus.amount)
        .sum();
    assert_eq!(payout, balance);
    assert_eq!(
        harness.participant(&outsider).balance_withdrawable,
        outsider_before
    );
}

#[test]
fn test_distribution_allowed_while_paused() {
    let mut harness = Harness::new();
    harness.join(harness.root, 1);
    let admin = harness.as_admin();
    harness.engine.pause(admin).unwrap();
    harness.advance(WEEK);

    distribute(&mut harness, PoolKind::Help).unwrap();
}
