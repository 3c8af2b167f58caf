//! Shared fixtures for the engine integration suites

#![allow(dead_code)]

use anchor_lang::prelude::*;
use leadfive_program::{
    events::{BonusEvent, LedgerEvent},
    pools::PoolKind,
    queries,
    runtime::{Invocation, NoopPayoutHook},
    state::{Money, Participant, PaymentId},
    Engine, InitializeArgs, PurchaseArgs, PurchaseReceipt, RegisterArgs, WithdrawArgs,
    WithdrawalReceipt,
};

/// 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000;
pub const DAY: i64 = 86_400;
pub const USDT: Money = 1_000_000;

/// Engine plus the keys and clock a test drives it with
pub struct Harness {
    pub engine: Engine,
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub root: Pubkey,
    pub now: i64,
}

impl Harness {
    /// Canonical catalog and defaults.
    pub fn new() -> Self {
        Self::with_args(|_| {})
    }

    pub fn with_args(configure: impl FnOnce(&mut InitializeArgs)) -> Self {
        let authority = Pubkey::new_unique();
        let treasury = Pubkey::new_unique();
        let root = Pubkey::new_unique();
        let mut args = InitializeArgs::canonical(treasury, root);
        configure(&mut args);
        let engine = Engine::initialize(Invocation::new(authority, T0), args)
            .expect("initialize should succeed");
        Self {
            engine,
            authority,
            treasury,
            root,
            now: T0,
        }
    }

    pub const fn as_signer(&self, signer: Pubkey) -> Invocation {
        Invocation::new(signer, self.now)
    }

    pub const fn as_admin(&self) -> Invocation {
        Invocation::new(self.authority, self.now)
    }

    pub fn advance(&mut self, secs: i64) {
        self.now += secs;
    }

    pub fn price(&self, level: u8) -> Money {
        self.engine.get_package(level).expect("level exists").price
    }

    /// Registers a fresh address under `sponsor` without a package.
    pub fn register(&mut self, sponsor: Pubkey) -> Pubkey {
        let address = Pubkey::new_unique();
        self.engine
            .register(
                self.as_signer(address),
                RegisterArgs {
                    sponsor: Some(sponsor),
                },
            )
            .expect("register should succeed");
        address
    }

    /// Registers a fresh address under `sponsor` by purchasing `level`.
    pub fn join(&mut self, sponsor: Pubkey, level: u8) -> Pubkey {
        let address = Pubkey::new_unique();
        self.buy(address, level, Some(sponsor))
            .expect("purchase should succeed");
        address
    }

    pub fn buy(
        &mut self,
        payer: Pubkey,
        level: u8,
        sponsor: Option<Pubkey>,
    ) -> Result<PurchaseReceipt> {
        let value = self.price(level);
        self.engine.purchase(
            self.as_signer(payer),
            PurchaseArgs {
                package_level: level,
                sponsor,
                value,
            },
        )
    }

    pub fn withdraw(&mut self, participant: Pubkey, amount: Money) -> Result<WithdrawalReceipt> {
        self.engine.withdraw(
            self.as_signer(participant),
            WithdrawArgs { amount },
            &mut NoopPayoutHook,
        )
    }

    pub fn participant(&self, address: &Pubkey) -> Participant {
        self.engine
            .get_participant(address)
            .expect("participant exists")
    }

    /// Sets a participant's balances directly through a snapshot round-trip.
    pub fn fund(&mut self, address: &Pubkey, balance: Money) {
        let mut ledger = self.engine.ledger().clone();
        let participant = ledger
            .participants
            .require_mut(address)
            .expect("participant exists");
        participant.balance_withdrawable += balance;
        participant.total_earnings += balance;
        participant.earnings_cap = participant.earnings_cap.max(participant.total_earnings);
        ledger.vault_balance += balance;
        self.engine = Engine::from_ledger(ledger);
    }

    /// Overwrites a pool balance, keeping the vault in step.
    pub fn set_pool_balance(&mut self, kind: PoolKind, balance: Money) {
        let mut ledger = self.engine.ledger().clone();
        let pool = ledger.pools.get_mut(kind);
        ledger.vault_balance = ledger.vault_balance - pool.balance + balance;
        pool.balance = balance;
        self.engine = Engine::from_ledger(ledger);
    }

    pub fn bonuses_for(&self, payment: PaymentId) -> Vec<BonusEvent> {
        self.engine.events().bonuses_for(payment).copied().collect()
    }

    pub fn event_count(&self) -> usize {
        self.engine.events().len()
    }

    pub fn last_event(&self) -> Option<LedgerEvent> {
        self.engine.events().iter().last().cloned()
    }

    /// Vault equals pools plus withdrawable balances.
    pub fn assert_solvent(&self) {
        queries::verify_solvency(self.engine.ledger()).expect("ledger should be solvent");
    }
}

/// Asserts that `result` failed with the given engine error.
#[macro_export]
macro_rules! assert_ledger_err {
    ($result:expr, $variant:expr) => {{
        let err = $result.expect_err("operation should fail");
        assert!(
            $variant.matches(&err),
            "expected {:?}, got {:?}",
            $variant,
            err
        );
    }};
}
