use anchor_lang::prelude::*;

use crate::{
    pools::PoolKind,
    state::{Money, PaymentId},
};

/// Recipient of a credit
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Beneficiary {
    Participant(Pubkey),
    Pool(PoolKind),
}

/// Nominal purpose of a credit
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BonusKind {
    /// Sponsor's share of a payment
    Direct,
    /// Level bonus for upline level 1..=10
    Level(u8),
    /// Upline bonus for chain slot 1..=30
    Upline(u8),
    LeaderPool,
    HelpPool,
    ClubPool,
    /// Share of a scheduled pool distribution
    PoolShare(PoolKind),
}

/// Why an amount landed in the Help pool instead of its nominal recipient
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
    EarningsCap,
    Blacklisted,
    VacantSlot,
    NoSponsor,
    RoundingDust,
}

/// Emitted for every credit, including pool accruals and redirects
#[event]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusEvent {
    /// Payment, reinvestment, or distribution batch that produced the credit
    pub from_payment: PaymentId,
    /// Who actually received the amount
    pub to: Beneficiary,
    pub amount: Money,
    /// Nominal purpose; kept on redirects so the original intent stays visible
    pub kind: BonusKind,
    /// Set when `to` is the Help pool in place of the nominal recipient
    pub redirect: Option<RedirectReason>,
}

/// Event emitted when the ledger is initialized
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerInitialized {
    /// The authority that initialized the ledger
    pub authority: Pubkey,
    /// The root participant
    pub root: Pubkey,
    /// The treasury receiving platform fees
    pub treasury: Pubkey,
    /// Number of packages in the catalog
    pub package_count: u8,
    /// Unix timestamp of initialization
    pub timestamp: i64,
}

/// Event emitted when a participant is registered and placed
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantRegistered {
    /// The new participant
    pub participant: Pubkey,
    /// The direct sponsor
    pub sponsor: Pubkey,
    /// Matrix parent the participant was placed under
    pub matrix_parent: Pubkey,
    /// Unix timestamp of registration
    pub timestamp: i64,
}

/// Event emitted when a package purchase (first purchase or upgrade) completes
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagePurchased {
    pub payment_id: PaymentId,
    /// The paying participant
    pub participant: Pubkey,
    /// Package level purchased
    pub package_level: u8,
    /// Price paid (in token base units)
    pub price: Money,
    /// Earnings cap after the purchase
    pub earnings_cap: Money,
    /// Whether the participant already held a package
    pub upgrade: bool,
    /// Unix timestamp of the purchase
    pub timestamp: i64,
}

/// Event emitted when a withdrawal is processed
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalProcessed {
    /// The withdrawing participant
    pub participant: Pubkey,
    /// Amount debited from the withdrawable balance
    pub requested: Money,
    /// Cash sent to the participant
    pub withdrawn_to_user: Money,
    /// Platform fee sent to the treasury
    pub treasury_fee: Money,
    /// Amount routed back through the reinvestment cascade
    pub reinvested: Money,
    /// Help pool funded bonus added to the reinvestment
    pub compound_bonus: Money,
    /// Unix timestamp of the withdrawal
    pub timestamp: i64,
}

/// Event emitted when a reinvestment cascade runs
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReinvestmentProcessed {
    pub payment_id: PaymentId,
    /// Participant whose withdrawal was reinvested
    pub participant: Pubkey,
    /// Total reinvested, including the compound bonus
    pub amount: Money,
}

/// Event emitted when a pool distribution pays out
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolDistributed {
    /// Distribution batch identifier
    pub batch_id: PaymentId,
    pub pool: PoolKind,
    /// Amount shared among recipients
    pub distributed: Money,
    /// Number of recipients
    pub recipients: u32,
    /// Even-split remainder kept in the pool
    pub remainder: Money,
    pub timestamp: i64,
}

/// Event emitted when a due distribution finds no eligible recipients
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolDistributionDeferred {
    pub pool: PoolKind,
    /// Balance carried over to the next attempt
    pub balance: Money,
    pub timestamp: i64,
}

/// Event emitted when the system is paused
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramPaused {
    /// The admin who paused the system
    pub authority: Pubkey,
    /// Unix timestamp when the system was paused
    pub timestamp: i64,
}

/// Event emitted when the system is unpaused
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramUnpaused {
    /// The admin who unpaused the system
    pub authority: Pubkey,
    /// Unix timestamp when the system was unpaused
    pub timestamp: i64,
}

/// Event emitted when a participant's blacklist flag changes
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlacklistUpdated {
    pub participant: Pubkey,
    pub blacklisted: bool,
    /// The admin who made the change
    pub updated_by: Pubkey,
}

/// Event emitted when configuration parameters are updated
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigUpdated {
    /// Treasury after the update
    pub treasury: Pubkey,
    /// Daily circuit breaker threshold after the update
    pub circuit_breaker_threshold: Money,
    /// Platform fee (basis points) after the update
    pub platform_fee_bps: u16,
    /// Compound bonus (basis points) after the update
    pub compound_bonus_bps: u16,
    /// Whether the Club pool accrues after the update
    pub club_pool_enabled: bool,
    /// Per-participant daily limit after the update (0 = unlimited)
    pub max_daily_withdrawal_per_participant: Money,
    /// The admin who made the change
    pub updated_by: Pubkey,
}

/// Event emitted when the admin roster changes
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminUpdated {
    pub admin: Pubkey,
    pub enabled: bool,
    /// The authority who made the change
    pub updated_by: Pubkey,
}

/// Event emitted when a participant toggles auto-compounding
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoCompoundUpdated {
    pub participant: Pubkey,
    pub enabled: bool,
}

/// Everything the engine reports to the host, in emission order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    Initialized(LedgerInitialized),
    Registered(ParticipantRegistered),
    PackagePurchased(PackagePurchased),
    Bonus(BonusEvent),
    WithdrawalProcessed(WithdrawalProcessed),
    ReinvestmentProcessed(ReinvestmentProcessed),
    PoolDistributed(PoolDistributed),
    PoolDistributionDeferred(PoolDistributionDeferred),
    Paused(ProgramPaused),
    Unpaused(ProgramUnpaused),
    BlacklistUpdated(BlacklistUpdated),
    ConfigUpdated(ConfigUpdated),
    AdminUpdated(AdminUpdated),
    AutoCompoundUpdated(AutoCompoundUpdated),
}

impl LedgerEvent {
    /// Short name used in logs and CLI output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialized(_) => "LedgerInitialized",
            Self::Registered(_) => "ParticipantRegistered",
            Self::PackagePurchased(_) => "PackagePurchased",
            Self::Bonus(_) => "BonusEvent",
            Self::WithdrawalProcessed(_) => "WithdrawalProcessed",
            Self::ReinvestmentProcessed(_) => "ReinvestmentProcessed",
            Self::PoolDistributed(_) => "PoolDistributed",
            Self::PoolDistributionDeferred(_) => "PoolDistributionDeferred",
            Self::Paused(_) => "ProgramPaused",
            Self::Unpaused(_) => "ProgramUnpaused",
            Self::BlacklistUpdated(_) => "BlacklistUpdated",
            Self::ConfigUpdated(_) => "ConfigUpdated",
            Self::AdminUpdated(_) => "AdminUpdated",
            Self::AutoCompoundUpdated(_) => "AutoCompoundUpdated",
        }
    }

    #[must_use]
    pub const fn as_bonus(&self) -> Option<&BonusEvent> {
        match self {
            Self::Bonus(bonus) => Some(bonus),
            _ => None,
        }
    }
}

/// Append-only event buffer
///
/// Operations push events as they go; a failed operation truncates back to the
/// length recorded before it started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        tracing::trace!(event = event.name(), "emit");
        self.events.push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter()
    }

    /// Events emitted at or after `mark`.
    #[must_use]
    pub fn since(&self, mark: usize) -> &[LedgerEvent] {
        self.events.get(mark..).unwrap_or_default()
    }

    /// Bonus events produced by a given batch.
    pub fn bonuses_for(&self, payment: PaymentId) -> impl Iterator<Item = &BonusEvent> {
        self.events
            .iter()
            .filter_map(LedgerEvent::as_bonus)
            .filter(move |bonus| bonus.from_payment == payment)
    }

    /// Removes and returns every buffered event.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}
