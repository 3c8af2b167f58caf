use anchor_lang::prelude::*;
use std::fmt;

use crate::{
    breaker::CircuitBreaker,
    catalog::PackageCatalog,
    constants::{
        BASIS_POINTS_TOTAL, LEVEL_BONUS_DEPTH, SHINING_STAR_MIN_DIRECTS, SHINING_STAR_MIN_TEAM,
        SILVER_STAR_MIN_TEAM, UPLINE_CHAIN_LEN,
    },
    errors::LedgerError,
    ledger::ParticipantLedger,
    pools::Pools,
    utils::{add, bps_of, elapsed_secs},
};

/// Token amount in base units (6 decimals).
pub type Money = u64;

/// Identifier of a payment, reinvestment, or pool distribution batch.
///
/// Every credit emitted by the engine references the batch that produced it.
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct PaymentId(pub u64);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Level bonus weighting across upline levels 1..=10
///
/// Weights are basis points of the level pot (the `level_bps` share of a payment)
/// and must sum to 10,000. The default schedule pays level 1 three times as much as
/// levels 2–6 and six times as much as levels 7–10.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelSchedule {
    pub weights_bps: [u16; LEVEL_BONUS_DEPTH],
}

impl LevelSchedule {
    /// 3% / 1% ×5 / 0.5% ×4 of price when the level share is 10%.
    #[must_use]
    pub const fn front_loaded() -> Self {
        Self {
            weights_bps: [3_000, 1_000, 1_000, 1_000, 1_000, 1_000, 500, 500, 500, 500],
        }
    }

    /// Every level receives the same share.
    #[must_use]
    pub const fn equal() -> Self {
        Self {
            weights_bps: [1_000; LEVEL_BONUS_DEPTH],
        }
    }

    /// # Errors
    /// Returns `InvalidConfiguration` unless the weights sum to exactly 10,000.
    pub fn validate(&self) -> Result<()> {
        let total: u32 = self.weights_bps.iter().map(|w| u32::from(*w)).sum();
        require!(
            total == u32::from(BASIS_POINTS_TOTAL),
            LedgerError::InvalidConfiguration
        );
        Ok(())
    }

    /// Amount owed to the level at `index` (0-based) out of `pot`.
    pub fn share(&self, pot: Money, index: usize) -> Result<Money> {
        let weight = self
            .weights_bps
            .get(index)
            .copied()
            .ok_or(LedgerError::InvalidLevel)?;
        bps_of(pot, weight)
    }
}

impl Default for LevelSchedule {
    fn default() -> Self {
        Self::front_loaded()
    }
}

/// Fixed-capacity list of ancestors by sponsor link, nearest first
///
/// Slot 0 is the sponsor, slot 1 the sponsor's sponsor, and so on. Slots at or
/// beyond `len` are vacant. The chain is computed once at registration and never
/// rewritten, so bonus routing stays reproducible.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UplineChain {
    slots: [Pubkey; UPLINE_CHAIN_LEN],
    len: u8,
}

impl UplineChain {
    /// Chain with no populated slots (the root's chain).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Chain of a participant directly sponsored by `sponsor`.
    ///
    /// The sponsor takes slot 0 and the sponsor's own chain shifts down one slot;
    /// the oldest ancestor falls off when the sponsor's chain is already full.
    #[must_use]
    pub fn extend_from(sponsor: Pubkey, sponsor_chain: &Self) -> Self {
        let inherited = sponsor_chain
            .len()
            .min(UPLINE_CHAIN_LEN.saturating_sub(1));
        let mut slots = [Pubkey::default(); UPLINE_CHAIN_LEN];
        slots[0] = sponsor;
        for (slot, ancestor) in slots
            .iter_mut()
            .skip(1)
            .zip(sponsor_chain.slots.iter().take(inherited))
        {
            *slot = *ancestor;
        }
        Self {
            slots,
            len: u8::try_from(inherited.saturating_add(1)).unwrap_or(u8::MAX),
        }
    }

    /// Ancestor at `index`, or `None` for a vacant slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Pubkey> {
        self.as_slice().get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len).min(UPLINE_CHAIN_LEN)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Populated slots only.
    #[must_use]
    pub fn as_slice(&self) -> &[Pubkey] {
        &self.slots[..self.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pubkey> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, address: &Pubkey) -> bool {
        self.as_slice().contains(address)
    }
}

/// Leader rank, derived from team size and direct referrals
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum LeaderRank {
    /// No leader qualification
    None,
    /// 250+ team members and 10+ direct referrals
    ShiningStar,
    /// 500+ team members
    SilverStar,
}

impl LeaderRank {
    #[must_use]
    pub const fn from_counts(team_size: u32, direct_referrals: u32) -> Self {
        if team_size >= SILVER_STAR_MIN_TEAM {
            Self::SilverStar
        } else if team_size >= SHINING_STAR_MIN_TEAM && direct_referrals >= SHINING_STAR_MIN_DIRECTS
        {
            Self::ShiningStar
        } else {
            Self::None
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ShiningStar => "shining-star",
            Self::SilverStar => "silver-star",
        }
    }
}

/// Per-address participant record
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    /// Participant address
    pub address: Pubkey,
    /// Direct referrer; `None` only for the root
    pub sponsor: Option<Pubkey>,
    /// Highest package level purchased (0 = registered without a package)
    pub package_level: u8,
    /// Unix timestamp of registration
    pub registered_at: i64,
    /// Last registration, purchase, or withdrawal
    pub last_active_at: i64,
    /// Credited earnings available for withdrawal
    pub balance_withdrawable: Money,
    /// Lifetime credited earnings (never decreases)
    pub total_earnings: Money,
    /// Lifetime earnings ceiling (4x cumulative spend)
    pub earnings_cap: Money,
    /// Sum of every package price paid
    pub cumulative_spend: Money,
    /// Lifetime cash paid out to this participant (after fees)
    pub total_withdrawn: Money,
    /// Number of participants this address sponsored
    pub direct_referral_count: u32,
    /// Size of the matrix subtree below this participant
    pub team_size: u32,
    pub matrix_parent: Option<Pubkey>,
    pub matrix_left: Option<Pubkey>,
    pub matrix_right: Option<Pubkey>,
    /// Ancestors by sponsor link, frozen at registration
    pub upline_chain: UplineChain,
    /// Reinvest every withdrawal in full
    pub auto_compound: bool,
    /// Frozen for credits, withdrawals, purchases, and sponsoring
    pub blacklisted: bool,
    /// UTC day index of `withdrawn_today`
    pub withdrawal_day: i64,
    /// Cash outflow on `withdrawal_day`
    pub withdrawn_today: Money,
}

impl Participant {
    #[must_use]
    pub fn new(address: Pubkey, sponsor: Option<Pubkey>, upline_chain: UplineChain, now: i64) -> Self {
        Self {
            address,
            sponsor,
            package_level: 0,
            registered_at: now,
            last_active_at: now,
            balance_withdrawable: 0,
            total_earnings: 0,
            earnings_cap: 0,
            cumulative_spend: 0,
            total_withdrawn: 0,
            direct_referral_count: 0,
            team_size: 0,
            matrix_parent: None,
            matrix_left: None,
            matrix_right: None,
            upline_chain,
            auto_compound: false,
            blacklisted: false,
            withdrawal_day: 0,
            withdrawn_today: 0,
        }
    }

    /// The root participant: no sponsor, empty chain, and no earnings cap.
    #[must_use]
    pub fn root(address: Pubkey, now: i64) -> Self {
        let mut root = Self::new(address, None, UplineChain::empty(), now);
        root.earnings_cap = Money::MAX;
        root
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.sponsor.is_none()
    }

    /// Earnings still creditable before the cap is reached.
    #[must_use]
    pub const fn remaining_cap(&self) -> Money {
        self.earnings_cap.saturating_sub(self.total_earnings)
    }

    /// True once lifetime earnings reached the cap (including a zero cap).
    #[must_use]
    pub const fn is_capped(&self) -> bool {
        self.total_earnings >= self.earnings_cap
    }

    #[must_use]
    pub const fn leader_rank(&self) -> LeaderRank {
        LeaderRank::from_counts(self.team_size, self.direct_referral_count)
    }

    #[must_use]
    pub fn is_active(&self, now: i64, window_secs: u64) -> bool {
        elapsed_secs(self.last_active_at, now) <= window_secs
    }
}

/// Operator configuration and admin roster
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Owner; the only key that can change the admin roster
    pub authority: Pubkey,
    /// Additional admins
    pub admins: Vec<Pubkey>,
    /// Receives platform fees
    pub treasury: Pubkey,
    /// Designated root participant
    pub root: Pubkey,
    /// Manual kill switch for payments and withdrawals
    pub paused: bool,
    /// Fee on the cash portion of a withdrawal
    pub platform_fee_bps: u16,
    /// Bonus on reinvested amounts of auto-compounding participants
    pub compound_bonus_bps: u16,
    pub level_schedule: LevelSchedule,
    /// Whether payments feed the Club pool
    pub club_pool_enabled: bool,
    /// Share of each payment carved from the help share into the Club pool
    pub club_bps: u16,
    /// Minimum package level for Club pool membership
    pub club_min_level: u8,
    /// Help pool activity requirement
    pub activity_window_secs: u64,
    /// Per-participant daily cash outflow limit (0 = unlimited)
    pub max_daily_withdrawal_per_participant: Money,
}

impl Config {
    #[must_use]
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        *key == self.authority || self.admins.contains(key)
    }
}

/// Running totals kept for the health dashboard
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub payments_processed: u64,
    pub total_volume: Money,
    pub total_paid_out: Money,
    pub total_fees: Money,
}

/// Complete engine state
///
/// This is the persisted layout: one keyed participant store, the package table,
/// the three pools, the breaker window, and scalar config fields.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    pub config: Config,
    pub catalog: PackageCatalog,
    pub participants: ParticipantLedger,
    pub pools: Pools,
    pub breaker: CircuitBreaker,
    /// Funds held by the engine: pools plus withdrawable balances
    pub vault_balance: Money,
    pub stats: LedgerStats,
    next_payment_id: u64,
}

impl Ledger {
    #[must_use]
    pub const fn new(
        config: Config,
        catalog: PackageCatalog,
        participants: ParticipantLedger,
        pools: Pools,
        breaker: CircuitBreaker,
    ) -> Self {
        Self {
            config,
            catalog,
            participants,
            pools,
            breaker,
            vault_balance: 0,
            stats: LedgerStats {
                payments_processed: 0,
                total_volume: 0,
                total_paid_out: 0,
                total_fees: 0,
            },
            next_payment_id: 1,
        }
    }

    /// Allocates the next batch identifier.
    pub fn allocate_payment_id(&mut self) -> Result<PaymentId> {
        let id = PaymentId(self.next_payment_id);
        self.next_payment_id = self
            .next_payment_id
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticError)?;
        Ok(id)
    }

    /// Sum of pool balances and participant balances.
    ///
    /// Equals `vault_balance` after every successful operation.
    pub fn accounted_balance(&self) -> Result<Money> {
        add(self.pools.total()?, self.participants.total_withdrawable()?)
    }
}
