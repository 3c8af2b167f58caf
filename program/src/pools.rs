use anchor_lang::prelude::*;
use std::fmt;

use crate::{
    errors::LedgerError,
    ledger::ParticipantLedger,
    state::{Config, LeaderRank, Money, Participant},
    utils::{add, checked_sum, div, elapsed_secs, mul, sub},
};

/// The three shared pools
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum PoolKind {
    Leader,
    Help,
    Club,
}

impl PoolKind {
    pub const ALL: [Self; 3] = [Self::Leader, Self::Help, Self::Club];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Help => "help",
            Self::Club => "club",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PoolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "leader" => Ok(Self::Leader),
            "help" => Ok(Self::Help),
            "club" => Ok(Self::Club),
            other => Err(format!("unknown pool '{other}' (expected leader, help, or club)")),
        }
    }
}

/// A pool balance and its distribution schedule
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pool {
    pub balance: Money,
    /// Unix timestamp of the last successful distribution
    pub last_distributed_at: i64,
    pub distribution_interval_secs: u64,
}

impl Pool {
    /// Empty pool whose first distribution becomes due one interval after `now`.
    #[must_use]
    pub const fn new(distribution_interval_secs: u64, now: i64) -> Self {
        Self {
            balance: 0,
            last_distributed_at: now,
            distribution_interval_secs,
        }
    }

    pub fn accrue(&mut self, amount: Money) -> Result<()> {
        self.balance = add(self.balance, amount)?;
        Ok(())
    }

    /// # Errors
    /// Returns `ArithmeticError` if `amount` exceeds the balance.
    pub fn debit(&mut self, amount: Money) -> Result<()> {
        self.balance = sub(self.balance, amount)?;
        Ok(())
    }

    #[must_use]
    pub fn is_due(&self, now: i64) -> bool {
        elapsed_secs(self.last_distributed_at, now) >= self.distribution_interval_secs
    }

    /// Unix timestamp at which the next distribution becomes due.
    #[must_use]
    pub fn next_due_at(&self) -> i64 {
        self.last_distributed_at
            .saturating_add(i64::try_from(self.distribution_interval_secs).unwrap_or(i64::MAX))
    }
}

/// Leader, Help, and Club pools
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pools {
    pub leader: Pool,
    pub help: Pool,
    pub club: Pool,
}

impl Pools {
    #[must_use]
    pub const fn new(leader: Pool, help: Pool, club: Pool) -> Self {
        Self { leader, help, club }
    }

    #[must_use]
    pub const fn get(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Leader => &self.leader,
            PoolKind::Help => &self.help,
            PoolKind::Club => &self.club,
        }
    }

    pub fn get_mut(&mut self, kind: PoolKind) -> &mut Pool {
        match kind {
            PoolKind::Leader => &mut self.leader,
            PoolKind::Help => &mut self.help,
            PoolKind::Club => &mut self.club,
        }
    }

    pub fn total(&self) -> Result<Money> {
        checked_sum([self.leader.balance, self.help.balance, self.club.balance])
    }

    #[must_use]
    pub const fn balances(&self) -> PoolBalances {
        PoolBalances {
            leader: self.leader.balance,
            help: self.help.balance,
            club: self.club.balance,
        }
    }
}

/// Snapshot of the three pool balances
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolBalances {
    pub leader: Money,
    pub help: Money,
    pub club: Money,
}

/// Planned shares of one pool distribution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionPlan {
    pub shares: Vec<(Pubkey, Money)>,
    /// Amount left in the pool after the even split
    pub remainder: Money,
}

impl DistributionPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn distributed(&self) -> Result<Money> {
        checked_sum(self.shares.iter().map(|(_, amount)| *amount))
    }

    fn push_even_split(&mut self, amount: Money, recipients: &[Pubkey]) -> Result<()> {
        let count = u64::try_from(recipients.len()).map_err(|_| LedgerError::ArithmeticError)?;
        let per_share = div(amount, count)?;
        let dust = sub(amount, mul(per_share, count)?)?;
        self.shares
            .extend(recipients.iter().map(|recipient| (*recipient, per_share)));
        self.remainder = add(self.remainder, dust)?;
        Ok(())
    }
}

fn can_receive(participant: &Participant) -> bool {
    !participant.blacklisted && !participant.is_capped()
}

/// Whether `participant` qualifies for a distribution of `kind` at `now`.
#[must_use]
pub fn is_eligible(kind: PoolKind, participant: &Participant, config: &Config, now: i64) -> bool {
    if !can_receive(participant) {
        return false;
    }
    match kind {
        PoolKind::Leader => participant.leader_rank() >= LeaderRank::ShiningStar,
        PoolKind::Help => {
            participant.package_level > 0
                && participant.is_active(now, config.activity_window_secs)
        }
        PoolKind::Club => participant.package_level >= config.club_min_level,
    }
}

/// Computes the shares of distributing `balance` from pool `kind`.
///
/// Help and Club split evenly across eligible participants. Leader splits half to
/// Shining Stars and half to Silver Stars (evenly within each group); when one
/// group is empty the other receives the whole balance. An empty plan means no
/// participant is eligible.
pub fn plan_distribution(
    kind: PoolKind,
    balance: Money,
    participants: &ParticipantLedger,
    config: &Config,
    now: i64,
) -> Result<DistributionPlan> {
    let mut plan = DistributionPlan::default();
    let eligible: Vec<&Participant> = participants
        .iter()
        .filter(|participant| is_eligible(kind, participant, config, now))
        .collect();

    if eligible.is_empty() {
        plan.remainder = balance;
        return Ok(plan);
    }

    match kind {
        PoolKind::Leader => {
            let (silver, shining): (Vec<Pubkey>, Vec<Pubkey>) = {
                let silver = eligible
                    .iter()
                    .filter(|p| p.leader_rank() == LeaderRank::SilverStar)
                    .map(|p| p.address)
                    .collect();
                let shining = eligible
                    .iter()
                    .filter(|p| p.leader_rank() == LeaderRank::ShiningStar)
                    .map(|p| p.address)
                    .collect();
                (silver, shining)
            };

            if shining.is_empty() {
                plan.push_even_split(balance, &silver)?;
            } else if silver.is_empty() {
                plan.push_even_split(balance, &shining)?;
            } else {
                let shining_half = div(balance, 2)?;
                let silver_half = sub(balance, shining_half)?;
                plan.push_even_split(shining_half, &shining)?;
                plan.push_even_split(silver_half, &silver)?;
            }
        }
        PoolKind::Help | PoolKind::Club => {
            let recipients: Vec<Pubkey> = eligible.iter().map(|p| p.address).collect();
            plan.push_even_split(balance, &recipients)?;
        }
    }

    Ok(plan)
}
