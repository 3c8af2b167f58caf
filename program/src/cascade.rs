//! Bonus distribution cascade
//!
//! A payment (or a reinvestment) is split into direct, level, upline, and pool
//! parts and credited in a fixed order. Every unit of the input lands somewhere:
//! on a participant, in a pool, or redirected to the Help pool with a reason.

use anchor_lang::prelude::*;

use crate::{
    catalog::Package,
    constants::{LEVEL_BONUS_DEPTH, REINVEST_LEVEL_BPS, REINVEST_UPLINE_BPS, UPLINE_CHAIN_LEN},
    errors::LedgerError,
    events::{Beneficiary, BonusEvent, BonusKind, EventLog, LedgerEvent, RedirectReason},
    ledger::{CreditOutcome, ParticipantLedger},
    pools::{PoolKind, Pools},
    state::{Config, LevelSchedule, Money, PaymentId},
    utils::{add, bps_of, checked_sum, div, mul, sub},
};

/// How an amount is divided before crediting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitPlan {
    pub direct: Money,
    pub level: Money,
    pub upline: Money,
    pub leader: Money,
    pub club: Money,
    pub help: Money,
}

impl SplitPlan {
    /// Split of a package purchase.
    ///
    /// The help share is the remainder after the other parts, so rounding never
    /// loses a unit. With the Club pool enabled, `club_bps` of the price is carved
    /// out of the help share (bounded by it).
    pub fn for_package(package: &Package, config: &Config) -> Result<Self> {
        let price = package.price;
        let direct = bps_of(price, package.direct_bps)?;
        let level = bps_of(price, package.level_bps)?;
        let upline = bps_of(price, package.upline_bps)?;
        let leader = bps_of(price, package.leader_bps)?;
        let help_share = sub(price, checked_sum([direct, level, upline, leader])?)?;
        let club = if config.club_pool_enabled {
            bps_of(price, config.club_bps)?.min(help_share)
        } else {
            0
        };
        Ok(Self {
            direct,
            level,
            upline,
            leader,
            club,
            help: sub(help_share, club)?,
        })
    }

    /// Split of a reinvested amount: 40% level, 30% upline, 30% help.
    pub fn for_reinvestment(amount: Money) -> Result<Self> {
        let level = bps_of(amount, REINVEST_LEVEL_BPS)?;
        let upline = bps_of(amount, REINVEST_UPLINE_BPS)?;
        let help = sub(amount, add(level, upline)?)?;
        Ok(Self {
            level,
            upline,
            help,
            ..Self::default()
        })
    }

    pub fn total(&self) -> Result<Money> {
        checked_sum([
            self.direct,
            self.level,
            self.upline,
            self.leader,
            self.club,
            self.help,
        ])
    }
}

/// Where the amounts of one cascade ended up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub payment_id: PaymentId,
    /// Credited to participant balances
    pub paid_to_participants: Money,
    pub leader_accrued: Money,
    pub club_accrued: Money,
    /// Help accrual including every redirect
    pub help_accrued: Money,
    /// Portion of `help_accrued` that was redirected from a nominal recipient
    pub redirected: Money,
}

impl CascadeReport {
    pub fn total(&self) -> Result<Money> {
        checked_sum([
            self.paid_to_participants,
            self.leader_accrued,
            self.club_accrued,
            self.help_accrued,
        ])
    }
}

/// Credits a participant and routes whatever could not be credited to Help.
///
/// Shared by the cascade and pool distributions. Returns the outcome so callers
/// can keep totals.
pub fn credit_participant(
    participants: &mut ParticipantLedger,
    pools: &mut Pools,
    events: &mut EventLog,
    source: PaymentId,
    recipient: &Pubkey,
    amount: Money,
    kind: BonusKind,
) -> Result<CreditOutcome> {
    let outcome = participants.credit_earnings(recipient, amount)?;
    if outcome.credited > 0 {
        events.emit(LedgerEvent::Bonus(BonusEvent {
            from_payment: source,
            to: Beneficiary::Participant(*recipient),
            amount: outcome.credited,
            kind,
            redirect: None,
        }));
    }
    if let Some(reason) = outcome.reason {
        tracing::warn!(
            payment = %source,
            recipient = %recipient,
            amount = outcome.redirected,
            ?reason,
            "credit redirected to help pool"
        );
        redirect_to_help(pools, events, source, outcome.redirected, kind, reason)?;
    }
    Ok(outcome)
}

/// Accrues `amount` to the Help pool on behalf of a nominal recipient.
pub fn redirect_to_help(
    pools: &mut Pools,
    events: &mut EventLog,
    source: PaymentId,
    amount: Money,
    kind: BonusKind,
    reason: RedirectReason,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    pools.help.accrue(amount)?;
    events.emit(LedgerEvent::Bonus(BonusEvent {
        from_payment: source,
        to: Beneficiary::Pool(PoolKind::Help),
        amount,
        kind,
        redirect: Some(reason),
    }));
    Ok(())
}

fn ordinal(index: usize) -> u8 {
    u8::try_from(index.saturating_add(1)).unwrap_or(u8::MAX)
}

/// One run of the cascade for a single payment or reinvestment
pub struct Cascade<'a> {
    participants: &'a mut ParticipantLedger,
    pools: &'a mut Pools,
    events: &'a mut EventLog,
    schedule: &'a LevelSchedule,
    report: CascadeReport,
}

impl<'a> Cascade<'a> {
    pub fn new(
        participants: &'a mut ParticipantLedger,
        pools: &'a mut Pools,
        events: &'a mut EventLog,
        schedule: &'a LevelSchedule,
        payment_id: PaymentId,
    ) -> Self {
        Self {
            participants,
            pools,
            events,
            schedule,
            report: CascadeReport {
                payment_id,
                ..CascadeReport::default()
            },
        }
    }

    /// Distributes `plan` on behalf of `origin`.
    ///
    /// Order: direct, level, upline, leader, club, help.
    ///
    /// # Errors
    /// Returns `ParticipantNotFound` if `origin` is unknown and
    /// `AccountingMismatch` if the credited total differs from the plan total.
    pub fn run(mut self, origin: &Pubkey, plan: &SplitPlan) -> Result<CascadeReport> {
        let origin_record = self.participants.require(origin)?;
        let sponsor = origin_record.sponsor;
        let chain = origin_record.upline_chain;

        self.pay_direct(sponsor, plan.direct)?;
        self.pay_levels(chain.as_slice(), plan.level)?;
        self.pay_uplines(chain.as_slice(), plan.upline)?;
        self.accrue(PoolKind::Leader, plan.leader, BonusKind::LeaderPool)?;
        self.accrue(PoolKind::Club, plan.club, BonusKind::ClubPool)?;
        self.accrue(PoolKind::Help, plan.help, BonusKind::HelpPool)?;

        let expected = plan.total()?;
        let actual = self.report.total()?;
        if expected != actual {
            tracing::error!(expected, actual, payment = %self.report.payment_id, "cascade totals diverged");
            return Err(LedgerError::AccountingMismatch.into());
        }

        tracing::debug!(
            payment = %self.report.payment_id,
            origin = %origin,
            amount = expected,
            paid = self.report.paid_to_participants,
            redirected = self.report.redirected,
            "cascade complete"
        );
        Ok(self.report)
    }

    fn pay_direct(&mut self, sponsor: Option<Pubkey>, amount: Money) -> Result<()> {
        match sponsor {
            Some(sponsor) => self.credit(&sponsor, amount, BonusKind::Direct),
            None => self.redirect(amount, BonusKind::Direct, RedirectReason::NoSponsor),
        }
    }

    fn pay_levels(&mut self, chain: &[Pubkey], pot: Money) -> Result<()> {
        let mut paid = 0;
        for index in 0..LEVEL_BONUS_DEPTH {
            let share = self.schedule.share(pot, index)?;
            paid = add(paid, share)?;
            let kind = BonusKind::Level(ordinal(index));
            match chain.get(index) {
                Some(recipient) => self.credit(recipient, share, kind)?,
                None => self.redirect(share, kind, RedirectReason::VacantSlot)?,
            }
        }
        self.redirect(
            sub(pot, paid)?,
            BonusKind::Level(0),
            RedirectReason::RoundingDust,
        )
    }

    fn pay_uplines(&mut self, chain: &[Pubkey], pot: Money) -> Result<()> {
        let slots = u64::try_from(UPLINE_CHAIN_LEN).map_err(|_| LedgerError::ArithmeticError)?;
        let per_slot = div(pot, slots)?;
        for index in 0..UPLINE_CHAIN_LEN {
            let kind = BonusKind::Upline(ordinal(index));
            match chain.get(index) {
                Some(recipient) => self.credit(recipient, per_slot, kind)?,
                None => self.redirect(per_slot, kind, RedirectReason::VacantSlot)?,
            }
        }
        self.redirect(
            sub(pot, mul(per_slot, slots)?)?,
            BonusKind::Upline(0),
            RedirectReason::RoundingDust,
        )
    }

    fn credit(&mut self, recipient: &Pubkey, amount: Money, kind: BonusKind) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let outcome = credit_participant(
            self.participants,
            self.pools,
            self.events,
            self.report.payment_id,
            recipient,
            amount,
            kind,
        )?;
        self.report.paid_to_participants = add(self.report.paid_to_participants, outcome.credited)?;
        self.report.help_accrued = add(self.report.help_accrued, outcome.redirected)?;
        self.report.redirected = add(self.report.redirected, outcome.redirected)?;
        Ok(())
    }

    fn redirect(&mut self, amount: Money, kind: BonusKind, reason: RedirectReason) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        redirect_to_help(self.pools, self.events, self.report.payment_id, amount, kind, reason)?;
        self.report.help_accrued = add(self.report.help_accrued, amount)?;
        self.report.redirected = add(self.report.redirected, amount)?;
        Ok(())
    }

    fn accrue(&mut self, pool: PoolKind, amount: Money, kind: BonusKind) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.pools.get_mut(pool).accrue(amount)?;
        self.events.emit(LedgerEvent::Bonus(BonusEvent {
            from_payment: self.report.payment_id,
            to: Beneficiary::Pool(pool),
            amount,
            kind,
            redirect: None,
        }));
        let bucket = match pool {
            PoolKind::Leader => &mut self.report.leader_accrued,
            PoolKind::Club => &mut self.report.club_accrued,
            PoolKind::Help => &mut self.report.help_accrued,
        };
        *bucket = add(*bucket, amount)?;
        Ok(())
    }
}
