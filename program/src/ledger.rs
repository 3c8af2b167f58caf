use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::{
    constants::EARNINGS_CAP_MULTIPLIER,
    errors::LedgerError,
    events::RedirectReason,
    state::{Money, Participant},
    utils::{add, checked_sum, mul},
};

/// Result of crediting earnings to a participant
///
/// `credited + redirected` always equals the requested amount. A non-zero
/// `redirected` carries the reason it could not be credited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditOutcome {
    pub credited: Money,
    pub redirected: Money,
    pub reason: Option<RedirectReason>,
}

/// Keyed store of participant records
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantLedger {
    records: BTreeMap<Pubkey, Participant>,
}

impl ParticipantLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, address: &Pubkey) -> bool {
        self.records.contains_key(address)
    }

    #[must_use]
    pub fn get(&self, address: &Pubkey) -> Option<&Participant> {
        self.records.get(address)
    }

    /// # Errors
    /// Returns `ParticipantNotFound` when `address` has no record.
    pub fn require(&self, address: &Pubkey) -> Result<&Participant> {
        self.records
            .get(address)
            .ok_or_else(|| LedgerError::ParticipantNotFound.into())
    }

    /// # Errors
    /// Returns `ParticipantNotFound` when `address` has no record.
    pub fn require_mut(&mut self, address: &Pubkey) -> Result<&mut Participant> {
        self.records
            .get_mut(address)
            .ok_or_else(|| LedgerError::ParticipantNotFound.into())
    }

    /// # Errors
    /// Returns `AlreadyRegistered` when the address already has a record.
    pub fn insert(&mut self, participant: Participant) -> Result<()> {
        require!(
            !self.records.contains_key(&participant.address),
            LedgerError::AlreadyRegistered
        );
        self.records.insert(participant.address, participant);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Participants in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.records.values()
    }

    /// Credits up to the participant's remaining cap.
    ///
    /// Blacklisted participants receive nothing. Whatever is not credited is
    /// reported back for the caller to route to the Help pool; this never fails on
    /// cap or blacklist grounds.
    ///
    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address and `ArithmeticError` on
    /// overflow.
    pub fn credit_earnings(&mut self, address: &Pubkey, amount: Money) -> Result<CreditOutcome> {
        let participant = self.require_mut(address)?;
        if participant.blacklisted {
            return Ok(CreditOutcome {
                credited: 0,
                redirected: amount,
                reason: (amount > 0).then_some(RedirectReason::Blacklisted),
            });
        }

        let credited = amount.min(participant.remaining_cap());
        let redirected = amount.saturating_sub(credited);
        participant.balance_withdrawable = add(participant.balance_withdrawable, credited)?;
        participant.total_earnings = add(participant.total_earnings, credited)?;

        Ok(CreditOutcome {
            credited,
            redirected,
            reason: (redirected > 0).then_some(RedirectReason::EarningsCap),
        })
    }

    /// Records a package purchase: level, cumulative spend, and a raised cap.
    ///
    /// The cap only ever grows because spend only ever grows.
    ///
    /// # Errors
    /// Returns `ParticipantNotFound`, `DowngradeNotAllowed` for a lower level, or
    /// `ArithmeticError` on overflow.
    pub fn set_package_level(
        &mut self,
        address: &Pubkey,
        level: u8,
        price: Money,
        now: i64,
    ) -> Result<()> {
        let participant = self.require_mut(address)?;
        require!(
            level >= participant.package_level,
            LedgerError::DowngradeNotAllowed
        );
        participant.package_level = level;
        participant.cumulative_spend = add(participant.cumulative_spend, price)?;
        participant.earnings_cap = participant
            .earnings_cap
            .max(mul(participant.cumulative_spend, EARNINGS_CAP_MULTIPLIER)?);
        participant.last_active_at = now;
        Ok(())
    }

    /// # Errors
    /// Returns `ParticipantNotFound` for an unknown address.
    pub fn set_blacklisted(&mut self, address: &Pubkey, blacklisted: bool) -> Result<()> {
        self.require_mut(address)?.blacklisted = blacklisted;
        Ok(())
    }

    /// Sum of every participant's withdrawable balance.
    pub fn total_withdrawable(&self) -> Result<Money> {
        checked_sum(self.records.values().map(|p| p.balance_withdrawable))
    }
}
