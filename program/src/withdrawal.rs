use anchor_lang::prelude::*;

use crate::{
    constants::{
        BASIS_POINTS_TOTAL, TIER_BASE_WITHDRAW_BPS, TIER_MID_MIN_DIRECTS, TIER_MID_WITHDRAW_BPS,
        TIER_TOP_MIN_DIRECTS, TIER_TOP_WITHDRAW_BPS,
    },
    errors::LedgerError,
    state::{Config, Money, Participant},
    utils::{bps_of, checked_sum, sub},
};

/// Withdrawal tier, derived from direct referrals and the auto-compound flag
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawalTier {
    /// Fewer than 5 direct referrals: 70/30
    Base,
    /// 5 to 19 direct referrals: 75/25
    Mid,
    /// 20 or more direct referrals: 80/20
    Top,
    /// Everything reinvested, plus a compound bonus
    AutoCompound,
}

impl WithdrawalTier {
    #[must_use]
    pub const fn for_participant(participant: &Participant) -> Self {
        if participant.auto_compound {
            Self::AutoCompound
        } else if participant.direct_referral_count >= TIER_TOP_MIN_DIRECTS {
            Self::Top
        } else if participant.direct_referral_count >= TIER_MID_MIN_DIRECTS {
            Self::Mid
        } else {
            Self::Base
        }
    }

    /// Cash share of a withdrawal in basis points.
    #[must_use]
    pub const fn withdraw_bps(self) -> u16 {
        match self {
            Self::Base => TIER_BASE_WITHDRAW_BPS,
            Self::Mid => TIER_MID_WITHDRAW_BPS,
            Self::Top => TIER_TOP_WITHDRAW_BPS,
            Self::AutoCompound => 0,
        }
    }

    #[must_use]
    pub const fn reinvest_bps(self) -> u16 {
        BASIS_POINTS_TOTAL.saturating_sub(self.withdraw_bps())
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Mid => "mid",
            Self::Top => "top",
            Self::AutoCompound => "auto-compound",
        }
    }
}

/// Split parameters that apply to a participant's next withdrawal
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalSplit {
    pub tier: WithdrawalTier,
    pub withdraw_bps: u16,
    pub reinvest_bps: u16,
    pub platform_fee_bps: u16,
    /// Bonus on the reinvested amount (auto-compound only)
    pub compound_bonus_bps: u16,
}

/// Amounts of one withdrawal before the compound bonus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalBreakdown {
    pub requested: Money,
    /// Cash leaving the vault: user payout plus treasury fee
    pub cash_outflow: Money,
    pub treasury_fee: Money,
    pub withdrawn_to_user: Money,
    pub reinvested: Money,
}

impl WithdrawalSplit {
    #[must_use]
    pub const fn for_participant(participant: &Participant, config: &Config) -> Self {
        let tier = WithdrawalTier::for_participant(participant);
        Self {
            tier,
            withdraw_bps: tier.withdraw_bps(),
            reinvest_bps: tier.reinvest_bps(),
            platform_fee_bps: config.platform_fee_bps,
            compound_bonus_bps: match tier {
                WithdrawalTier::AutoCompound => config.compound_bonus_bps,
                _ => 0,
            },
        }
    }

    /// Splits `amount` into user payout, treasury fee, and reinvestment.
    ///
    /// The reinvested part absorbs the rounding of the cash share so the three
    /// parts always sum to `amount`.
    ///
    /// # Errors
    /// Returns `AccountingMismatch` if the parts do not add up (never expected).
    pub fn apply(&self, amount: Money) -> Result<WithdrawalBreakdown> {
        let cash_outflow = bps_of(amount, self.withdraw_bps)?;
        let treasury_fee = bps_of(cash_outflow, self.platform_fee_bps)?;
        let withdrawn_to_user = sub(cash_outflow, treasury_fee)?;
        let reinvested = sub(amount, cash_outflow)?;

        require!(
            checked_sum([withdrawn_to_user, treasury_fee, reinvested])? == amount,
            LedgerError::AccountingMismatch
        );

        Ok(WithdrawalBreakdown {
            requested: amount,
            cash_outflow,
            treasury_fee,
            withdrawn_to_user,
            reinvested,
        })
    }

    /// Compound bonus owed on `reinvested`, before the Help pool cap.
    pub fn compound_bonus(&self, reinvested: Money) -> Result<Money> {
        bps_of(reinvested, self.compound_bonus_bps)
    }
}
