use anchor_lang::prelude::*;

use crate::{
    constants::{BASIS_POINTS_TOTAL, MAX_PLATFORM_FEE_BPS},
    errors::LedgerError,
    events::{ConfigUpdated, LedgerEvent},
    runtime::ExecContext,
    state::LevelSchedule,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateConfigArgs {
    pub treasury: Option<Pubkey>,
    pub circuit_breaker_threshold: Option<u64>,
    pub platform_fee_bps: Option<u16>,
    pub compound_bonus_bps: Option<u16>,
    pub level_schedule: Option<LevelSchedule>,
    pub club_pool_enabled: Option<bool>,
    pub club_bps: Option<u16>,
    pub activity_window_secs: Option<u64>,
    pub max_daily_withdrawal_per_participant: Option<u64>,
}

impl UpdateConfigArgs {
    fn has_update(&self) -> bool {
        self.treasury.is_some()
            || self.circuit_breaker_threshold.is_some()
            || self.platform_fee_bps.is_some()
            || self.compound_bonus_bps.is_some()
            || self.level_schedule.is_some()
            || self.club_pool_enabled.is_some()
            || self.club_bps.is_some()
            || self.activity_window_secs.is_some()
            || self.max_daily_withdrawal_per_participant.is_some()
    }
}

/// Updates operator parameters (admin only).
///
/// All fields are validated before any is applied.
///
/// # Errors
/// Returns `Unauthorized` for non-admins and `InvalidConfiguration` when no field
/// is set or a value is out of range.
pub fn handler(ctx: &mut ExecContext<'_>, args: UpdateConfigArgs) -> Result<()> {
    ctx.require_admin()?;
    require!(args.has_update(), LedgerError::InvalidConfiguration);

    if let Some(treasury) = args.treasury {
        require!(
            treasury != Pubkey::default(),
            LedgerError::InvalidConfiguration
        );
    }
    if let Some(threshold) = args.circuit_breaker_threshold {
        require!(threshold > 0, LedgerError::InvalidConfiguration);
    }
    if let Some(fee) = args.platform_fee_bps {
        require!(fee <= MAX_PLATFORM_FEE_BPS, LedgerError::InvalidConfiguration);
    }
    if let Some(bonus) = args.compound_bonus_bps {
        require!(bonus <= BASIS_POINTS_TOTAL, LedgerError::InvalidConfiguration);
    }
    if let Some(club_bps) = args.club_bps {
        require!(club_bps <= BASIS_POINTS_TOTAL, LedgerError::InvalidConfiguration);
    }
    if let Some(schedule) = &args.level_schedule {
        schedule.validate()?;
    }

    let updated_by = *ctx.signer();
    let ledger = &mut *ctx.ledger;
    let config = &mut ledger.config;
    if let Some(treasury) = args.treasury {
        config.treasury = treasury;
    }
    if let Some(fee) = args.platform_fee_bps {
        config.platform_fee_bps = fee;
    }
    if let Some(bonus) = args.compound_bonus_bps {
        config.compound_bonus_bps = bonus;
    }
    if let Some(schedule) = args.level_schedule {
        config.level_schedule = schedule;
    }
    if let Some(enabled) = args.club_pool_enabled {
        config.club_pool_enabled = enabled;
    }
    if let Some(club_bps) = args.club_bps {
        config.club_bps = club_bps;
    }
    if let Some(window) = args.activity_window_secs {
        config.activity_window_secs = window;
    }
    if let Some(limit) = args.max_daily_withdrawal_per_participant {
        config.max_daily_withdrawal_per_participant = limit;
    }
    if let Some(threshold) = args.circuit_breaker_threshold {
        ledger.breaker.set_threshold(threshold)?;
    }

    let config = &ledger.config;
    ctx.events.emit(LedgerEvent::ConfigUpdated(ConfigUpdated {
        treasury: config.treasury,
        circuit_breaker_threshold: ledger.breaker.threshold,
        platform_fee_bps: config.platform_fee_bps,
        compound_bonus_bps: config.compound_bonus_bps,
        club_pool_enabled: config.club_pool_enabled,
        max_daily_withdrawal_per_participant: config.max_daily_withdrawal_per_participant,
        updated_by,
    }));

    tracing::info!(
        updated_by = %updated_by,
        treasury = %config.treasury,
        circuit_breaker_threshold = ledger.breaker.threshold,
        platform_fee_bps = config.platform_fee_bps,
        "config updated"
    );

    Ok(())
}
