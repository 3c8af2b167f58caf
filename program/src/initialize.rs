use anchor_lang::prelude::*;

use crate::{
    breaker::CircuitBreaker,
    catalog::{Package, PackageCatalog},
    constants::{
        BASIS_POINTS_TOTAL, DEFAULT_ACTIVITY_WINDOW_SECS, DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
        DEFAULT_CLUB_BPS, DEFAULT_CLUB_MIN_LEVEL, DEFAULT_COMPOUND_BONUS_BPS,
        DEFAULT_PLATFORM_FEE_BPS, MAX_PLATFORM_FEE_BPS, MONTHLY_INTERVAL_SECS,
        WEEKLY_INTERVAL_SECS,
    },
    errors::LedgerError,
    events::{EventLog, LedgerEvent, LedgerInitialized},
    ledger::ParticipantLedger,
    pools::{Pool, Pools},
    runtime::Invocation,
    state::{Config, LevelSchedule, Ledger, Participant},
};

// Example CLI command to initialize a ledger:
// cargo run --package leadfive-cli -- init \
//   --authority "ADMIN_PUBKEY" \
//   --treasury "TREASURY_PUBKEY" \
//   --root "ROOT_PUBKEY" \
//   --club-pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializeArgs {
    pub treasury: Pubkey,
    pub root: Pubkey,
    pub packages: Vec<Package>,
    pub level_schedule: LevelSchedule,
    pub leader_interval_secs: u64,
    pub help_interval_secs: u64,
    pub club_interval_secs: u64,
    pub circuit_breaker_threshold: u64,
    pub platform_fee_bps: u16,
    pub compound_bonus_bps: u16,
    pub club_pool_enabled: bool,
    pub club_bps: u16,
    pub club_min_level: u8,
    pub activity_window_secs: u64,
    pub max_daily_withdrawal_per_participant: u64,
}

impl InitializeArgs {
    /// Canonical catalog and default parameters.
    #[must_use]
    pub fn canonical(treasury: Pubkey, root: Pubkey) -> Self {
        Self {
            treasury,
            root,
            packages: PackageCatalog::canonical().packages().to_vec(),
            level_schedule: LevelSchedule::default(),
            leader_interval_secs: WEEKLY_INTERVAL_SECS,
            help_interval_secs: WEEKLY_INTERVAL_SECS,
            club_interval_secs: MONTHLY_INTERVAL_SECS,
            circuit_breaker_threshold: DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            compound_bonus_bps: DEFAULT_COMPOUND_BONUS_BPS,
            club_pool_enabled: false,
            club_bps: DEFAULT_CLUB_BPS,
            club_min_level: DEFAULT_CLUB_MIN_LEVEL,
            activity_window_secs: DEFAULT_ACTIVITY_WINDOW_SECS,
            max_daily_withdrawal_per_participant: 0,
        }
    }
}

/// Builds a fresh ledger with the signer as authority and `root` registered.
///
/// # Errors
/// Returns `InvalidConfiguration` if:
/// - The package table is rejected by [`PackageCatalog::new`]
/// - The level schedule does not sum to 10,000 bps
/// - Root or treasury is the default key
/// - A distribution interval or the breaker threshold is zero
/// - A fee or bonus rate is out of range
pub fn handler(invocation: Invocation, args: InitializeArgs, events: &mut EventLog) -> Result<Ledger> {
    let now = invocation.unix_timestamp;

    require!(args.root != Pubkey::default(), LedgerError::InvalidConfiguration);
    require!(
        args.treasury != Pubkey::default(),
        LedgerError::InvalidConfiguration
    );
    require!(
        args.platform_fee_bps <= MAX_PLATFORM_FEE_BPS,
        LedgerError::InvalidConfiguration
    );
    require!(
        args.compound_bonus_bps <= BASIS_POINTS_TOTAL && args.club_bps <= BASIS_POINTS_TOTAL,
        LedgerError::InvalidConfiguration
    );
    require!(
        args.leader_interval_secs > 0 && args.help_interval_secs > 0 && args.club_interval_secs > 0,
        LedgerError::InvalidConfiguration
    );
    args.level_schedule.validate()?;

    let catalog = PackageCatalog::new(args.packages)?;
    let package_count = u8::try_from(catalog.len()).map_err(|_| LedgerError::InvalidConfiguration)?;

    let mut breaker = CircuitBreaker::new(0);
    breaker.set_threshold(args.circuit_breaker_threshold)?;

    let config = Config {
        authority: invocation.signer,
        admins: Vec::new(),
        treasury: args.treasury,
        root: args.root,
        paused: false,
        platform_fee_bps: args.platform_fee_bps,
        compound_bonus_bps: args.compound_bonus_bps,
        level_schedule: args.level_schedule,
        club_pool_enabled: args.club_pool_enabled,
        club_bps: args.club_bps,
        club_min_level: args.club_min_level,
        activity_window_secs: args.activity_window_secs,
        max_daily_withdrawal_per_participant: args.max_daily_withdrawal_per_participant,
    };

    let mut participants = ParticipantLedger::new();
    participants.insert(Participant::root(args.root, now))?;

    let pools = Pools::new(
        Pool::new(args.leader_interval_secs, now),
        Pool::new(args.help_interval_secs, now),
        Pool::new(args.club_interval_secs, now),
    );

    events.emit(LedgerEvent::Initialized(LedgerInitialized {
        authority: invocation.signer,
        root: args.root,
        treasury: args.treasury,
        package_count,
        timestamp: now,
    }));

    tracing::info!(
        authority = %invocation.signer,
        root = %args.root,
        packages = package_count,
        "ledger initialized"
    );

    Ok(Ledger::new(config, catalog, participants, pools, breaker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation::new(Pubkey::new_unique(), 1_700_000_000)
    }

    #[test]
    fn test_canonical_initialize() {
        let root = Pubkey::new_unique();
        let mut events = EventLog::new();
        let invocation = invocation();
        let ledger = handler(
            invocation,
            InitializeArgs::canonical(Pubkey::new_unique(), root),
            &mut events,
        )
        .unwrap();

        assert_eq!(ledger.config.authority, invocation.signer);
        assert_eq!(ledger.participants.len(), 1);
        assert!(ledger.participants.get(&root).unwrap().is_root());
        assert_eq!(ledger.catalog.len(), 4);
        assert_eq!(ledger.pools.help.distribution_interval_secs, WEEKLY_INTERVAL_SECS);
        assert_eq!(ledger.pools.club.distribution_interval_secs, MONTHLY_INTERVAL_SECS);
        assert_eq!(ledger.vault_balance, 0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_initialize_rejects_bad_parameters() {
        let reject = |mutate: fn(&mut InitializeArgs)| {
            let mut args = InitializeArgs::canonical(Pubkey::new_unique(), Pubkey::new_unique());
            mutate(&mut args);
            let err = handler(invocation(), args, &mut EventLog::new()).unwrap_err();
            assert!(LedgerError::InvalidConfiguration.matches(&err));
        };

        reject(|args| args.root = Pubkey::default());
        reject(|args| args.treasury = Pubkey::default());
        reject(|args| args.packages.clear());
        reject(|args| args.packages[0].direct_bps = 0);
        reject(|args| args.level_schedule.weights_bps[0] = 0);
        reject(|args| args.platform_fee_bps = MAX_PLATFORM_FEE_BPS + 1);
        reject(|args| args.circuit_breaker_threshold = 0);
        reject(|args| args.help_interval_secs = 0);
    }
}
