//! Ledger initialization command implementation

use leadfive_program::{events::LedgerEvent, Engine, InitializeArgs};
use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Request parameters for initializing a ledger
#[derive(Debug)]
pub struct InitRequest<'a> {
    pub authority: &'a str,
    pub treasury: &'a str,
    pub root: &'a str,
    pub club_pool: bool,
    pub circuit_breaker_threshold: Option<u64>,
    pub max_daily_withdrawal: Option<u64>,
    pub force: bool,
}

/// Execute the init command
///
/// Builds a ledger with the canonical package catalog and writes the first
/// snapshot.
///
/// # Errors
/// Returns error if an address is invalid, the engine rejects the parameters,
/// or a snapshot already exists and `force` is not set
pub fn execute(ctx: &CommandContext<'_>, request: &InitRequest<'_>) -> Result<String> {
    let authority = parse_pubkey("authority", request.authority)?;
    let treasury = parse_pubkey("treasury", request.treasury)?;
    let root = parse_pubkey("root", request.root)?;
    info!(%authority, %treasury, %root, "Initializing ledger");

    let mut args = InitializeArgs::canonical(treasury, root);
    args.club_pool_enabled = request.club_pool;
    if let Some(threshold) = request.circuit_breaker_threshold {
        args.circuit_breaker_threshold = threshold;
    }
    if let Some(limit) = request.max_daily_withdrawal {
        args.max_daily_withdrawal_per_participant = limit;
    }

    let mut engine = Engine::initialize(ctx.invocation(authority), args)?;
    ctx.store.create(&engine, request.force)?;
    let events: Vec<LedgerEvent> = engine.take_events();

    let ledger = engine.ledger();
    let summary = format!(
        "Ledger initialized at {}\nAuthority: {authority}\nTreasury: {treasury}\nRoot: {root}\nPackages: {}\nClub pool: {}",
        ctx.store.path().display(),
        ledger.catalog.len(),
        if ledger.config.club_pool_enabled { "enabled" } else { "disabled" },
    );
    let data = serde_json::json!({
        "state_path": ctx.store.path().display().to_string(),
        "authority": authority.to_string(),
        "treasury": treasury.to_string(),
        "root": root.to_string(),
        "packages": ledger
            .catalog
            .packages()
            .iter()
            .map(|package| serde_json::json!({ "level": package.level, "price": package.price }))
            .collect::<Vec<_>>(),
        "club_pool_enabled": ledger.config.club_pool_enabled,
        "circuit_breaker_threshold": ledger.breaker.threshold,
    });
    ctx.render(summary, data, &events)
}
