//! System health command implementation

use leadfive_program::queries::verify_solvency;
use tracing::{info, warn};

use crate::{
    commands::CommandContext,
    error::Result,
    utils::formatting::{format_health_human, format_health_json, OutputFormat},
};

/// Execute the health command
///
/// Also checks that the vault still equals pools plus withdrawable balances.
///
/// # Errors
/// Returns error if the state cannot be loaded or the ledger is not solvent
pub fn execute(ctx: &CommandContext<'_>) -> Result<String> {
    let engine = ctx.store.load()?;
    if let Err(err) = verify_solvency(engine.ledger()) {
        warn!(error = %err, "Ledger snapshot failed the solvency check");
        return Err(err.into());
    }
    let health = engine.get_system_health(ctx.now);
    info!(participants = health.total_participants, paused = health.paused, "Health check passed");

    match ctx.output {
        OutputFormat::Human => Ok(format_health_human(&health, ctx.config)),
        OutputFormat::Json => format_health_json(&health, ctx.config),
    }
}
