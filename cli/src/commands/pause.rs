//! Pause and unpause command implementations

use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the pause command (admin only)
///
/// # Errors
/// Returns error if the address is invalid or the signer is not an admin
pub fn execute_pause(ctx: &CommandContext<'_>, authority: &str) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    info!(%authority, "Pausing ledger");

    let applied = ctx
        .store
        .mutate(|engine| engine.pause(ctx.invocation(authority)))?;
    ctx.render(
        "Ledger paused: purchases and withdrawals are halted".to_string(),
        serde_json::json!({ "paused": true }),
        &applied.events,
    )
}

/// Execute the unpause command (admin only)
///
/// # Errors
/// Returns error if the address is invalid or the signer is not an admin
pub fn execute_unpause(ctx: &CommandContext<'_>, authority: &str) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    info!(%authority, "Unpausing ledger");

    let applied = ctx
        .store
        .mutate(|engine| engine.unpause(ctx.invocation(authority)))?;
    ctx.render(
        "Ledger resumed".to_string(),
        serde_json::json!({ "paused": false }),
        &applied.events,
    )
}
