//! Treasury update command implementation

use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the set-treasury command (admin only)
///
/// # Errors
/// Returns error if an address is invalid or the engine rejects the update
pub fn execute(ctx: &CommandContext<'_>, authority: &str, treasury: &str) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    let treasury = parse_pubkey("treasury", treasury)?;
    info!(%authority, %treasury, "Setting treasury");

    let applied = ctx
        .store
        .mutate(|engine| engine.set_treasury(ctx.invocation(authority), treasury))?;
    ctx.render(
        format!("Platform fees now go to {treasury}"),
        serde_json::json!({ "treasury": treasury.to_string() }),
        &applied.events,
    )
}
