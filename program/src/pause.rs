use crate::events::{LedgerEvent, ProgramPaused};
use crate::runtime::ExecContext;
use anchor_lang::prelude::*;

/// Arguments for pausing the system
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct PauseArgs {}

/// Handler for pausing the system
///
/// Halts purchases and withdrawals. Registration, queries, and admin operations
/// keep working. Pausing an already paused system succeeds without changes.
///
/// # Errors
/// Returns an error if:
/// - Caller is not an admin
pub fn handler(ctx: &mut ExecContext<'_>, _args: PauseArgs) -> Result<()> {
    ctx.require_admin()?;
    if ctx.ledger.config.paused {
        return Ok(());
    }

    ctx.ledger.config.paused = true;

    let authority = *ctx.signer();
    ctx.events.emit(LedgerEvent::Paused(ProgramPaused {
        authority,
        timestamp: ctx.now(),
    }));

    tracing::warn!(authority = %authority, "system paused");

    Ok(())
}
