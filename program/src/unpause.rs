use crate::events::{LedgerEvent, ProgramUnpaused};
use crate::runtime::ExecContext;
use anchor_lang::prelude::*;

/// Arguments for unpausing the system
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct UnpauseArgs {}

/// Handler for unpausing the system
///
/// Resumes purchases and withdrawals. Unpausing a running system succeeds
/// without changes.
///
/// # Errors
/// Returns an error if:
/// - Caller is not an admin
pub fn handler(ctx: &mut ExecContext<'_>, _args: UnpauseArgs) -> Result<()> {
    ctx.require_admin()?;
    if !ctx.ledger.config.paused {
        return Ok(());
    }

    ctx.ledger.config.paused = false;

    let authority = *ctx.signer();
    ctx.events.emit(LedgerEvent::Unpaused(ProgramUnpaused {
        authority,
        timestamp: ctx.now(),
    }));

    tracing::info!(authority = %authority, "system unpaused");

    Ok(())
}
