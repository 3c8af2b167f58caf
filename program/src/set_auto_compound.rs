use anchor_lang::prelude::*;

use crate::{
    errors::LedgerError,
    events::{AutoCompoundUpdated, LedgerEvent},
    runtime::ExecContext,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SetAutoCompoundArgs {
    pub enabled: bool,
}

/// Toggles auto-compounding for the signer.
///
/// # Errors
/// Returns `ParticipantNotFound` for an unregistered signer and `Blacklisted` for
/// a frozen participant.
pub fn handler(ctx: &mut ExecContext<'_>, args: SetAutoCompoundArgs) -> Result<()> {
    let participant = *ctx.signer();
    let record = ctx.ledger.participants.require_mut(&participant)?;
    require!(!record.blacklisted, LedgerError::Blacklisted);
    record.auto_compound = args.enabled;

    ctx.events
        .emit(LedgerEvent::AutoCompoundUpdated(AutoCompoundUpdated {
            participant,
            enabled: args.enabled,
        }));

    tracing::info!(participant = %participant, enabled = args.enabled, "auto-compound updated");

    Ok(())
}
