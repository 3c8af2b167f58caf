use anchor_lang::prelude::*;

use crate::{
    errors::LedgerError,
    events::{BlacklistUpdated, LedgerEvent},
    runtime::ExecContext,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlacklistArgs {
    pub participant: Pubkey,
    pub blacklisted: bool,
}

/// Sets or clears a participant's blacklist flag (admin only).
///
/// A blacklisted participant keeps its place in other participants' upline chains;
/// its shares are redirected to the Help pool until the flag is cleared.
///
/// # Errors
/// Returns `Unauthorized` for non-admins, `ParticipantNotFound` for an unknown
/// address, and `InvalidConfiguration` when targeting the root.
pub fn handler(ctx: &mut ExecContext<'_>, args: BlacklistArgs) -> Result<()> {
    ctx.require_admin()?;
    require!(
        args.participant != ctx.ledger.config.root,
        LedgerError::InvalidConfiguration
    );

    ctx.ledger
        .participants
        .set_blacklisted(&args.participant, args.blacklisted)?;

    let updated_by = *ctx.signer();
    ctx.events.emit(LedgerEvent::BlacklistUpdated(BlacklistUpdated {
        participant: args.participant,
        blacklisted: args.blacklisted,
        updated_by,
    }));

    tracing::warn!(
        participant = %args.participant,
        blacklisted = args.blacklisted,
        updated_by = %updated_by,
        "blacklist updated"
    );

    Ok(())
}
