use anchor_lang::prelude::*;

use crate::{
    errors::LedgerError,
    events::{AdminUpdated, LedgerEvent},
    runtime::ExecContext,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SetAdminArgs {
    pub admin: Pubkey,
    pub enabled: bool,
}

/// Adds or removes an admin.
///
/// Only the authority may change the roster. The authority itself is always an
/// admin and cannot be listed or removed.
///
/// # Errors
/// Returns `Unauthorized` unless the signer is the authority and
/// `InvalidConfiguration` when targeting the authority or the default key.
pub fn handler(ctx: &mut ExecContext<'_>, args: SetAdminArgs) -> Result<()> {
    let authority = ctx.ledger.config.authority;
    require!(*ctx.signer() == authority, LedgerError::Unauthorized);
    require!(
        args.admin != authority && args.admin != Pubkey::default(),
        LedgerError::InvalidConfiguration
    );

    let admins = &mut ctx.ledger.config.admins;
    if args.enabled {
        if !admins.contains(&args.admin) {
            admins.push(args.admin);
        }
    } else {
        admins.retain(|admin| *admin != args.admin);
    }

    ctx.events.emit(LedgerEvent::AdminUpdated(AdminUpdated {
        admin: args.admin,
        enabled: args.enabled,
        updated_by: authority,
    }));

    tracing::info!(admin = %args.admin, enabled = args.enabled, "admin roster updated");

    Ok(())
}
