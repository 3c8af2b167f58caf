use anchor_lang::prelude::*;

use crate::{
    errors::LedgerError,
    events::{EventLog, LedgerEvent, ParticipantRegistered},
    matrix,
    runtime::ExecContext,
    state::{Ledger, Participant},
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisterArgs {
    /// Registered sponsor; only the root (registered at initialization) has none
    pub sponsor: Option<Pubkey>,
}

/// Registers the signer under `sponsor` without purchasing a package.
///
/// Registration stays available while the system is paused.
///
/// # Errors
/// Returns an error if:
/// - The signer is already registered (`AlreadyRegistered`)
/// - The sponsor is missing or unregistered (`UnknownSponsor`)
/// - The sponsor is blacklisted (`Blacklisted`)
pub fn handler(ctx: &mut ExecContext<'_>, args: RegisterArgs) -> Result<()> {
    let participant = *ctx.signer();
    let now = ctx.now();
    register_participant(ctx.ledger, ctx.events, participant, args.sponsor, now)
}

/// Inserts a participant record, places it in the matrix, and credits the sponsor's
/// direct referral count.
pub(crate) fn register_participant(
    ledger: &mut Ledger,
    events: &mut EventLog,
    address: Pubkey,
    sponsor: Option<Pubkey>,
    now: i64,
) -> Result<()> {
    require!(
        !ledger.participants.contains(&address),
        LedgerError::AlreadyRegistered
    );

    let sponsor = sponsor.ok_or(LedgerError::UnknownSponsor)?;
    let sponsor_record = ledger
        .participants
        .get(&sponsor)
        .ok_or(LedgerError::UnknownSponsor)?;
    if sponsor_record.blacklisted {
        tracing::warn!(participant = %address, sponsor = %sponsor, "blacklisted sponsor rejected");
        return Err(LedgerError::Blacklisted.into());
    }

    let upline_chain = matrix::upline_chain_for(&ledger.participants, &sponsor)?;
    ledger
        .participants
        .insert(Participant::new(address, Some(sponsor), upline_chain, now))?;
    let placement = matrix::place(&mut ledger.participants, &address, &sponsor)?;

    let sponsor_record = ledger.participants.require_mut(&sponsor)?;
    sponsor_record.direct_referral_count = sponsor_record
        .direct_referral_count
        .checked_add(1)
        .ok_or(LedgerError::ArithmeticError)?;

    events.emit(LedgerEvent::Registered(ParticipantRegistered {
        participant: address,
        sponsor,
        matrix_parent: placement.parent,
        timestamp: now,
    }));

    tracing::info!(
        participant = %address,
        sponsor = %sponsor,
        matrix_parent = %placement.parent,
        "participant registered"
    );

    Ok(())
}
