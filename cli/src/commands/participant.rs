//! Participant query command implementation

use tracing::info;

use crate::{
    commands::CommandContext,
    error::Result,
    utils::{
        formatting::{
            format_participant_human, format_participant_json, OutputFormat, ParticipantInfo,
        },
        parse_pubkey,
    },
};

/// Execute the participant command
///
/// # Errors
/// Returns error if the address is invalid, the state cannot be loaded, or the
/// participant is not registered
pub fn execute(ctx: &CommandContext<'_>, address: &str) -> Result<String> {
    let address = parse_pubkey("address", address)?;
    info!(%address, "Fetching participant");

    let engine = ctx.store.load()?;
    let info = ParticipantInfo {
        participant: engine.get_participant(&address)?,
        split: engine.get_withdrawal_split(&address)?,
        rank: engine.get_leader_rank(&address)?,
    };

    match ctx.output {
        OutputFormat::Human => Ok(format_participant_human(&info, ctx.config)),
        OutputFormat::Json => format_participant_json(&info, ctx.config),
    }
}
