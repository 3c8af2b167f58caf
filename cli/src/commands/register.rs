//! Participant registration command implementation

use leadfive_program::RegisterArgs;
use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the register command
///
/// Places `participant` in the matrix under `sponsor` without a purchase.
///
/// # Errors
/// Returns error if an address is invalid or the engine rejects the registration
pub fn execute(ctx: &CommandContext<'_>, participant: &str, sponsor: &str) -> Result<String> {
    let participant = parse_pubkey("participant", participant)?;
    let sponsor = parse_pubkey("sponsor", sponsor)?;
    info!(%participant, %sponsor, "Registering participant");

    let applied = ctx.store.mutate(|engine| {
        engine.register(
            ctx.invocation(participant),
            RegisterArgs {
                sponsor: Some(sponsor),
            },
        )?;
        engine.get_participant(&participant)
    })?;
    let record = applied.value;

    let summary = format!(
        "Registered {participant} under {sponsor}\nMatrix parent: {}\nUpline depth: {}",
        record
            .matrix_parent
            .map_or_else(|| "-".to_string(), |parent| parent.to_string()),
        record.upline_chain.len()
    );
    let data = serde_json::json!({
        "participant": participant.to_string(),
        "sponsor": sponsor.to_string(),
        "matrix_parent": record.matrix_parent.map(|parent| parent.to_string()),
        "upline_depth": record.upline_chain.len(),
    });
    ctx.render(summary, data, &applied.events)
}
