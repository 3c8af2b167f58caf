//! Auto-compound toggle command implementation

use leadfive_program::SetAutoCompoundArgs;
use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the auto-compound command
///
/// # Errors
/// Returns error if the address is invalid or the participant cannot change the setting
pub fn execute(ctx: &CommandContext<'_>, participant: &str, enabled: bool) -> Result<String> {
    let participant = parse_pubkey("participant", participant)?;
    info!(%participant, enabled, "Setting auto-compound");

    let applied = ctx.store.mutate(|engine| {
        engine.set_auto_compound(ctx.invocation(participant), SetAutoCompoundArgs { enabled })
    })?;

    let summary = format!(
        "Auto-compound {} for {participant}",
        if enabled { "enabled" } else { "disabled" }
    );
    let data = serde_json::json!({
        "participant": participant.to_string(),
        "auto_compound": enabled,
    });
    ctx.render(summary, data, &applied.events)
}
