//! Blacklist command implementation

use leadfive_program::BlacklistArgs;
use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the blacklist command (admin only)
///
/// # Errors
/// Returns error if an address is invalid, the signer is not an admin, or the
/// participant is unknown or the root
pub fn execute(
    ctx: &CommandContext<'_>,
    authority: &str,
    participant: &str,
    blacklisted: bool,
) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    let participant = parse_pubkey("participant", participant)?;
    info!(%authority, %participant, blacklisted, "Updating blacklist");

    let applied = ctx.store.mutate(|engine| {
        engine.blacklist(
            ctx.invocation(authority),
            BlacklistArgs {
                participant,
                blacklisted,
            },
        )
    })?;

    let summary = if blacklisted {
        format!("Blacklisted {participant}")
    } else {
        format!("Removed {participant} from the blacklist")
    };
    let data = serde_json::json!({
        "participant": participant.to_string(),
        "blacklisted": blacklisted,
    });
    ctx.render(summary, data, &applied.events)
}
