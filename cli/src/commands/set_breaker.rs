//! Circuit breaker threshold command implementation

use tracing::info;

use crate::{commands::CommandContext, error::Result, utils::parse_pubkey};

/// Execute the set-breaker command (admin only)
///
/// # Errors
/// Returns error if the address is invalid or the engine rejects the threshold
pub fn execute(ctx: &CommandContext<'_>, authority: &str, threshold: u64) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    info!(%authority, threshold, "Setting circuit breaker threshold");

    let applied = ctx.store.mutate(|engine| {
        engine.set_circuit_breaker_threshold(ctx.invocation(authority), threshold)?;
        Ok(engine.get_circuit_breaker(ctx.now))
    })?;
    let status = applied.value;

    let summary = format!(
        "Daily withdrawal threshold set to {:.6}\nWithdrawn today: {:.6}{}",
        ctx.config.format_tokens(status.threshold),
        ctx.config.format_tokens(status.withdrawn_today),
        if status.tripped { " (TRIPPED)" } else { "" }
    );
    let data = serde_json::json!({
        "threshold": status.threshold,
        "withdrawn_today": status.withdrawn_today,
        "remaining_today": status.remaining_today,
        "tripped": status.tripped,
    });
    ctx.render(summary, data, &applied.events)
}
