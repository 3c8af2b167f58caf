//! Pool distribution command implementation

use leadfive_program::{pools::PoolKind, DistributePoolArgs, PoolDistributionOutcome};
use tracing::info;

use crate::{
    commands::CommandContext,
    error::Result,
    utils::{formatting::distribution_outcome_json, parse_pubkey},
};

/// Execute the distribute command (admin only)
///
/// # Errors
/// Returns error if the address is invalid, the signer is not an admin, or the
/// pool is not yet due
pub fn execute(ctx: &CommandContext<'_>, authority: &str, pool: PoolKind) -> Result<String> {
    let authority = parse_pubkey("authority", authority)?;
    info!(%authority, %pool, "Distributing pool");

    let applied = ctx.store.mutate(|engine| {
        engine.distribute_pool(ctx.invocation(authority), DistributePoolArgs { pool })
    })?;

    let summary = match applied.value {
        PoolDistributionOutcome::Distributed {
            batch_id,
            distributed,
            recipients,
            remainder,
        } => format!(
            "Distributed {:.6} from the {pool} pool to {recipients} participants (batch {batch_id})\nRemainder kept: {:.6}",
            ctx.config.format_tokens(distributed),
            ctx.config.format_tokens(remainder),
        ),
        PoolDistributionOutcome::CarriedOver { balance } => format!(
            "Nothing to distribute from the {pool} pool; {:.6} carried over",
            ctx.config.format_tokens(balance)
        ),
    };
    let mut data = distribution_outcome_json(&applied.value);
    data["pool"] = serde_json::Value::from(pool.label());
    ctx.render(summary, data, &applied.events)
}
