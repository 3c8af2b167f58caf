//! Pool status command implementation

use leadfive_program::pools::PoolKind;

use crate::{
    commands::CommandContext,
    error::Result,
    utils::formatting::{format_pools_human, format_pools_json, OutputFormat},
};

/// Execute the pools command
///
/// # Errors
/// Returns error if the state cannot be loaded
pub fn execute(ctx: &CommandContext<'_>) -> Result<String> {
    let engine = ctx.store.load()?;
    let statuses: Vec<_> = PoolKind::ALL
        .into_iter()
        .map(|kind| engine.get_pool_status(kind, ctx.now))
        .collect();

    match ctx.output {
        OutputFormat::Human => Ok(format_pools_human(&statuses, ctx.config)),
        OutputFormat::Json => format_pools_json(&statuses, ctx.config),
    }
}
