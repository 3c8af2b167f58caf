//! Package purchase command implementation

use leadfive_program::PurchaseArgs;
use tracing::info;

use crate::{
    commands::CommandContext,
    error::Result,
    utils::{formatting::purchase_receipt_json, parse_pubkey},
};

/// Request parameters for a package purchase
#[derive(Debug)]
pub struct PurchaseRequest<'a> {
    pub payer: &'a str,
    pub level: u8,
    /// Required only for a payer who is not yet registered
    pub sponsor: Option<&'a str>,
    /// Paid amount in token base units; defaults to the package price
    pub value: Option<u64>,
}

/// Execute the purchase command
///
/// # Errors
/// Returns error if an address is invalid or the engine rejects the purchase
pub fn execute(ctx: &CommandContext<'_>, request: &PurchaseRequest<'_>) -> Result<String> {
    let payer = parse_pubkey("payer", request.payer)?;
    let sponsor = request
        .sponsor
        .map(|sponsor| parse_pubkey("sponsor", sponsor))
        .transpose()?;
    info!(%payer, level = request.level, "Purchasing package");

    let applied = ctx.store.mutate(|engine| {
        let value = match request.value {
            Some(value) => value,
            None => engine.get_package(request.level)?.price,
        };
        engine.purchase(
            ctx.invocation(payer),
            PurchaseArgs {
                package_level: request.level,
                sponsor,
                value,
            },
        )
    })?;
    let receipt = applied.value;

    let action = if receipt.upgrade { "Upgraded" } else { "Purchased" };
    let summary = format!(
        "{action} package {} for {payer} (payment {})\nPrice: {:.6}\nPaid to participants: {:.6}\nLeader pool: +{:.6}\nHelp pool: +{:.6} ({:.6} redirected)\nClub pool: +{:.6}",
        receipt.package_level,
        receipt.payment_id,
        ctx.config.format_tokens(receipt.price),
        ctx.config.format_tokens(receipt.cascade.paid_to_participants),
        ctx.config.format_tokens(receipt.cascade.leader_accrued),
        ctx.config.format_tokens(receipt.cascade.help_accrued),
        ctx.config.format_tokens(receipt.cascade.redirected),
        ctx.config.format_tokens(receipt.cascade.club_accrued),
    );
    ctx.render(summary, purchase_receipt_json(&receipt), &applied.events)
}
