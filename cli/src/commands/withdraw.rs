//! Withdrawal command implementation

use leadfive_program::{
    runtime::{Payout, PayoutKind},
    WithdrawArgs,
};
use tracing::info;

use crate::{
    commands::CommandContext,
    error::Result,
    utils::{formatting::withdrawal_receipt_json, parse_pubkey},
};

/// Execute the withdraw command
///
/// The engine reports cash and fee transfers through its payout hook; they are
/// collected and listed so the operator can settle them.
///
/// # Errors
/// Returns error if the address is invalid or the engine rejects the withdrawal
pub fn execute(ctx: &CommandContext<'_>, participant: &str, amount: u64) -> Result<String> {
    let participant = parse_pubkey("participant", participant)?;
    info!(%participant, amount, "Processing withdrawal");

    let applied = ctx.store.mutate(|engine| {
        let mut payouts: Vec<Payout> = Vec::new();
        let receipt = engine.withdraw(
            ctx.invocation(participant),
            WithdrawArgs { amount },
            &mut payouts,
        )?;
        Ok((receipt, payouts))
    })?;
    let (receipt, payouts) = applied.value;

    let mut summary = format!(
        "Withdrawal for {participant} ({} tier)\nRequested: {:.6}\nTo participant: {:.6}\nPlatform fee: {:.6}\nReinvested: {:.6}\nCompound bonus: {:.6}",
        receipt.tier.label(),
        ctx.config.format_tokens(receipt.requested),
        ctx.config.format_tokens(receipt.withdrawn_to_user),
        ctx.config.format_tokens(receipt.treasury_fee),
        ctx.config.format_tokens(receipt.reinvested),
        ctx.config.format_tokens(receipt.compound_bonus),
    );
    for payout in &payouts {
        summary.push_str(&format!(
            "\nTransfer {:.6} to {} ({})",
            ctx.config.format_tokens(payout.amount),
            payout.recipient,
            payout_label(payout.kind)
        ));
    }

    let mut data = withdrawal_receipt_json(&receipt);
    data["payouts"] = payouts
        .iter()
        .map(|payout| {
            serde_json::json!({
                "recipient": payout.recipient.to_string(),
                "amount": payout.amount,
                "kind": payout_label(payout.kind),
            })
        })
        .collect();
    ctx.render(summary, data, &applied.events)
}

const fn payout_label(kind: PayoutKind) -> &'static str {
    match kind {
        PayoutKind::Withdrawal => "withdrawal",
        PayoutKind::PlatformFee => "platform fee",
    }
}
