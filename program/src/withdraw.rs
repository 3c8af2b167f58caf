use anchor_lang::prelude::*;

use crate::{
    breaker::utc_day,
    cascade::{Cascade, CascadeReport, SplitPlan},
    errors::LedgerError,
    events::{LedgerEvent, ReinvestmentProcessed, WithdrawalProcessed},
    runtime::{ExecContext, PayoutKind},
    state::Money,
    utils::{add, sub},
    withdrawal::{WithdrawalSplit, WithdrawalTier},
};

// Example CLI command to withdraw:
// cargo run --package leadfive-cli -- withdraw \
//   --participant "PARTICIPANT_PUBKEY" \
//   --amount 100000000
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawArgs {
    /// Amount debited from the withdrawable balance (in token base units)
    pub amount: Money,
}

/// Result of a withdrawal
///
/// `requested == withdrawn_to_user + treasury_fee + reinvested`. The compound
/// bonus comes from the Help pool and is reinvested on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub tier: WithdrawalTier,
    pub requested: Money,
    pub withdrawn_to_user: Money,
    pub treasury_fee: Money,
    pub reinvested: Money,
    pub compound_bonus: Money,
    pub reinvestment: Option<CascadeReport>,
}

/// Handler for withdrawing earnings
///
/// Splits the amount by the participant's tier, charges the platform fee on the
/// cash portion, checks the daily limits against the cash outflow, debits the
/// balance once, and runs the reinvested portion through the cascade with the
/// withdrawer as origin. Cash and fee are queued as payouts for the host.
///
/// # Errors
/// Returns an error if:
/// - The system is paused (`SystemPaused`)
/// - The signer is not registered (`ParticipantNotFound`)
/// - The participant is blacklisted (`Blacklisted`)
/// - `amount` is zero (`InvalidAmount`)
/// - `amount` exceeds the withdrawable balance (`InsufficientBalance`)
/// - The per-participant daily limit would be exceeded (`WithdrawalLimitExceeded`)
/// - The global daily limit would be exceeded (`CircuitBreakerTriggered`)
pub fn handler(ctx: &mut ExecContext<'_>, args: WithdrawArgs) -> Result<WithdrawalReceipt> {
    ctx.require_not_paused()?;
    let participant = *ctx.signer();
    let now = ctx.now();
    let amount = args.amount;

    let record = ctx.ledger.participants.require(&participant)?;
    require!(!record.blacklisted, LedgerError::Blacklisted);
    require!(amount > 0, LedgerError::InvalidAmount);
    require!(
        amount <= record.balance_withdrawable,
        LedgerError::InsufficientBalance
    );

    let split = WithdrawalSplit::for_participant(record, &ctx.ledger.config);
    let breakdown = split.apply(amount)?;

    let today = utc_day(now);
    let withdrawn_today = if record.withdrawal_day == today {
        record.withdrawn_today
    } else {
        0
    };
    let limit = ctx.ledger.config.max_daily_withdrawal_per_participant;
    let withdrawn_after = add(withdrawn_today, breakdown.cash_outflow)?;
    if limit > 0 && withdrawn_after > limit {
        tracing::warn!(
            participant = %participant,
            limit,
            attempted = withdrawn_after,
            "per-participant daily limit exceeded"
        );
        return Err(LedgerError::WithdrawalLimitExceeded.into());
    }

    let ledger = &mut *ctx.ledger;
    ledger.breaker.record(now, breakdown.cash_outflow)?;

    {
        let record = ledger.participants.require_mut(&participant)?;
        record.balance_withdrawable = sub(record.balance_withdrawable, amount)?;
        record.total_withdrawn = add(record.total_withdrawn, breakdown.withdrawn_to_user)?;
        record.withdrawal_day = today;
        record.withdrawn_today = withdrawn_after;
        record.last_active_at = now;
    }
    ledger.vault_balance = sub(ledger.vault_balance, breakdown.cash_outflow)?;
    ledger.stats.total_paid_out = add(ledger.stats.total_paid_out, breakdown.withdrawn_to_user)?;
    ledger.stats.total_fees = add(ledger.stats.total_fees, breakdown.treasury_fee)?;

    let compound_bonus = split
        .compound_bonus(breakdown.reinvested)?
        .min(ledger.pools.help.balance);
    ledger.pools.help.debit(compound_bonus)?;

    let reinvest_total = add(breakdown.reinvested, compound_bonus)?;
    let reinvestment = if reinvest_total > 0 {
        let payment_id = ledger.allocate_payment_id()?;
        let plan = SplitPlan::for_reinvestment(reinvest_total)?;
        let report = Cascade::new(
            &mut ledger.participants,
            &mut ledger.pools,
            ctx.events,
            &ledger.config.level_schedule,
            payment_id,
        )
        .run(&participant, &plan)?;
        ctx.events
            .emit(LedgerEvent::ReinvestmentProcessed(ReinvestmentProcessed {
                payment_id,
                participant,
                amount: reinvest_total,
            }));
        Some(report)
    } else {
        None
    };

    let treasury = ledger.config.treasury;
    ctx.queue_payout(participant, breakdown.withdrawn_to_user, PayoutKind::Withdrawal);
    ctx.queue_payout(treasury, breakdown.treasury_fee, PayoutKind::PlatformFee);

    ctx.events
        .emit(LedgerEvent::WithdrawalProcessed(WithdrawalProcessed {
            participant,
            requested: amount,
            withdrawn_to_user: breakdown.withdrawn_to_user,
            treasury_fee: breakdown.treasury_fee,
            reinvested: breakdown.reinvested,
            compound_bonus,
            timestamp: now,
        }));

    tracing::info!(
        participant = %participant,
        tier = split.tier.label(),
        requested = amount,
        paid = breakdown.withdrawn_to_user,
        fee = breakdown.treasury_fee,
        reinvested = breakdown.reinvested,
        compound_bonus,
        "withdrawal processed"
    );

    Ok(WithdrawalReceipt {
        tier: split.tier,
        requested: amount,
        withdrawn_to_user: breakdown.withdrawn_to_user,
        treasury_fee: breakdown.treasury_fee,
        reinvested: breakdown.reinvested,
        compound_bonus,
        reinvestment,
    })
}
