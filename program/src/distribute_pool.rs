use anchor_lang::prelude::*;

use crate::{
    cascade::credit_participant,
    errors::LedgerError,
    events::{BonusKind, LedgerEvent, PoolDistributed, PoolDistributionDeferred},
    pools::{self, PoolKind},
    runtime::ExecContext,
    state::{Money, PaymentId},
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DistributePoolArgs {
    pub pool: PoolKind,
}

/// Result of a distribution attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolDistributionOutcome {
    Distributed {
        batch_id: PaymentId,
        distributed: Money,
        recipients: u32,
        /// Even-split remainder kept in the pool
        remainder: Money,
    },
    /// Nothing to pay out; balance and schedule untouched
    CarriedOver { balance: Money },
}

/// Handler for a scheduled pool distribution (admin only)
///
/// Shares are credited through the earnings cap; overflow lands back in the Help
/// pool. When nobody is eligible, or the balance is too small to give any
/// recipient a non-zero share, the balance carries over and
/// `last_distributed_at` is left alone, so the next attempt is not delayed.
///
/// # Errors
/// Returns an error if:
/// - The signer is not an admin (`Unauthorized`)
/// - The pool's interval has not elapsed (`TooEarly`)
pub fn handler(
    ctx: &mut ExecContext<'_>,
    args: DistributePoolArgs,
) -> Result<PoolDistributionOutcome> {
    ctx.require_admin()?;
    let now = ctx.now();
    let kind = args.pool;
    let ledger = &mut *ctx.ledger;

    let pool = ledger.pools.get(kind);
    require!(pool.is_due(now), LedgerError::TooEarly);
    let balance = pool.balance;

    let plan = pools::plan_distribution(kind, balance, &ledger.participants, &ledger.config, now)?;
    let distributed = plan.distributed()?;
    if plan.is_empty() || distributed == 0 {
        ctx.events
            .emit(LedgerEvent::PoolDistributionDeferred(PoolDistributionDeferred {
                pool: kind,
                balance,
                timestamp: now,
            }));
        tracing::warn!(
            pool = %kind,
            balance,
            eligible = plan.shares.len(),
            "nothing to distribute, balance carried over"
        );
        return Ok(PoolDistributionOutcome::CarriedOver { balance });
    }

    let recipients = u32::try_from(plan.shares.len()).map_err(|_| LedgerError::ArithmeticError)?;
    {
        let pool = ledger.pools.get_mut(kind);
        pool.debit(distributed)?;
        pool.last_distributed_at = now;
    }

    let batch_id = ledger.allocate_payment_id()?;
    for (recipient, share) in &plan.shares {
        if *share == 0 {
            continue;
        }
        credit_participant(
            &mut ledger.participants,
            &mut ledger.pools,
            ctx.events,
            batch_id,
            recipient,
            *share,
            BonusKind::PoolShare(kind),
        )?;
    }

    ctx.events.emit(LedgerEvent::PoolDistributed(PoolDistributed {
        batch_id,
        pool: kind,
        distributed,
        recipients,
        remainder: plan.remainder,
        timestamp: now,
    }));

    tracing::info!(
        pool = %kind,
        batch = %batch_id,
        distributed,
        recipients,
        remainder = plan.remainder,
        "pool distributed"
    );

    Ok(PoolDistributionOutcome::Distributed {
        batch_id,
        distributed,
        recipients,
        remainder: plan.remainder,
    })
}
