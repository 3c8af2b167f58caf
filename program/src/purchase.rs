use anchor_lang::prelude::*;

use crate::{
    cascade::{Cascade, CascadeReport, SplitPlan},
    errors::LedgerError,
    events::{LedgerEvent, PackagePurchased},
    register::register_participant,
    runtime::ExecContext,
    state::{Money, PaymentId},
    utils::add,
};

// Example CLI command to purchase a package:
// cargo run --package leadfive-cli -- purchase \
//   --payer "PAYER_PUBKEY" \
//   --level 2 \
//   --sponsor "SPONSOR_PUBKEY" \
//   --value 50000000
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PurchaseArgs {
    pub package_level: u8,
    /// Used only when the payer is not yet registered
    pub sponsor: Option<Pubkey>,
    /// Amount paid; must equal the package price
    pub value: Money,
}

/// Result of a purchase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub payment_id: PaymentId,
    pub package_level: u8,
    pub price: Money,
    /// The payer was registered by this purchase
    pub registered: bool,
    /// The payer already held a package
    pub upgrade: bool,
    pub cascade: CascadeReport,
}

/// Handler for purchasing a package
///
/// The first purchase registers the payer under `sponsor`. Every purchase,
/// including an upgrade or a same-level top-up, is a full payment of the package
/// price: it raises the earnings cap by 4x the price and runs the full cascade.
///
/// # Errors
/// Returns an error if:
/// - The system is paused (`SystemPaused`)
/// - The level is not in the catalog (`InvalidLevel`)
/// - `value` differs from the package price (`InsufficientPayment`)
/// - Registration fails (`UnknownSponsor`, `Blacklisted`)
/// - The payer is blacklisted (`Blacklisted`)
/// - The level is lower than the payer's current package (`DowngradeNotAllowed`)
pub fn handler(ctx: &mut ExecContext<'_>, args: PurchaseArgs) -> Result<PurchaseReceipt> {
    ctx.require_not_paused()?;
    let payer = *ctx.signer();
    let now = ctx.now();

    let package = *ctx.ledger.catalog.lookup(args.package_level)?;
    require!(
        args.value == package.price,
        LedgerError::InsufficientPayment
    );

    let registered = !ctx.ledger.participants.contains(&payer);
    if registered {
        register_participant(ctx.ledger, ctx.events, payer, args.sponsor, now)?;
    }

    let record = ctx.ledger.participants.require(&payer)?;
    require!(!record.blacklisted, LedgerError::Blacklisted);
    require!(
        package.level >= record.package_level,
        LedgerError::DowngradeNotAllowed
    );
    let upgrade = record.package_level > 0;

    let ledger = &mut *ctx.ledger;
    ledger
        .participants
        .set_package_level(&payer, package.level, package.price, now)?;
    ledger.vault_balance = add(ledger.vault_balance, package.price)?;
    ledger.stats.total_volume = add(ledger.stats.total_volume, package.price)?;
    ledger.stats.payments_processed = ledger.stats.payments_processed.saturating_add(1);

    let payment_id = ledger.allocate_payment_id()?;
    let plan = SplitPlan::for_package(&package, &ledger.config)?;
    let cascade = Cascade::new(
        &mut ledger.participants,
        &mut ledger.pools,
        ctx.events,
        &ledger.config.level_schedule,
        payment_id,
    )
    .run(&payer, &plan)?;

    let earnings_cap = ledger.participants.require(&payer)?.earnings_cap;
    ctx.events.emit(LedgerEvent::PackagePurchased(PackagePurchased {
        payment_id,
        participant: payer,
        package_level: package.level,
        price: package.price,
        earnings_cap,
        upgrade,
        timestamp: now,
    }));

    tracing::info!(
        payment = %payment_id,
        payer = %payer,
        level = package.level,
        price = package.price,
        upgrade,
        "package purchased"
    );

    Ok(PurchaseReceipt {
        payment_id,
        package_level: package.level,
        price: package.price,
        registered,
        upgrade,
        cascade,
    })
}
