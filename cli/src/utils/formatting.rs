//! Output formatting utilities for the LeadFive CLI

use std::{collections::BTreeMap, fmt::Write};

use chrono::DateTime;
use leadfive_program::{
    events::LedgerEvent,
    queries::{PoolStatus, SystemHealth},
    state::{LeaderRank, Participant},
    withdrawal::WithdrawalSplit,
    PoolDistributionOutcome, PurchaseReceipt, WithdrawalReceipt,
};

use crate::{config::LeadFiveCliConfig, error::Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Participant record with derived withdrawal and rank information
#[derive(Debug)]
pub struct ParticipantInfo {
    pub participant: Participant,
    pub split: WithdrawalSplit,
    pub rank: LeaderRank,
}

/// Format a participant for human-readable output
#[must_use]
pub fn format_participant_human(info: &ParticipantInfo, config: &LeadFiveCliConfig) -> String {
    let p = &info.participant;
    let mut output = format!("Participant: {}\n\n", p.address);

    let sponsor = p
        .sponsor
        .map_or_else(|| "(root)".to_string(), |s| s.to_string());
    let cap = if p.is_root() {
        "unlimited".to_string()
    } else {
        format!("{:.6}", config.format_tokens(p.earnings_cap))
    };

    let _ = writeln!(output, "{:<24} {sponsor}", "Sponsor:");
    let _ = writeln!(output, "{:<24} {}", "Package level:", p.package_level);
    let _ = writeln!(
        output,
        "{:<24} {}",
        "Registered:",
        format_timestamp(p.registered_at)
    );
    let _ = writeln!(
        output,
        "{:<24} {}",
        "Last active:",
        format_timestamp(p.last_active_at)
    );
    let _ = writeln!(
        output,
        "{:<24} {:.6}",
        "Withdrawable:",
        config.format_tokens(p.balance_withdrawable)
    );
    let _ = writeln!(
        output,
        "{:<24} {:.6} / {cap}",
        "Earnings / cap:",
        config.format_tokens(p.total_earnings)
    );
    let _ = writeln!(
        output,
        "{:<24} {:.6}",
        "Cumulative spend:",
        config.format_tokens(p.cumulative_spend)
    );
    let _ = writeln!(
        output,
        "{:<24} {:.6}",
        "Total withdrawn:",
        config.format_tokens(p.total_withdrawn)
    );
    let _ = writeln!(
        output,
        "{:<24} {} direct / {} team",
        "Referrals:", p.direct_referral_count, p.team_size
    );
    let _ = writeln!(output, "{:<24} {}", "Leader rank:", info.rank.label());
    let _ = writeln!(
        output,
        "{:<24} {} ({:.2}% cash / {:.2}% reinvest, {:.2}% fee)",
        "Withdrawal tier:",
        info.split.tier.label(),
        config.format_bps_percentage(info.split.withdraw_bps),
        config.format_bps_percentage(info.split.reinvest_bps),
        config.format_bps_percentage(info.split.platform_fee_bps),
    );
    let _ = writeln!(output, "{:<24} {}", "Upline depth:", p.upline_chain.len());
    let _ = writeln!(output, "{:<24} {}", "Auto-compound:", yes_no(p.auto_compound));
    let _ = write!(output, "{:<24} {}", "Blacklisted:", yes_no(p.blacklisted));
    output
}

/// Format a participant for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_participant_json(info: &ParticipantInfo, config: &LeadFiveCliConfig) -> Result<String> {
    let p = &info.participant;
    let value = serde_json::json!({
        "address": p.address.to_string(),
        "sponsor": p.sponsor.map(|s| s.to_string()),
        "package_level": p.package_level,
        "registered_at": p.registered_at,
        "last_active_at": p.last_active_at,
        "balance_withdrawable": p.balance_withdrawable,
        "balance_withdrawable_tokens": config.format_tokens(p.balance_withdrawable),
        "total_earnings": p.total_earnings,
        "earnings_cap": if p.is_root() { None } else { Some(p.earnings_cap) },
        "cumulative_spend": p.cumulative_spend,
        "total_withdrawn": p.total_withdrawn,
        "direct_referral_count": p.direct_referral_count,
        "team_size": p.team_size,
        "matrix_parent": p.matrix_parent.map(|k| k.to_string()),
        "upline_chain": p.upline_chain.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "leader_rank": info.rank.label(),
        "withdrawal_split": {
            "tier": info.split.tier.label(),
            "withdraw_bps": info.split.withdraw_bps,
            "reinvest_bps": info.split.reinvest_bps,
            "platform_fee_bps": info.split.platform_fee_bps,
            "compound_bonus_bps": info.split.compound_bonus_bps,
        },
        "auto_compound": p.auto_compound,
        "blacklisted": p.blacklisted,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Format pool schedules for human-readable output
#[must_use]
pub fn format_pools_human(pools: &[PoolStatus], config: &LeadFiveCliConfig) -> String {
    let mut output = String::from("Pools\n\n");
    let _ = writeln!(
        output,
        "{:<8} {:>16} {:<24} {:<24} {:<4}",
        "Pool", "Balance", "Last distributed", "Next due", "Due"
    );
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for pool in pools {
        let _ = writeln!(
            output,
            "{:<8} {:>16.6} {:<24} {:<24} {:<4}",
            pool.kind.label(),
            config.format_tokens(pool.balance),
            format_timestamp(pool.last_distributed_at),
            format_timestamp(pool.next_due_at),
            yes_no(pool.due)
        );
    }
    output.truncate(output.trim_end().len());
    output
}

/// Format pool schedules for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_pools_json(pools: &[PoolStatus], config: &LeadFiveCliConfig) -> Result<String> {
    let values: Vec<serde_json::Value> = pools
        .iter()
        .map(|pool| {
            serde_json::json!({
                "pool": pool.kind.label(),
                "balance": pool.balance,
                "balance_tokens": config.format_tokens(pool.balance),
                "last_distributed_at": pool.last_distributed_at,
                "next_due_at": pool.next_due_at,
                "next_due": format_timestamp(pool.next_due_at),
                "due": pool.due,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

/// Format the system health snapshot for human-readable output
#[must_use]
pub fn format_health_human(health: &SystemHealth, config: &LeadFiveCliConfig) -> String {
    let breaker = &health.circuit_breaker;
    let mut output = String::from("System Health\n\n");
    let status = if health.paused { "PAUSED" } else { "running" };

    let _ = writeln!(output, "{:<24} {status}", "Status:");
    let _ = writeln!(output, "{:<24} {}", "Participants:", health.total_participants);
    let _ = writeln!(
        output,
        "{:<24} {:.6}",
        "Total locked value:",
        config.format_tokens(health.total_locked_value)
    );
    let _ = writeln!(
        output,
        "{:<24} leader {:.6} / help {:.6} / club {:.6}",
        "Pools:",
        config.format_tokens(health.pool_balances.leader),
        config.format_tokens(health.pool_balances.help),
        config.format_tokens(health.pool_balances.club)
    );
    let _ = write!(
        output,
        "{:<24} {:.6} of {:.6} withdrawn today{}",
        "Circuit breaker:",
        config.format_tokens(breaker.withdrawn_today),
        config.format_tokens(breaker.threshold),
        if breaker.tripped { " (TRIPPED)" } else { "" }
    );
    output
}

/// Format the system health snapshot for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_health_json(health: &SystemHealth, config: &LeadFiveCliConfig) -> Result<String> {
    let breaker = &health.circuit_breaker;
    let value = serde_json::json!({
        "paused": health.paused,
        "total_participants": health.total_participants,
        "total_locked_value": health.total_locked_value,
        "total_locked_value_tokens": config.format_tokens(health.total_locked_value),
        "pool_balances": {
            "leader": health.pool_balances.leader,
            "help": health.pool_balances.help,
            "club": health.pool_balances.club,
        },
        "circuit_breaker": {
            "threshold": breaker.threshold,
            "withdrawn_today": breaker.withdrawn_today,
            "remaining_today": breaker.remaining_today,
            "tripped": breaker.tripped,
        },
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// JSON view of a purchase receipt
#[must_use]
pub fn purchase_receipt_json(receipt: &PurchaseReceipt) -> serde_json::Value {
    serde_json::json!({
        "payment_id": receipt.payment_id.0,
        "package_level": receipt.package_level,
        "price": receipt.price,
        "registered": receipt.registered,
        "upgrade": receipt.upgrade,
        "paid_to_participants": receipt.cascade.paid_to_participants,
        "leader_accrued": receipt.cascade.leader_accrued,
        "help_accrued": receipt.cascade.help_accrued,
        "club_accrued": receipt.cascade.club_accrued,
        "redirected": receipt.cascade.redirected,
    })
}

/// JSON view of a withdrawal receipt
#[must_use]
pub fn withdrawal_receipt_json(receipt: &WithdrawalReceipt) -> serde_json::Value {
    serde_json::json!({
        "tier": receipt.tier.label(),
        "requested": receipt.requested,
        "withdrawn_to_user": receipt.withdrawn_to_user,
        "treasury_fee": receipt.treasury_fee,
        "reinvested": receipt.reinvested,
        "compound_bonus": receipt.compound_bonus,
        "reinvestment_batch": receipt.reinvestment.map(|report| report.payment_id.0),
    })
}

/// JSON view of a pool distribution outcome
#[must_use]
pub fn distribution_outcome_json(outcome: &PoolDistributionOutcome) -> serde_json::Value {
    match *outcome {
        PoolDistributionOutcome::Distributed {
            batch_id,
            distributed,
            recipients,
            remainder,
        } => serde_json::json!({
            "status": "distributed",
            "batch_id": batch_id.0,
            "distributed": distributed,
            "recipients": recipients,
            "remainder": remainder,
        }),
        PoolDistributionOutcome::CarriedOver { balance } => serde_json::json!({
            "status": "carried_over",
            "balance": balance,
        }),
    }
}

/// Count emitted events by name, e.g. `BonusEvent x7, PackagePurchased`
#[must_use]
pub fn summarize_events(events: &[LedgerEvent]) -> String {
    if events.is_empty() {
        return "none".to_string();
    }
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.name()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| {
            if count == 1 {
                name.to_string()
            } else {
                format!("{name} x{count}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format unix timestamp to human-readable UTC date
#[must_use]
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "N/A".to_string();
    }
    DateTime::from_timestamp(timestamp, 0).map_or_else(
        || "Invalid timestamp".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "N/A");
        assert_eq!(format_timestamp(-5), "N/A");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("human").unwrap(), OutputFormat::Human);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_summarize_events_empty() {
        assert_eq!(summarize_events(&[]), "none");
    }
}
