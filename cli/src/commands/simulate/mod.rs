//! Scenario simulation command implementation
//!
//! Replays a JSON scenario against a fresh in-memory ledger. Participants are
//! referred to by short names; `admin`, `treasury`, and `root` are predefined.
//! A failing step is recorded with its error code and the run continues, unless
//! the scenario sets `stop_on_error`. Solvency is checked after every step.
//!
//! ```json
//! {
//!   "club_pool": true,
//!   "steps": [
//!     { "action": "purchase", "payer": "alice", "level": 2, "sponsor": "root" },
//!     { "action": "advance", "days": 7 },
//!     { "action": "distribute", "pool": "help" },
//!     { "action": "withdraw", "participant": "alice", "amount": 10000000 }
//!   ]
//! }
//! ```

use std::{collections::BTreeMap, fmt::Write, fs, path::Path, str::FromStr};

use anchor_lang::prelude::Pubkey;
use leadfive_program::{
    constants::SECONDS_PER_DAY,
    pools::PoolKind,
    queries::{verify_solvency, SystemHealth},
    runtime::{Invocation, NoopPayoutHook},
    BlacklistArgs, DistributePoolArgs, Engine, InitializeArgs, PoolDistributionOutcome,
    PurchaseArgs, RegisterArgs, SetAutoCompoundArgs, WithdrawArgs,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    commands::CommandContext,
    config::LeadFiveCliConfig,
    error::{CliError, Result},
    store::StateStore,
    utils::formatting::{format_health_human, OutputFormat},
};


const DEFAULT_START: i64 = 1_700_000_000;

const fn default_start() -> i64 {
    DEFAULT_START
}

const fn default_true() -> bool {
    true
}

/// Scenario file contents
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Unix timestamp of the first step
    #[serde(default = "default_start")]
    pub start: i64,
    #[serde(default)]
    pub club_pool: bool,
    #[serde(default)]
    pub circuit_breaker_threshold: Option<u64>,
    #[serde(default)]
    pub max_daily_withdrawal: Option<u64>,
    #[serde(default)]
    pub stop_on_error: bool,
    pub steps: Vec<Step>,
}

/// One scenario action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Register {
        participant: String,
        sponsor: String,
    },
    Purchase {
        payer: String,
        level: u8,
        #[serde(default)]
        sponsor: Option<String>,
    },
    Withdraw {
        participant: String,
        amount: u64,
    },
    AutoCompound {
        participant: String,
        enabled: bool,
    },
    Distribute {
        pool: String,
    },
    Advance {
        #[serde(default)]
        days: i64,
        #[serde(default)]
        seconds: i64,
    },
    Pause,
    Unpause,
    Blacklist {
        participant: String,
        #[serde(default = "default_true")]
        blacklisted: bool,
    },
}

impl Step {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Purchase { .. } => "purchase",
            Self::Withdraw { .. } => "withdraw",
            Self::AutoCompound { .. } => "auto_compound",
            Self::Distribute { .. } => "distribute",
            Self::Advance { .. } => "advance",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Blacklist { .. } => "blacklist",
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    pub detail: String,
    /// Engine code when the step was rejected
    pub error_code: Option<u32>,
    pub ok: bool,
}

/// Final participant figures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub name: String,
    pub address: Pubkey,
    pub package_level: u8,
    pub balance_withdrawable: u64,
    pub total_earnings: u64,
    pub total_withdrawn: u64,
}

/// Everything a scenario run produced
#[derive(Debug)]
pub struct SimulationReport {
    pub steps: Vec<StepOutcome>,
    pub participants: Vec<ParticipantSummary>,
    pub health: SystemHealth,
    pub finished_at: i64,
    pub engine: Engine,
}

impl SimulationReport {
    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.ok).count()
    }
}

/// Name to address mapping for scenario participants
#[derive(Debug)]
struct Actors {
    by_name: BTreeMap<String, Pubkey>,
}

impl Actors {
    fn new(admin: Pubkey, treasury: Pubkey, root: Pubkey) -> Self {
        let mut by_name = BTreeMap::new();
        by_name.insert("admin".to_string(), admin);
        by_name.insert("treasury".to_string(), treasury);
        by_name.insert("root".to_string(), root);
        Self { by_name }
    }

    /// Resolves a name (or a base58 address) to a key, creating it on first use.
    fn resolve(&mut self, name: &str) -> Result<Pubkey> {
        if let Some(key) = self.by_name.get(name) {
            return Ok(*key);
        }
        if name.len() >= 32 {
            if let Ok(key) = Pubkey::from_str(name) {
                return Ok(key);
            }
        }
        let key = named_key(name)?;
        self.by_name.insert(name.to_string(), key);
        Ok(key)
    }

    fn name_of(&self, key: &Pubkey) -> String {
        self.by_name
            .iter()
            .find(|(_, candidate)| *candidate == key)
            .map_or_else(|| key.to_string(), |(name, _)| name.clone())
    }
}

/// Deterministic address for a scenario name: its bytes, zero padded.
fn named_key(name: &str) -> Result<Pubkey> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(CliError::Scenario(format!(
            "participant name '{name}' must be 1 to 32 bytes"
        )));
    }
    let mut key = [0_u8; 32];
    key[..bytes.len()].copy_from_slice(bytes);
    Ok(Pubkey::new_from_array(key))
}

/// Load a scenario file
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid scenario
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let scenario: Scenario = serde_json::from_str(&contents)?;
    if scenario.steps.is_empty() {
        return Err(CliError::Scenario("scenario has no steps".to_string()));
    }
    Ok(scenario)
}

/// Run a scenario against a fresh ledger
///
/// # Errors
/// Returns error if the ledger cannot be initialized, a name is invalid, the
/// clock overflows, the ledger fails the solvency check, or a step fails while
/// `stop_on_error` is set
pub fn run_scenario(scenario: &Scenario) -> Result<SimulationReport> {
    let admin = named_key("admin")?;
    let treasury = named_key("treasury")?;
    let root = named_key("root")?;
    let mut actors = Actors::new(admin, treasury, root);

    let mut args = InitializeArgs::canonical(treasury, root);
    args.club_pool_enabled = scenario.club_pool;
    if let Some(threshold) = scenario.circuit_breaker_threshold {
        args.circuit_breaker_threshold = threshold;
    }
    if let Some(limit) = scenario.max_daily_withdrawal {
        args.max_daily_withdrawal_per_participant = limit;
    }

    let mut now = scenario.start;
    let mut engine = Engine::initialize(Invocation::new(admin, now), args)?;
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply_step(&mut engine, &mut actors, &mut now, step);
        verify_solvency(engine.ledger())?;

        let outcome = match result {
            Ok(detail) => {
                debug!(index, action = step.action(), %detail, "Step applied");
                StepOutcome {
                    index,
                    action: step.action(),
                    detail,
                    error_code: None,
                    ok: true,
                }
            }
            Err(err @ CliError::Scenario(_)) => return Err(err),
            Err(err) => {
                warn!(index, action = step.action(), error = %err, "Step rejected");
                if scenario.stop_on_error {
                    return Err(err);
                }
                StepOutcome {
                    index,
                    action: step.action(),
                    detail: err.to_string(),
                    error_code: err.code(),
                    ok: false,
                }
            }
        };
        steps.push(outcome);
        engine.take_events();
    }

    let participants = engine
        .ledger()
        .participants
        .iter()
        .map(|p| ParticipantSummary {
            name: actors.name_of(&p.address),
            address: p.address,
            package_level: p.package_level,
            balance_withdrawable: p.balance_withdrawable,
            total_earnings: p.total_earnings,
            total_withdrawn: p.total_withdrawn,
        })
        .collect();

    Ok(SimulationReport {
        steps,
        participants,
        health: engine.get_system_health(now),
        finished_at: now,
        engine,
    })
}

fn apply_step(engine: &mut Engine, actors: &mut Actors, now: &mut i64, step: &Step) -> Result<String> {
    let admin = actors.resolve("admin")?;
    match step {
        Step::Register {
            participant,
            sponsor,
        } => {
            let key = actors.resolve(participant)?;
            let sponsor_key = actors.resolve(sponsor)?;
            engine.register(
                Invocation::new(key, *now),
                RegisterArgs {
                    sponsor: Some(sponsor_key),
                },
            )?;
            Ok(format!("{participant} joined under {sponsor}"))
        }
        Step::Purchase {
            payer,
            level,
            sponsor,
        } => {
            let key = actors.resolve(payer)?;
            let sponsor_key = sponsor.as_deref().map(|s| actors.resolve(s)).transpose()?;
            let price = engine.get_package(*level)?.price;
            let receipt = engine.purchase(
                Invocation::new(key, *now),
                PurchaseArgs {
                    package_level: *level,
                    sponsor: sponsor_key,
                    value: price,
                },
            )?;
            Ok(format!(
                "{payer} bought level {level} for {price} (payment {}, {} redirected)",
                receipt.payment_id, receipt.cascade.redirected
            ))
        }
        Step::Withdraw {
            participant,
            amount,
        } => {
            let key = actors.resolve(participant)?;
            let receipt = engine.withdraw(
                Invocation::new(key, *now),
                WithdrawArgs { amount: *amount },
                &mut NoopPayoutHook,
            )?;
            Ok(format!(
                "{participant} withdrew {} ({} to user, {} fee, {} reinvested)",
                receipt.requested, receipt.withdrawn_to_user, receipt.treasury_fee, receipt.reinvested
            ))
        }
        Step::AutoCompound {
            participant,
            enabled,
        } => {
            let key = actors.resolve(participant)?;
            engine.set_auto_compound(
                Invocation::new(key, *now),
                SetAutoCompoundArgs { enabled: *enabled },
            )?;
            Ok(format!("{participant} auto-compound {enabled}"))
        }
        Step::Distribute { pool } => {
            let kind = PoolKind::from_str(pool).map_err(CliError::Scenario)?;
            let outcome =
                engine.distribute_pool(Invocation::new(admin, *now), DistributePoolArgs { pool: kind })?;
            Ok(match outcome {
                PoolDistributionOutcome::Distributed {
                    distributed,
                    recipients,
                    ..
                } => format!("{kind} pool paid {distributed} to {recipients} participants"),
                PoolDistributionOutcome::CarriedOver { balance } => {
                    format!("{kind} pool carried over {balance}")
                }
            })
        }
        Step::Advance { days, seconds } => {
            let delta = days
                .checked_mul(SECONDS_PER_DAY)
                .and_then(|d| d.checked_add(*seconds))
                .filter(|delta| *delta >= 0)
                .ok_or_else(|| CliError::Scenario(format!("invalid clock advance: {days} days, {seconds} seconds")))?;
            *now = now
                .checked_add(delta)
                .ok_or_else(|| CliError::Scenario("clock overflow".to_string()))?;
            Ok(format!("clock advanced {delta}s"))
        }
        Step::Pause => {
            engine.pause(Invocation::new(admin, *now))?;
            Ok("paused".to_string())
        }
        Step::Unpause => {
            engine.unpause(Invocation::new(admin, *now))?;
            Ok("unpaused".to_string())
        }
        Step::Blacklist {
            participant,
            blacklisted,
        } => {
            let key = actors.resolve(participant)?;
            engine.blacklist(
                Invocation::new(admin, *now),
                BlacklistArgs {
                    participant: key,
                    blacklisted: *blacklisted,
                },
            )?;
            Ok(format!("{participant} blacklisted {blacklisted}"))
        }
    }
}

/// Execute the simulate command
///
/// With `save`, the resulting ledger replaces the state file.
///
/// # Errors
/// Returns error if the scenario cannot be loaded or run, or the state cannot be saved
pub fn execute(ctx: &CommandContext<'_>, scenario_path: &Path, save: bool) -> Result<String> {
    info!(path = %scenario_path.display(), "Running scenario");
    let scenario = load_scenario(scenario_path)?;
    let report = run_scenario(&scenario)?;
    info!(
        steps = report.steps.len(),
        failed = report.failed_steps(),
        "Scenario finished"
    );

    if save {
        ctx.store.create(&report.engine, true)?;
    }

    match ctx.output {
        OutputFormat::Human => Ok(format_report_human(&report, ctx.config, save.then(|| ctx.store))),
        OutputFormat::Json => format_report_json(&report),
    }
}

fn format_report_human(
    report: &SimulationReport,
    config: &LeadFiveCliConfig,
    saved_to: Option<&StateStore>,
) -> String {
    let mut output = String::from("Scenario Steps\n\n");
    for step in &report.steps {
        let status = if step.ok { "ok" } else { "FAILED" };
        let _ = writeln!(
            output,
            "{:>4} {:<14} {:<7} {}",
            step.index, step.action, status, step.detail
        );
    }

    output.push_str("\nParticipants\n\n");
    let _ = writeln!(
        output,
        "{:<16} {:>5} {:>16} {:>16} {:>16}",
        "Name", "Level", "Withdrawable", "Earned", "Withdrawn"
    );
    output.push_str(&"-".repeat(73));
    output.push('\n');
    for p in &report.participants {
        let _ = writeln!(
            output,
            "{:<16} {:>5} {:>16.6} {:>16.6} {:>16.6}",
            truncate_name(&p.name),
            p.package_level,
            config.format_tokens(p.balance_withdrawable),
            config.format_tokens(p.total_earnings),
            config.format_tokens(p.total_withdrawn),
        );
    }

    output.push('\n');
    output.push_str(&format_health_human(&report.health, config));
    let _ = write!(
        output,
        "\n\n{} steps, {} failed",
        report.steps.len(),
        report.failed_steps()
    );
    if let Some(store) = saved_to {
        let _ = write!(output, "\nLedger saved to {}", store.path().display());
    }
    output
}

fn format_report_json(report: &SimulationReport) -> Result<String> {
    let value = serde_json::json!({
        "steps": report.steps.iter().map(|step| serde_json::json!({
            "index": step.index,
            "action": step.action,
            "ok": step.ok,
            "detail": step.detail,
            "error_code": step.error_code,
        })).collect::<Vec<_>>(),
        "participants": report.participants.iter().map(|p| serde_json::json!({
            "name": p.name,
            "address": p.address.to_string(),
            "package_level": p.package_level,
            "balance_withdrawable": p.balance_withdrawable,
            "total_earnings": p.total_earnings,
            "total_withdrawn": p.total_withdrawn,
        })).collect::<Vec<_>>(),
        "health": {
            "paused": report.health.paused,
            "total_participants": report.health.total_participants,
            "total_locked_value": report.health.total_locked_value,
            "pool_balances": {
                "leader": report.health.pool_balances.leader,
                "help": report.health.pool_balances.help,
                "club": report.health.pool_balances.club,
            },
        },
        "finished_at": report.finished_at,
        "failed_steps": report.failed_steps(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn truncate_name(name: &str) -> &str {
    name.char_indices()
        .nth(16)
        .map_or(name, |(end, _)| &name[..end])
}
