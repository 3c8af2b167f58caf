//! LeadFive CLI - Operator interface for the LeadFive reward ledger
//!
//! Drives the compensation engine against a ledger snapshot file: initialize a
//! ledger, register participants, process purchases and withdrawals, run pool
//! distributions, and inspect balances and system health.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use leadfive_cli::{
    commands::{self, init::InitRequest, purchase::PurchaseRequest, CommandContext},
    CliError, LeadFiveCliConfig, OutputFormat, StateStore,
};
use leadfive_program::pools::PoolKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "leadfive-cli",
    version,
    about = "Command-line interface for the LeadFive participant reward ledger"
)]
struct Cli {
    /// Ledger snapshot file
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Unix timestamp to run the command at (defaults to the current time)
    #[arg(long, global = true)]
    now: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new ledger with the canonical package catalog
    Init {
        /// Ledger authority (first admin)
        #[arg(long)]
        authority: String,

        /// Account receiving platform fees
        #[arg(long)]
        treasury: String,

        /// Root participant of the matrix
        #[arg(long)]
        root: String,

        /// Feed part of every payment into the Club pool
        #[arg(long)]
        club_pool: bool,

        /// Daily withdrawal limit across all participants, in token base units
        #[arg(long)]
        breaker_threshold: Option<u64>,

        /// Daily withdrawal limit per participant, in token base units (0 = none)
        #[arg(long)]
        max_daily_withdrawal: Option<u64>,

        /// Replace an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Register a participant under a sponsor without purchasing
    Register {
        #[arg(long)]
        participant: String,

        #[arg(long)]
        sponsor: String,
    },

    /// Purchase or upgrade a package
    Purchase {
        #[arg(long)]
        payer: String,

        /// Package level (1-4 in the canonical catalog)
        #[arg(long)]
        level: u8,

        /// Sponsor for a payer who is not yet registered
        #[arg(long)]
        sponsor: Option<String>,

        /// Amount paid in token base units (defaults to the package price)
        #[arg(long)]
        value: Option<u64>,
    },

    /// Withdraw earnings; part of the amount is reinvested
    Withdraw {
        #[arg(long)]
        participant: String,

        /// Amount in token base units
        #[arg(long)]
        amount: u64,
    },

    /// Turn auto-compounding on or off for a participant
    AutoCompound {
        #[arg(long)]
        participant: String,

        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Distribute a pool to its eligible participants (admin only)
    Distribute {
        #[arg(long)]
        authority: String,

        /// leader, help, or club
        #[arg(long)]
        pool: PoolKind,
    },

    /// Halt purchases and withdrawals (admin only)
    Pause {
        #[arg(long)]
        authority: String,
    },

    /// Resume purchases and withdrawals (admin only)
    Unpause {
        #[arg(long)]
        authority: String,
    },

    /// Blacklist a participant, or lift the flag with --remove (admin only)
    Blacklist {
        #[arg(long)]
        authority: String,

        #[arg(long)]
        participant: String,

        #[arg(long)]
        remove: bool,
    },

    /// Change the account receiving platform fees (admin only)
    SetTreasury {
        #[arg(long)]
        authority: String,

        #[arg(long)]
        treasury: String,
    },

    /// Change the daily circuit breaker threshold (admin only)
    SetBreaker {
        #[arg(long)]
        authority: String,

        /// Threshold in token base units
        #[arg(long)]
        threshold: u64,
    },

    /// Show a participant's record
    Participant {
        #[arg(long)]
        address: String,
    },

    /// Show pool balances and distribution schedules
    Pools,

    /// Show system health and verify solvency
    Health,

    /// Replay a JSON scenario against a fresh in-memory ledger
    Simulate {
        /// Scenario file
        #[arg(long)]
        scenario: PathBuf,

        /// Write the resulting ledger to the state file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = LeadFiveCliConfig::new();

    // Use configuration with CLI overrides
    let default_output_format: OutputFormat = config
        .default_output_format
        .parse()
        .map_err(anyhow::Error::msg)?;
    let output_format = cli.output.unwrap_or(default_output_format);
    let store = StateStore::new(cli.state.clone().unwrap_or_else(|| config.state_path.clone()));
    let ctx = CommandContext {
        store: &store,
        config: &config,
        output: output_format,
        now: cli.now.unwrap_or_else(|| chrono::Utc::now().timestamp()),
    };

    // Execute command
    let result = execute_command(&cli.command, &ctx);

    // Handle output formatting
    match result {
        Ok(output) => match output_format {
            OutputFormat::Human => println!("{output}"),
            OutputFormat::Json => {
                let data = serde_json::from_str::<serde_json::Value>(&output)
                    .unwrap_or(serde_json::Value::String(output));
                let json_output = serde_json::json!({
                    "success": true,
                    "data": data
                });
                println!("{}", serde_json::to_string_pretty(&json_output)?);
            }
        },
        Err(e) => {
            match output_format {
                OutputFormat::Human => eprintln!("Error: {e}"),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                        "code": e.code()
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

fn execute_command(command: &Commands, ctx: &CommandContext<'_>) -> Result<String, CliError> {
    match command {
        Commands::Init {
            authority,
            treasury,
            root,
            club_pool,
            breaker_threshold,
            max_daily_withdrawal,
            force,
        } => {
            let request = InitRequest {
                authority,
                treasury,
                root,
                club_pool: *club_pool,
                circuit_breaker_threshold: *breaker_threshold,
                max_daily_withdrawal: *max_daily_withdrawal,
                force: *force,
            };
            commands::execute_init(ctx, &request)
        }

        Commands::Register {
            participant,
            sponsor,
        } => commands::execute_register(ctx, participant, sponsor),

        Commands::Purchase {
            payer,
            level,
            sponsor,
            value,
        } => {
            let request = PurchaseRequest {
                payer,
                level: *level,
                sponsor: sponsor.as_deref(),
                value: *value,
            };
            commands::execute_purchase(ctx, &request)
        }

        Commands::Withdraw {
            participant,
            amount,
        } => commands::execute_withdraw(ctx, participant, *amount),

        Commands::AutoCompound {
            participant,
            enabled,
        } => commands::execute_set_auto_compound(ctx, participant, *enabled),

        Commands::Distribute { authority, pool } => {
            commands::execute_distribute(ctx, authority, *pool)
        }

        Commands::Pause { authority } => commands::execute_pause(ctx, authority),

        Commands::Unpause { authority } => commands::execute_unpause(ctx, authority),

        Commands::Blacklist {
            authority,
            participant,
            remove,
        } => commands::execute_blacklist(ctx, authority, participant, !*remove),

        Commands::SetTreasury {
            authority,
            treasury,
        } => commands::execute_set_treasury(ctx, authority, treasury),

        Commands::SetBreaker {
            authority,
            threshold,
        } => commands::execute_set_breaker(ctx, authority, *threshold),

        Commands::Participant { address } => commands::execute_participant(ctx, address),

        Commands::Pools => commands::execute_pools(ctx),

        Commands::Health => commands::execute_health(ctx),

        Commands::Simulate { scenario, save } => {
            commands::execute_simulate(ctx, scenario, *save)
        }
    }
}
