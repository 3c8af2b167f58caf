//! Command implementations for the LeadFive CLI

pub mod blacklist;
pub mod distribute;
pub mod health;
pub mod init;
pub mod participant;
pub mod pause;
pub mod pools;
pub mod purchase;
pub mod register;
pub mod set_auto_compound;
pub mod set_breaker;
pub mod set_treasury;
pub mod simulate;
pub mod withdraw;

// Re-export the execute functions with cleaner names
pub use blacklist::execute as execute_blacklist;
pub use distribute::execute as execute_distribute;
pub use health::execute as execute_health;
pub use init::execute as execute_init;
pub use participant::execute as execute_participant;
pub use pause::{execute_pause, execute_unpause};
pub use pools::execute as execute_pools;
pub use purchase::execute as execute_purchase;
pub use register::execute as execute_register;
pub use set_auto_compound::execute as execute_set_auto_compound;
pub use set_breaker::execute as execute_set_breaker;
pub use set_treasury::execute as execute_set_treasury;
pub use simulate::execute as execute_simulate;
pub use withdraw::execute as execute_withdraw;

use anchor_lang::prelude::Pubkey;
use leadfive_program::{events::LedgerEvent, runtime::Invocation};

use crate::{
    config::LeadFiveCliConfig,
    error::Result,
    store::StateStore,
    utils::formatting::{summarize_events, OutputFormat},
};

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub store: &'a StateStore,
    pub config: &'a LeadFiveCliConfig,
    pub output: OutputFormat,
    /// Clock handed to the engine for this invocation
    pub now: i64,
}

impl CommandContext<'_> {
    #[must_use]
    pub const fn invocation(&self, signer: Pubkey) -> Invocation {
        Invocation::new(signer, self.now)
    }

    /// Render a mutation result: `summary` for humans, `data` plus event names for JSON
    pub(crate) fn render(
        &self,
        summary: String,
        data: serde_json::Value,
        events: &[LedgerEvent],
    ) -> Result<String> {
        match self.output {
            OutputFormat::Human => Ok(format!("{summary}\nEvents: {}", summarize_events(events))),
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "result": data,
                    "events": events.iter().map(LedgerEvent::name).collect::<Vec<_>>(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
        }
    }
}
