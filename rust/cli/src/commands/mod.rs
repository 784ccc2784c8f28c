//! Command handlers, one module per subcommand.
//!
//! Every handler has the shape
//! `handle_X_command(..., out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError>`
//! and writes nothing to the real stdio, so tests drive them with buffers.

mod cfg;
mod deal;
mod export;
mod play;
mod rng;
mod sim;
mod stats;
mod verify;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use export::handle_export_command;
pub use play::handle_play_command;
pub use rng::handle_rng_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
pub use verify::handle_verify_command;

use crate::config::{self, Config};
use crate::error::CliError;
use klondike_engine::rules::{PassLimit, RuleProfile};

/// Rule flags shared by `play` and `sim`; unset flags fall back to config.
#[derive(Debug, Clone, Default)]
pub struct RuleArgs {
    pub profile: Option<String>,
    pub draw: Option<u8>,
    pub passes: Option<String>,
}

impl RuleArgs {
    /// Loads the configuration and applies the flags on top of it.
    pub fn resolve(&self) -> Result<(RuleProfile, Config), CliError> {
        let mut cfg =
            config::load().map_err(|e| CliError::Config(format!("Invalid configuration: {}", e)))?;
        if let Some(profile) = &self.profile {
            cfg.profile = profile.clone();
        }
        if let Some(draw) = self.draw {
            cfg.draw = Some(draw);
        }
        if let Some(passes) = &self.passes {
            cfg.passes = Some(passes.parse::<PassLimit>()?);
        }
        let profile = cfg
            .rule_profile()
            .map_err(|e| CliError::InvalidInput(e.to_string()))?;
        Ok((profile, cfg))
    }
}
