//! `cfg`: print the resolved configuration with the source of each value.
//!
//! ```json
//! {
//!   "profile": { "value": "classic", "source": "default" },
//!   "draw": { "value": 1, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let effective = config
        .rule_profile()
        .map_err(|e| CliError::Config(e.to_string()))?;
    let display = serde_json::json!({
        "profile": {
            "value": config.profile,
            "source": sources.profile,
        },
        "draw": {
            "value": config.draw,
            "source": sources.draw,
        },
        "passes": {
            "value": config.passes,
            "source": sources.passes,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "log_path": {
            "value": config.log_path,
            "source": sources.log_path,
        },
        "rules": effective,
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
