//! # Klondike CLI Library
//!
//! Command-line tooling for the Klondike Solitaire engine: deal and inspect
//! layouts, play a deal on stdin, run automated players over many deals, and
//! analyse the resulting attempt logs.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line
//! arguments and executes the appropriate subcommand.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["klondike", "sim", "--games", "10", "--seed", "1"];
//! let code = klondike_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `deal`: Deal one layout and print its canonical encoding, deck key and hand tag
//! - `rng`: Print the start of the shuffle for a seed
//! - `play`: Play one deal interactively
//! - `sim`: Let an automated player play many deals and log the attempts
//! - `stats`: Win rate, move averages and streaks from an attempt log
//! - `verify`: Validate an attempt log
//! - `export`: Convert an attempt log to CSV, JSON or SQLite
//! - `cfg`: Show resolved configuration

#[macro_use]
mod macros;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod records;
pub mod ui;
pub mod validation;

use clap::Parser;
use std::io::Write;

use cli::{Commands, KlondikeCli};
use commands::{
    RuleArgs, handle_cfg_command, handle_deal_command, handle_export_command,
    handle_play_command, handle_rng_command, handle_sim_command, handle_stats_command,
    handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

/// Subcommands listed by the usage fallback.
pub const COMMANDS: &[&str] = &[
    "deal", "rng", "play", "sim", "stats", "verify", "export", "cfg",
];

/// Parses `args` and runs the selected subcommand.
///
/// Returns the process exit code: [`exit_code::SUCCESS`], [`exit_code::ERROR`]
/// for usage and command failures, or [`exit_code::INTERRUPTED`] when a
/// simulation stops early.
///
/// ```
/// use std::io;
/// let args = vec!["klondike", "deal", "--seed", "42"];
/// let mut out = Vec::new();
/// let code = klondike_cli::run(args, &mut out, &mut io::stderr());
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().starts_with("seed: 42"));
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match KlondikeCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version go to stdout
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Klondike CLI");
            write_or_exit!(err, "Usage: klondike <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: klondike --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Deal { seed, draw } => handle_deal_command(seed, draw, out),
        Commands::Rng { seed, count } => handle_rng_command(seed, count, out),
        Commands::Play {
            seed,
            profile,
            draw,
            passes,
            log,
        } => {
            let rules = RuleArgs {
                profile,
                draw,
                passes,
            };
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_play_command(rules, seed, log, out, err, &mut stdin_lock)
        }
        Commands::Sim {
            games,
            seed,
            player,
            output,
            max_steps,
            profile,
            draw,
            passes,
        } => {
            let rules = RuleArgs {
                profile,
                draw,
                passes,
            };
            handle_sim_command(games, seed, &player, output, max_steps, rules, out, err)
        }
        Commands::Stats {
            input,
            abandoned_as_loss,
        } => handle_stats_command(input, abandoned_as_loss, out, err),
        Commands::Verify { input } => {
            let Some(path) = input else {
                let _ = ui::write_error(err, "input required");
                return exit_code::ERROR;
            };
            handle_verify_command(path, out, err)
        }
        Commands::Export {
            input,
            format,
            output,
        } => handle_export_command(input, output, format, out, err),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            write_or_exit!(err, "Interrupted: {}", msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn run_cli(args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args.iter().copied(), &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn command_list_matches_parser() {
        let cmd = KlondikeCli::command();
        let mut parsed: Vec<&str> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        parsed.sort_unstable();
        let mut listed = COMMANDS.to_vec();
        listed.sort_unstable();
        assert_eq!(parsed, listed);
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, err) = run_cli(&["klondike", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("Usage"));
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_commands() {
        let (code, _, err) = run_cli(&["klondike", "shuffle"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("Klondike CLI"));
        assert!(err.contains("  export"));
    }

    #[test]
    fn verify_without_input() {
        let (code, _, err) = run_cli(&["klondike", "verify"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("input required"));
    }

    #[test]
    fn rng_dispatch() {
        let (code, out, _) = run_cli(&["klondike", "rng", "--seed", "9", "--count", "3"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.starts_with("seed: 9\nRNG sample: "));
    }
}
