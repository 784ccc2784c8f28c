//! Command-line argument definitions.
//!
//! Kept apart from dispatch so tests can check that every subcommand listed
//! in the help fallback has a parser entry.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "klondike",
    version,
    about = "Klondike Solitaire engine tooling: deal, play, simulate and analyse attempts"
)]
pub struct KlondikeCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deal one layout and print its identity
    Deal {
        #[arg(long)]
        seed: Option<u32>,
        /// Cards per draw used for the printed rule summary
        #[arg(long)]
        draw: Option<u8>,
    },
    /// Print the first cards of the shuffle for a seed
    Rng {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Play one deal interactively on stdin
    Play {
        #[arg(long)]
        seed: Option<u32>,
        /// Rule profile: classic, standard, friendly, relaxed or xray
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        draw: Option<u8>,
        /// Pass limit: a number or unlimited/three/one/none
        #[arg(long)]
        passes: Option<String>,
        /// Append the attempt record to this JSONL file
        #[arg(long)]
        log: Option<String>,
    },
    /// Let an automated player play many deals
    Sim {
        #[arg(long)]
        games: u32,
        /// Base seed; game i uses seed + i
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long, default_value = "greedy")]
        player: String,
        /// Attempt records are written here as JSONL
        #[arg(long)]
        output: Option<String>,
        #[arg(long, default_value_t = 5_000)]
        max_steps: u32,
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        draw: Option<u8>,
        #[arg(long)]
        passes: Option<String>,
    },
    /// Summarise an attempt log (JSONL, JSONL.zst or CSV)
    Stats {
        #[arg(long)]
        input: String,
        /// Count abandoned attempts as losses
        #[arg(long)]
        abandoned_as_loss: bool,
    },
    /// Validate an attempt log
    Verify {
        #[arg(long)]
        input: Option<String>,
    },
    /// Convert an attempt log to csv, json or sqlite
    Export {
        #[arg(long)]
        input: String,
        #[arg(long)]
        format: String,
        #[arg(long)]
        output: String,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
}
