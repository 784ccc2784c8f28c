//! Simulation command: let an automated player work through many deals.
//!
//! Game `i` (0-based) is dealt from `seed + i`, so a run is reproducible from
//! its base seed. One line per game goes to `out`, followed by a summary
//! line; with `--output` every attempt is also written as a JSONL record.
//!
//! # Environment Variables
//!
//! - `KLONDIKE_SIM_BREAK_AFTER`: stop after N games and report an
//!   interruption (exit code 130), for exercising partial runs in tests

use super::RuleArgs;
use crate::error::CliError;
use crate::ui;
use klondike_ai::{PLAYER_KINDS, create_player, play_out};
use klondike_engine::game::Game;
use klondike_engine::logger::{AttemptLogger, AttemptRecorder, AttemptResult};
use std::io::Write;
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub fn handle_sim_command(
    games: u32,
    seed: Option<u32>,
    player: &str,
    output: Option<String>,
    max_steps: u32,
    rules: RuleArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }
    let Some(mut player) = create_player(player) else {
        let msg = format!(
            "Unknown player '{}'. Available: {}",
            player,
            PLAYER_KINDS.join(", ")
        );
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    };
    let (profile, cfg) = rules.resolve()?;
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);

    let mut logger = match output.as_deref() {
        Some(path) => AttemptLogger::create(path)?,
        None => AttemptLogger::sink(),
    };

    let break_after = std::env::var("KLONDIKE_SIM_BREAK_AFTER")
        .ok()
        .and_then(|v| v.parse::<u32>().ok());

    writeln!(
        out,
        "sim: games={} seed={} player={} draw={} passes={}",
        games,
        base_seed,
        player.name(),
        profile.draw,
        profile.passes
    )?;

    let mut game = Game::new(profile);
    let mut recorder = AttemptRecorder::new(game.subscribe());
    let mut wins = 0u32;
    let mut total_moves = 0u64;
    let mut played = 0u32;

    for i in 0..games {
        if break_after.is_some_and(|n| played >= n) {
            writeln!(out, "Interrupted after {} of {} games", played, games)?;
            return Err(CliError::Interrupted(format!(
                "stopped after {} games",
                played
            )));
        }
        let deal_seed = base_seed.wrapping_add(i);
        game.new_game(Some(deal_seed));
        let outcome = play_out(&mut game, player.as_mut(), max_steps);
        game.wait_tag();
        let Some(record) = recorder.finish(AttemptResult::Loss) else {
            continue;
        };
        logger.write(&record)?;

        played += 1;
        total_moves += u64::from(outcome.moves);
        if outcome.won {
            wins += 1;
        }
        writeln!(
            out,
            "game {}: seed={} result={} moves={} foundations={} tag={}",
            i + 1,
            deal_seed,
            record.result,
            outcome.moves,
            outcome.foundations,
            record.tag
        )?;
    }

    let rate = f64::from(wins) * 100.0 / f64::from(played.max(1));
    info!(games = played, wins, "simulation finished");
    writeln!(
        out,
        "Simulated {} games: {} won ({:.1}%), average moves {:.1}",
        played,
        wins,
        rate,
        total_moves as f64 / f64::from(played.max(1))
    )?;
    if let Some(path) = output {
        writeln!(out, "Wrote {} attempt record(s) to {}", logger.written(), path)?;
    }
    Ok(())
}
