//! # Play Command
//!
//! One interactive deal on stdin. The input language is described in
//! [`crate::validation`]; every command goes through the engine's command
//! surface, so what works here works for any other front end.
//!
//! When a log path is given (flag or `KLONDIKE_LOG_PATH`), the attempt is
//! appended as one JSONL record when the session ends: `win` if the deal was
//! won, `abandoned` if the player quit or input ran out.

use super::RuleArgs;
use crate::error::CliError;
use crate::formatters::{format_layout, format_outcome, format_status};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{PLAY_HELP, ParseResult, parse_play_input};
use klondike_engine::commands::CommandOutcome;
use klondike_engine::game::Game;
use klondike_engine::logger::{AttemptLogger, AttemptRecorder, AttemptResult};
use std::io::{BufRead, Write};

pub fn handle_play_command(
    rules: RuleArgs,
    seed: Option<u32>,
    log: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let (profile, cfg) = rules.resolve()?;
    let seed = seed.or(cfg.seed).unwrap_or_else(rand::random);
    let log_path = log.or(cfg.log_path);

    let mut game = Game::new(profile);
    let mut recorder = AttemptRecorder::new(game.subscribe());
    game.new_game(Some(seed));

    writeln!(
        out,
        "play: seed={} draw={} passes={}",
        seed, profile.draw, profile.passes
    )?;
    writeln!(out, "{}", PLAY_HELP)?;
    render(&game, out)?;

    loop {
        if game.is_won() {
            writeln!(out, "You won in {} moves!", game.moves())?;
            break;
        }
        write!(out, "> ")?;
        out.flush()?;

        let Some(input) = read_stdin_line(stdin) else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        match parse_play_input(&input) {
            ParseResult::Command(command) => match game.dispatch(command) {
                Ok(outcome) => {
                    writeln!(out, "{}", format_outcome(&outcome))?;
                    if !matches!(
                        outcome,
                        CommandOutcome::Selected(_) | CommandOutcome::SelectionCleared
                    ) {
                        render(&game, out)?;
                    }
                }
                Err(e) => ui::write_error(err, &e.to_string())?,
            },
            ParseResult::PromoteAll => {
                let n = game.auto_promote_all();
                writeln!(out, "Promoted {} card(s)", n)?;
                render(&game, out)?;
            }
            ParseResult::Show => render(&game, out)?,
            ParseResult::Help => writeln!(out, "{}", PLAY_HELP)?,
            ParseResult::Quit => break,
            ParseResult::Invalid(msg) => ui::write_error(err, &msg)?,
        }
    }

    writeln!(out, "{}", format_status(&game))?;

    if let Some(path) = log_path {
        let tag = game.wait_tag();
        let Some(mut record) = recorder.finish(AttemptResult::Abandoned) else {
            return Ok(());
        };
        if record.tag.is_empty()
            && let Some(tag) = tag
        {
            record.tag = tag.to_string();
        }
        let mut logger = AttemptLogger::append(&path).map_err(|e| {
            let _ = ui::write_error(err, &format!("Failed to open {}: {}", path, e));
            CliError::Io(e)
        })?;
        logger.write(&record)?;
        writeln!(out, "Attempt logged to {} ({})", path, record.result)?;
    }
    Ok(())
}

fn render(game: &Game, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "{}", format_layout(game.layout(), game.profile()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Cursor;

    fn play(input: &str, log: Option<String>) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let rules = RuleArgs {
            profile: Some("classic".into()),
            draw: None,
            passes: None,
        };
        handle_play_command(rules, Some(7), log, &mut out, &mut err, &mut stdin).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    #[serial]
    fn draw_then_quit() {
        let (out, err) = play("d\nq\n", None);
        assert!(out.contains("play: seed=7 draw=3 passes=unlimited"));
        assert!(out.contains("Drew 3 card(s)"));
        assert!(out.contains("waste(3)"));
        assert!(err.is_empty());
    }

    #[test]
    #[serial]
    fn bad_commands_go_to_stderr() {
        let (out, err) = play("fold\nt t1\n", None);
        assert!(err.contains("Unrecognized command 'fold'"));
        assert!(err.contains("No source selected"));
        assert!(out.contains("moves: 0"));
    }

    #[test]
    #[serial]
    fn quitting_logs_an_abandoned_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.jsonl");
        let (out, _) = play("d\nd\nq\n", Some(path.to_string_lossy().into_owned()));
        assert!(out.contains("Attempt logged"));
        let text = std::fs::read_to_string(&path).unwrap();
        let rec: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(rec["result"], "abandoned");
        assert_eq!(rec["seed"], 7);
        assert_eq!(rec["moves"], 2);
        assert!(!rec["tag"].as_str().unwrap().is_empty());
        assert!(rec["timestamp_utc"].is_string());
    }
}
