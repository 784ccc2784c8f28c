//! Statistics over attempt logs.
//!
//! Counts results, computes the win rate over all attempts, move and duration
//! averages, and win/loss streaks in file order. With `abandoned_as_loss` an
//! abandoned attempt extends a loss streak; otherwise it breaks any streak,
//! as does an `unknown` or missing result.

use crate::error::CliError;
use crate::records::{AttemptRow, read_attempt_log};
use crate::ui;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentStreak {
    pub result: String,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptStats {
    pub attempts: u64,
    pub results: BTreeMap<String, u64>,
    pub win_rate: Option<f64>,
    pub average_moves: Option<f64>,
    pub median_moves: Option<f64>,
    pub average_duration_ms: Option<f64>,
    pub longest_win_streak: u64,
    pub longest_loss_streak: u64,
    pub current_streak: Option<CurrentStreak>,
}

fn mean(samples: &[u64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|&v| v as f64).sum::<f64>() / samples.len() as f64)
}

fn median(samples: &[u64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    })
}

pub fn summarise(rows: &[AttemptRow], abandoned_as_loss: bool) -> AttemptStats {
    let mut results = BTreeMap::new();
    let mut wins = 0u64;
    let mut moves = Vec::new();
    let mut durations = Vec::new();
    let mut longest_win = 0u64;
    let mut longest_loss = 0u64;
    let mut current: Option<(&str, u64)> = None;

    for row in rows {
        let label = if row.result.is_empty() {
            "unknown"
        } else {
            row.result.as_str()
        };
        *results.entry(label.to_string()).or_insert(0) += 1;
        if label == "win" {
            wins += 1;
        }
        moves.extend(row.moves);
        durations.extend(row.duration_ms);

        let tracked = match label {
            "abandoned" if abandoned_as_loss => "loss",
            other => other,
        };
        if tracked != "win" && tracked != "loss" {
            current = None;
            continue;
        }
        let length = match current {
            Some((r, n)) if r == tracked => n + 1,
            _ => 1,
        };
        current = Some((tracked, length));
        let longest = if tracked == "win" {
            &mut longest_win
        } else {
            &mut longest_loss
        };
        *longest = (*longest).max(length);
    }

    let attempts = rows.len() as u64;
    AttemptStats {
        attempts,
        results,
        win_rate: (attempts > 0).then(|| wins as f64 / attempts as f64),
        average_moves: mean(&moves),
        median_moves: median(&moves),
        average_duration_ms: mean(&durations),
        longest_win_streak: longest_win,
        longest_loss_streak: longest_loss,
        current_streak: current.map(|(result, length)| CurrentStreak {
            result: result.to_string(),
            length,
        }),
    }
}

/// Prints [`AttemptStats`] for `input` as pretty JSON.
///
/// Unparseable lines are skipped with a warning; a file holding nothing but
/// unparseable lines is an error.
pub fn handle_stats_command(
    input: String,
    abandoned_as_loss: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let log = match read_attempt_log(&input) {
        Ok(log) => log,
        Err(e) => {
            ui::write_error(err, &e.to_string())?;
            return Err(e);
        }
    };

    if !log.corrupted.is_empty() {
        ui::display_warning(
            err,
            &format!("Skipped {} corrupted record(s)", log.corrupted.len()),
        )?;
    }
    if log.truncated_tail {
        ui::display_warning(err, "Discarded incomplete final line")?;
    }
    if log.rows.is_empty() && (!log.corrupted.is_empty() || log.truncated_tail) {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }

    let stats = summarise(&log.rows, abandoned_as_loss);
    let json_output = serde_json::to_string_pretty(&stats)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_jsonl;

    fn rows(results: &[&str]) -> Vec<AttemptRow> {
        let text: String = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "{{\"tag\":\"t{}\",\"result\":\"{}\",\"timestamp_utc\":\"2025-01-01T00:00:0{}Z\",\"moves\":{}}}\n",
                    i, r, i, (i + 1) * 10
                )
            })
            .collect();
        parse_jsonl(&text).rows
    }

    #[test]
    fn streaks_follow_file_order() {
        let stats = summarise(&rows(&["win", "win", "loss", "win", "win", "win"]), false);
        assert_eq!(stats.longest_win_streak, 3);
        assert_eq!(stats.longest_loss_streak, 1);
        assert_eq!(
            stats.current_streak,
            Some(CurrentStreak {
                result: "win".into(),
                length: 3
            })
        );
    }

    #[test]
    fn abandoned_breaks_or_extends_loss_streaks() {
        let data = rows(&["loss", "abandoned", "loss"]);
        let plain = summarise(&data, false);
        assert_eq!(plain.longest_loss_streak, 1);
        let folded = summarise(&data, true);
        assert_eq!(folded.longest_loss_streak, 3);
        assert_eq!(folded.results["abandoned"], 1);
    }

    #[test]
    fn trailing_unknown_clears_current_streak() {
        let stats = summarise(&rows(&["win", "unknown"]), false);
        assert_eq!(stats.current_streak, None);
        assert_eq!(stats.win_rate, Some(0.5));
    }

    #[test]
    fn moves_mean_and_median() {
        let stats = summarise(&rows(&["win", "loss", "loss", "loss"]), false);
        assert_eq!(stats.average_moves, Some(25.0));
        assert_eq!(stats.median_moves, Some(25.0));
        assert_eq!(stats.average_duration_ms, None);
    }

    #[test]
    fn empty_log_has_no_rate() {
        let stats = summarise(&[], false);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.win_rate, None);
    }

    #[test]
    fn garbage_only_file_is_an_error() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp, b"not json\n").unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let res = handle_stats_command(
            temp.path().to_string_lossy().into_owned(),
            false,
            &mut out,
            &mut err,
        );
        assert!(res.is_err());
        assert!(String::from_utf8(err).unwrap().contains("corrupted"));
    }
}
