//! Verify command handler module.
//!
//! Checks an attempt log before it is used for statistics:
//!
//! - required columns `tag`, `result`, `timestamp_utc` are present
//! - every row has a tag and a timestamp
//! - results are one of `win`, `loss`, `abandoned`, `unknown`
//! - no two rows share (tag, seed, timestamp)
//! - every line parses
//!
//! Missing recommended columns (`seed`, `moves`, `duration_ms`) and a log in
//! which every row has the same result only produce warnings. Errors are
//! collected as [`BatchValidationError`]s and reported together.

use crate::error::{BatchValidationError, CliError};
use crate::records::{AttemptLog, read_attempt_log};
use crate::ui;
use klondike_engine::logger::AttemptResult;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

type VerifyError = BatchValidationError<String>;

pub const REQUIRED_COLUMNS: [&str; 3] = ["tag", "result", "timestamp_utc"];
pub const RECOMMENDED_COLUMNS: [&str; 3] = ["seed", "moves", "duration_ms"];

#[derive(Debug, Default)]
pub struct Verification {
    pub errors: Vec<VerifyError>,
    pub warnings: Vec<String>,
    pub counts: BTreeMap<String, usize>,
    pub rows: usize,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn file_error(message: String) -> VerifyError {
    VerifyError {
        item_context: "file".to_string(),
        message,
    }
}

fn line_error(line: usize, message: String) -> VerifyError {
    VerifyError {
        item_context: format!("line {}", line),
        message,
    }
}

pub fn verify_log(log: &AttemptLog) -> Verification {
    let mut v = Verification {
        rows: log.rows.len(),
        ..Verification::default()
    };
    for line in &log.corrupted {
        v.errors
            .push(line_error(*line, "not a JSON object".to_string()));
    }
    if log.truncated_tail {
        v.errors.push(file_error("incomplete final line".to_string()));
    }
    if log.rows.is_empty() {
        v.errors.push(file_error("No records found".to_string()));
        return v;
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !log.columns.contains(*c))
        .collect();
    if !missing.is_empty() {
        v.errors.push(file_error(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }
    let missing_recommended: Vec<&str> = RECOMMENDED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !log.columns.contains(*c))
        .collect();
    if !missing_recommended.is_empty() {
        v.warnings.push(format!(
            "Missing recommended columns: {}",
            missing_recommended.join(", ")
        ));
    }

    let mut seen: HashMap<(&str, Option<&str>, &str), usize> = HashMap::new();
    let mut distinct_results = BTreeSet::new();
    for row in &log.rows {
        *v.counts.entry(row.result.clone()).or_insert(0) += 1;
        if row.tag.is_empty() {
            v.errors
                .push(line_error(row.line, "missing tag".to_string()));
        }
        if row.timestamp_utc.is_empty() {
            v.errors
                .push(line_error(row.line, "missing timestamp_utc".to_string()));
        }
        if !row.result.is_empty() {
            distinct_results.insert(row.result.as_str());
            if row.result.parse::<AttemptResult>().is_err() {
                v.errors.push(line_error(
                    row.line,
                    format!("unexpected result '{}'", row.result),
                ));
            }
        }
        let first = match seen.entry(row.identity()) {
            Entry::Occupied(e) => Some(*e.get()),
            Entry::Vacant(e) => {
                e.insert(row.line);
                None
            }
        };
        if let Some(first) = first {
            let (tag, seed, ts) = row.identity();
            v.errors.push(line_error(
                row.line,
                format!(
                    "duplicate of line {} (tag={}, seed={}, timestamp_utc={})",
                    first,
                    tag,
                    seed.unwrap_or("-"),
                    ts
                ),
            ));
        }
    }
    if distinct_results.len() == 1 {
        v.warnings.push(
            "All records share the same result value; outcome coverage may be incomplete"
                .to_string(),
        );
    }
    v
}

/// Prints `<input>: ok|failed (<n> rows) <counts>` followed by warnings and
/// errors. Returns an error, and so a non-zero exit, when any check failed.
pub fn handle_verify_command(
    input: String,
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
    let v = verify_log(&log);

    let counts: Vec<String> = v
        .counts
        .iter()
        .map(|(label, n)| {
            let label = if label.is_empty() { "(none)" } else { label.as_str() };
            format!("{}={}", label, n)
        })
        .collect();
    writeln!(
        out,
        "{}: {} ({} rows) {}",
        input,
        if v.is_ok() { "ok" } else { "failed" },
        v.rows,
        counts.join(" ")
    )?;
    for warning in &v.warnings {
        ui::display_warning(err, warning)?;
    }
    for e in &v.errors {
        ui::write_error(err, &e.to_string())?;
    }

    if v.is_ok() {
        Ok(())
    } else {
        Err(CliError::InvalidInput(format!(
            "Verification failed with {} error(s)",
            v.errors.len()
        )))
    }
}
