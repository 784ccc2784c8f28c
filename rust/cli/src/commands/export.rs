//! Attempt log export.
//!
//! Converts a JSONL (or `.zst`, or CSV) attempt log to a CSV file, a pretty
//! JSON array, or an SQLite database with one `attempts` table. Any line that
//! does not parse aborts the export.

use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::records::{AttemptLog, AttemptRow, read_attempt_log};
use crate::ui;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Column order of CSV exports; matches the fields of an engine attempt record.
pub const CSV_COLUMNS: [&str; 10] = [
    "tag",
    "seed",
    "result",
    "timestamp_utc",
    "moves",
    "duration_ms",
    "draw",
    "passes_used",
    "foundations",
    "notes",
];

pub fn handle_export_command(
    input: String,
    output: String,
    format: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let format = format.to_ascii_lowercase();
    if !matches!(format.as_str(), "csv" | "json" | "sqlite") {
        let msg = format!("Unsupported format: {} (expected csv, json or sqlite)", format);
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    let log = match read_attempt_log(&input) {
        Ok(log) => log,
        Err(e) => {
            ui::write_error(err, &e.to_string())?;
            return Err(e);
        }
    };
    if let Some(msg) = invalid_lines(&log) {
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    ensure_parent_dir(Path::new(&output)).map_err(|e| {
        let _ = ui::write_error(err, &e);
        CliError::Config(e)
    })?;

    match format.as_str() {
        "csv" => export_csv(&log.rows, &output, err)?,
        "json" => export_json(&log.rows, &output, err)?,
        _ => export_sqlite(&log.rows, &output, err)?,
    }
    writeln!(
        out,
        "Exported {} record(s) to {} ({})",
        log.rows.len(),
        output,
        format
    )?;
    Ok(())
}

fn invalid_lines(log: &AttemptLog) -> Option<String> {
    if let Some(line) = log.corrupted.first() {
        return Some(format!("Invalid record at line {}", line));
    }
    log.truncated_tail
        .then(|| "Invalid record: incomplete final line".to_string())
}

fn cell(row: &AttemptRow, column: &str) -> String {
    match row.raw.iter().find(|(k, _)| k.eq_ignore_ascii_case(column)) {
        Some((_, Value::String(s))) => s.clone(),
        Some((_, Value::Null)) | None => String::new(),
        Some((_, v)) => v.to_string(),
    }
}

fn export_csv(rows: &[AttemptRow], output: &str, err: &mut dyn Write) -> Result<(), CliError> {
    let write_all = || -> Result<(), csv::Error> {
        let mut w = csv::Writer::from_path(output)?;
        w.write_record(CSV_COLUMNS)?;
        for row in rows {
            w.write_record(CSV_COLUMNS.iter().map(|c| cell(row, c)))?;
        }
        w.flush()?;
        Ok(())
    };
    write_all().map_err(|e| {
        let msg = format!("Failed to write {}: {}", output, e);
        let _ = ui::write_error(err, &msg);
        CliError::Config(msg)
    })
}

fn export_json(rows: &[AttemptRow], output: &str, err: &mut dyn Write) -> Result<(), CliError> {
    let arr: Vec<Value> = rows.iter().map(|r| Value::Object(r.raw.clone())).collect();
    let s = serde_json::to_string_pretty(&arr).map_err(|e| {
        let _ = ui::write_error(err, &format!("Failed to serialize JSON: {}", e));
        CliError::InvalidInput(format!("Failed to serialize JSON: {}", e))
    })?;
    std::fs::write(output, s).map_err(|e| {
        let _ = ui::write_error(err, &format!("Failed to write {}: {}", output, e));
        CliError::Io(e)
    })?;
    Ok(())
}

enum ExportAttemptError {
    Busy(String),
    Fatal(String),
}

fn sqlite_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(info, _)
            if matches!(
                info.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    )
}

fn classify(context: &str) -> impl Fn(rusqlite::Error) -> ExportAttemptError + '_ {
    move |e| {
        if sqlite_busy(&e) {
            ExportAttemptError::Busy(format!("{}: {}", context, e))
        } else {
            ExportAttemptError::Fatal(format!("Failed to {}: {}", context, e))
        }
    }
}

fn export_sqlite_attempt(rows: &[AttemptRow], output: &str) -> Result<(), ExportAttemptError> {
    let mut conn = rusqlite::Connection::open(output).map_err(classify("open database"))?;
    let tx = conn
        .transaction()
        .map_err(classify("start transaction"))?;
    tx.execute("DROP TABLE IF EXISTS attempts", [])
        .map_err(classify("reset schema"))?;
    tx.execute(
        "CREATE TABLE attempts (
            line INTEGER NOT NULL,
            tag TEXT NOT NULL,
            seed INTEGER,
            result TEXT NOT NULL,
            timestamp_utc TEXT NOT NULL,
            moves INTEGER,
            duration_ms INTEGER,
            raw_json TEXT NOT NULL
        )",
        [],
    )
    .map_err(classify("create schema"))?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO attempts (line, tag, seed, result, timestamp_utc, moves, duration_ms, raw_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(classify("prepare insert"))?;
        for row in rows {
            let seed = row.seed.as_deref().and_then(|s| s.parse::<i64>().ok());
            let moves = row.moves.and_then(|v| i64::try_from(v).ok());
            let duration = row.duration_ms.and_then(|v| i64::try_from(v).ok());
            let raw = Value::Object(row.raw.clone()).to_string();
            stmt.execute(rusqlite::params![
                row.line as i64,
                &row.tag,
                seed,
                &row.result,
                &row.timestamp_utc,
                moves,
                duration,
                raw
            ])
            .map_err(classify("insert record"))?;
        }
    }

    tx.commit().map_err(classify("commit export"))?;
    Ok(())
}

/// Retries while the database is busy or locked, sleeping
/// `KLONDIKE_SQLITE_BACKOFF_MS * attempt` between tries, up to
/// `KLONDIKE_SQLITE_MAX_ATTEMPTS` tries.
fn export_sqlite(rows: &[AttemptRow], output: &str, err: &mut dyn Write) -> Result<(), CliError> {
    let backoff_ms: u64 = std::env::var("KLONDIKE_SQLITE_BACKOFF_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let max_attempts: u32 = std::env::var("KLONDIKE_SQLITE_MAX_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);

    if max_attempts == 0 {
        ui::write_error(err, "KLONDIKE_SQLITE_MAX_ATTEMPTS must be >= 1 (got 0)")?;
        return Err(CliError::Config(
            "KLONDIKE_SQLITE_MAX_ATTEMPTS must be >= 1".to_string(),
        ));
    }

    let mut attempt = 1;
    loop {
        match export_sqlite_attempt(rows, output) {
            Ok(()) => return Ok(()),
            Err(ExportAttemptError::Busy(msg)) if attempt >= max_attempts => {
                let msg = format!("SQLite busy after {} attempt(s): {}", attempt, msg);
                ui::write_error(err, &msg)?;
                return Err(CliError::Config(msg));
            }
            Err(ExportAttemptError::Busy(_)) => {
                std::thread::sleep(std::time::Duration::from_millis(
                    backoff_ms * u64::from(attempt),
                ));
                attempt += 1;
            }
            Err(ExportAttemptError::Fatal(msg)) => {
                ui::write_error(err, &msg)?;
                return Err(CliError::Config(msg));
            }
        }
    }
}
