//! Attempt log reading shared by `stats`, `verify` and `export`.
//!
//! Logs are JSONL (optionally `.zst` compressed) as written by the engine's
//! `AttemptLogger`, or CSV with a header row. Rows are normalised loosely so
//! hand-edited datasets can still be checked: blank strings count as missing
//! and negative or non-numeric counters are dropped.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::CliError;
use crate::io_utils::{read_text_auto, strip_utf8_bom};

/// One normalised row of an attempt log.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRow {
    /// 1-based line (JSONL) or data row (CSV) number
    pub line: usize,
    pub tag: String,
    /// Lowercased; empty when missing
    pub result: String,
    pub timestamp_utc: String,
    pub seed: Option<String>,
    pub moves: Option<u64>,
    pub duration_ms: Option<u64>,
    pub notes: Option<String>,
    /// The row as read, with CSV cells converted to JSON strings and numbers
    pub raw: Map<String, Value>,
}

impl AttemptRow {
    /// Key used to detect duplicate rows.
    pub fn identity(&self) -> (&str, Option<&str>, &str) {
        (&self.tag, self.seed.as_deref(), &self.timestamp_utc)
    }
}

#[derive(Debug, Default)]
pub struct AttemptLog {
    pub rows: Vec<AttemptRow>,
    /// Column names of the first row (CSV header or first JSON object keys)
    pub columns: BTreeSet<String>,
    /// Lines that were not a JSON object
    pub corrupted: Vec<usize>,
    /// A final line without newline that failed to parse, i.e. a torn write
    pub truncated_tail: bool,
}

pub fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

pub fn read_attempt_log(path: &str) -> Result<AttemptLog, CliError> {
    if is_csv(path) {
        read_csv(path)
    } else {
        let content = read_text_auto(path)
            .map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", path, e)))?;
        Ok(parse_jsonl(&content))
    }
}

pub fn parse_jsonl(content: &str) -> AttemptLog {
    let mut log = AttemptLog::default();
    let has_trailing_nl = content.ends_with('\n');
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();
    for (pos, (idx, line)) in lines.iter().enumerate() {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => {
                if log.rows.is_empty() {
                    log.columns = map.keys().map(|k| k.to_ascii_lowercase()).collect();
                }
                log.rows.push(normalise(idx + 1, map));
            }
            _ if pos + 1 == lines.len() && !has_trailing_nl => log.truncated_tail = true,
            _ => log.corrupted.push(idx + 1),
        }
    }
    log
}

fn read_csv(path: &str) -> Result<AttemptLog, CliError> {
    let mut content = std::fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", path, e)))?;
    strip_utf8_bom(&mut content);
    parse_csv(&content)
}

pub fn parse_csv(content: &str) -> Result<AttemptLog, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CliError::InvalidInput(format!("Missing header row: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CliError::InvalidInput("Missing header row".into()));
    }

    let mut log = AttemptLog {
        columns: headers.iter().map(|h| h.to_ascii_lowercase()).collect(),
        ..AttemptLog::default()
    };
    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                log.corrupted.push(idx + 1);
                continue;
            }
        };
        let mut map = Map::new();
        for (name, cell) in headers.iter().zip(record.iter()) {
            map.insert(name.clone(), csv_cell(name, cell));
        }
        log.rows.push(normalise(idx + 1, map));
    }
    Ok(log)
}

const NUMERIC_COLUMNS: [&str; 6] = [
    "seed",
    "moves",
    "duration_ms",
    "draw",
    "passes_used",
    "foundations",
];

fn csv_cell(column: &str, cell: &str) -> Value {
    let t = cell.trim();
    if t.is_empty() {
        return Value::Null;
    }
    let numeric = NUMERIC_COLUMNS
        .iter()
        .any(|c| c.eq_ignore_ascii_case(column));
    match t.parse::<i64>() {
        Ok(n) if numeric => Value::from(n),
        _ => Value::String(t.to_string()),
    }
}

fn normalise(line: usize, raw: Map<String, Value>) -> AttemptRow {
    let get = |key: &str| {
        raw.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    };
    AttemptRow {
        line,
        tag: norm_string(get("tag")).unwrap_or_default(),
        result: norm_string(get("result"))
            .map(|r| r.to_ascii_lowercase())
            .unwrap_or_default(),
        timestamp_utc: norm_string(get("timestamp_utc")).unwrap_or_default(),
        seed: norm_string(get("seed")),
        moves: norm_count(get("moves")),
        duration_ms: norm_count(get("duration_ms")),
        notes: norm_string(get("notes")),
        raw,
    }
}

fn norm_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn norm_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
