use std::fmt;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::events::GameEvent;

/// How a play attempt ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptResult {
    Win,
    Loss,
    Abandoned,
    Unknown,
}

impl AttemptResult {
    pub const ALL: [AttemptResult; 4] = [
        AttemptResult::Win,
        AttemptResult::Loss,
        AttemptResult::Abandoned,
        AttemptResult::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttemptResult::Win => "win",
            AttemptResult::Loss => "loss",
            AttemptResult::Abandoned => "abandoned",
            AttemptResult::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(AttemptResult::Win),
            "loss" => Ok(AttemptResult::Loss),
            "abandoned" => Ok(AttemptResult::Abandoned),
            "unknown" => Ok(AttemptResult::Unknown),
            other => Err(format!("unknown attempt result '{}'", other)),
        }
    }
}

/// One play attempt, serialised as a single JSONL line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Hand tag of the deal
    pub tag: String,
    #[serde(default)]
    pub seed: Option<u32>,
    pub result: AttemptResult,
    /// RFC3339 UTC, filled in by the logger when missing
    #[serde(default)]
    pub timestamp_utc: Option<String>,
    #[serde(default)]
    pub moves: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub draw: Option<u8>,
    #[serde(default)]
    pub passes_used: Option<u32>,
    /// Cards on the foundations at the end
    #[serde(default)]
    pub foundations: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttemptRecord {
    pub fn new(tag: impl Into<String>, result: AttemptResult) -> Self {
        Self {
            tag: tag.into(),
            seed: None,
            result,
            timestamp_utc: None,
            moves: None,
            duration_ms: None,
            draw: None,
            passes_used: None,
            foundations: None,
            notes: None,
        }
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Appends attempt records to a JSONL file, one object per LF-terminated line.
pub struct AttemptLogger {
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl AttemptLogger {
    /// Truncates `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        ensure_parent(path.as_ref())?;
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            written: 0,
        })
    }

    /// Keeps existing lines and writes after them.
    pub fn append<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        ensure_parent(path.as_ref())?;
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            written: 0,
        })
    }

    /// A logger that serialises but discards, for dry runs.
    pub fn sink() -> Self {
        Self {
            writer: None,
            written: 0,
        }
    }

    pub fn write(&mut self, record: &AttemptRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.timestamp_utc.is_none() {
            rec.timestamp_utc = Some(now_rfc3339());
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Builds an [`AttemptRecord`] from the event stream of a game without
/// touching the game itself.
pub struct AttemptRecorder {
    events: Receiver<GameEvent>,
    started: Option<Instant>,
    seed: Option<u32>,
    draw: Option<u8>,
    tag: Option<String>,
    moves: u32,
    passes_used: u32,
    foundations: u32,
    won: bool,
}

impl AttemptRecorder {
    pub fn new(events: Receiver<GameEvent>) -> Self {
        Self {
            events,
            started: None,
            seed: None,
            draw: None,
            tag: None,
            moves: 0,
            passes_used: 0,
            foundations: 0,
            won: false,
        }
    }

    /// Consumes every event received so far.
    pub fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.observe(event);
        }
    }

    fn observe(&mut self, event: GameEvent) {
        match event {
            GameEvent::DealStarted { seed, draw } => {
                self.started = Some(Instant::now());
                self.seed = Some(seed);
                self.draw = Some(draw);
                self.tag = None;
                self.moves = 0;
                self.passes_used = 0;
                self.foundations = 0;
                self.won = false;
            }
            GameEvent::MoveApplied { from, to, moves, .. } => {
                self.moves = moves;
                if to.is_foundation() {
                    self.foundations += 1;
                }
                if from.is_foundation() {
                    self.foundations = self.foundations.saturating_sub(1);
                }
            }
            GameEvent::StockDrawn { moves, .. } => self.moves = moves,
            GameEvent::StockRecycled {
                moves, passes_used, ..
            } => {
                self.moves = moves;
                self.passes_used = passes_used;
            }
            GameEvent::Won {
                moves, passes_used, ..
            } => {
                self.moves = moves;
                self.passes_used = passes_used;
                self.won = true;
            }
            GameEvent::TagResolved { seed, tag } => {
                if self.seed == seed {
                    self.tag = Some(tag.to_string());
                }
            }
        }
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Record for the deal seen last. A won deal is always `Win`; otherwise
    /// `otherwise` decides (loss or abandoned). `None` before any deal.
    pub fn finish(&mut self, otherwise: AttemptResult) -> Option<AttemptRecord> {
        self.drain();
        let seed = self.seed?;
        let result = if self.won { AttemptResult::Win } else { otherwise };
        let mut rec = AttemptRecord::new(self.tag.clone().unwrap_or_default(), result);
        rec.seed = Some(seed);
        rec.moves = Some(self.moves);
        rec.duration_ms = self
            .started
            .map(|t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX));
        rec.draw = self.draw;
        rec.passes_used = Some(self.passes_used);
        rec.foundations = Some(self.foundations);
        Some(rec)
    }
}
