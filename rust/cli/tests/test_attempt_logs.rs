//! `stats`, `verify` and `export` over attempt logs, including logs produced
//! by `sim`.

mod helpers;

use helpers::{path_str, run_cli, write_file};

const MIXED: &str = concat!(
    "{\"tag\":\"h1\",\"seed\":1,\"result\":\"win\",\"timestamp_utc\":\"2025-03-01T10:00:00Z\",\"moves\":110,\"duration_ms\":900}\n",
    "{\"tag\":\"h2\",\"seed\":2,\"result\":\"loss\",\"timestamp_utc\":\"2025-03-01T10:05:00Z\",\"moves\":60,\"duration_ms\":400}\n",
    "{\"tag\":\"h3\",\"seed\":3,\"result\":\"abandoned\",\"timestamp_utc\":\"2025-03-01T10:09:00Z\",\"moves\":12,\"duration_ms\":100}\n",
    "{\"tag\":\"h4\",\"seed\":4,\"result\":\"loss\",\"timestamp_utc\":\"2025-03-01T10:12:00Z\",\"moves\":30,\"duration_ms\":200}\n",
);

fn stats_json(args: &[&str]) -> serde_json::Value {
    let res = run_cli(args);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    serde_json::from_str(&res.stdout).expect("stats prints JSON")
}

#[test]
fn stats_summarises_results_and_streaks() {
    let dir = tempfile::tempdir().unwrap();
    let input = path_str(&write_file(dir.path(), "a.jsonl", MIXED));

    let plain = stats_json(&["stats", "--input", &input]);
    assert_eq!(plain["attempts"], 4);
    assert_eq!(plain["results"]["loss"], 2);
    assert_eq!(plain["win_rate"], 0.25);
    assert_eq!(plain["median_moves"], 45.0);
    assert_eq!(plain["longest_loss_streak"], 1);

    let folded = stats_json(&["stats", "--input", &input, "--abandoned-as-loss"]);
    assert_eq!(folded["longest_loss_streak"], 3);
    assert_eq!(folded["win_rate"], 0.25);
    assert_eq!(folded["current_streak"]["result"], "loss");
}

#[test]
fn stats_reads_csv_and_skips_corrupt_lines() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "a.csv",
        "tag,seed,result,timestamp_utc,moves\nx,1,WIN,2025-01-01T00:00:00Z,90\ny,2,loss,2025-01-01T00:01:00Z,\n",
    );
    let json = stats_json(&["stats", "--input", &path_str(&csv)]);
    assert_eq!(json["results"]["win"], 1);
    assert_eq!(json["average_moves"], 90.0);

    let jsonl = write_file(dir.path(), "b.jsonl", &format!("{}garbage\n", MIXED));
    let res = run_cli(&["stats", "--input", &path_str(&jsonl)]);
    assert_eq!(res.exit_code, 0);
    assert!(res.stderr.contains("Skipped 1 corrupted record(s)"));
}

#[test]
fn stats_missing_file_is_an_error() {
    let res = run_cli(&["stats", "--input", "/nonexistent/attempts.jsonl"]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Failed to read"));
}

#[test]
fn verify_accepts_clean_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = path_str(&write_file(dir.path(), "a.jsonl", MIXED));
    let res = run_cli(&["verify", "--input", &input]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert_eq!(
        res.stdout.trim_end(),
        format!("{}: ok (4 rows) abandoned=1 loss=2 win=1", input)
    );
}

#[test]
fn verify_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!(
        "{}{}{}",
        MIXED,
        "{\"tag\":\"h1\",\"seed\":1,\"result\":\"win\",\"timestamp_utc\":\"2025-03-01T10:00:00Z\",\"moves\":110,\"duration_ms\":900}\n",
        "{\"tag\":\"\",\"seed\":9,\"result\":\"draw\",\"timestamp_utc\":\"2025-03-02T00:00:00Z\"}\n",
    );
    let input = path_str(&write_file(dir.path(), "bad.jsonl", &content));
    let res = run_cli(&["verify", "--input", &input]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stdout.starts_with(&format!("{}: failed (6 rows)", input)));
    assert!(res.stderr.contains("line 5: duplicate of line 1"));
    assert!(res.stderr.contains("line 6: missing tag"));
    assert!(res.stderr.contains("line 6: unexpected result 'draw'"));
}

#[test]
fn sim_output_passes_verify_and_feeds_stats() {
    let dir = tempfile::tempdir().unwrap();
    let log = path_str(&dir.path().join("sim.jsonl"));
    let res = run_cli(&["sim", "--games", "3", "--seed", "40", "--output", &log]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);

    let verify = run_cli(&["verify", "--input", &log]);
    assert!(verify.stdout.contains("(3 rows)"), "{}", verify.stdout);
    assert!(!verify.stderr.contains("Error"), "{}", verify.stderr);

    let stats = stats_json(&["stats", "--input", &log]);
    assert_eq!(stats["attempts"], 3);
}

#[test]
fn export_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = path_str(&write_file(dir.path(), "a.jsonl", MIXED));
    let csv = path_str(&dir.path().join("nested").join("a.csv"));
    let res = run_cli(&[
        "export", "--input", &input, "--format", "csv", "--output", &csv,
    ]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("Exported 4 record(s)"));

    let from_csv = stats_json(&["stats", "--input", &csv]);
    let from_jsonl = stats_json(&["stats", "--input", &input]);
    assert_eq!(from_csv, from_jsonl);
}

#[test]
fn export_sqlite_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = path_str(&write_file(dir.path(), "a.jsonl", MIXED));

    let db = dir.path().join("a.sqlite");
    let res = run_cli(&[
        "export", "--input", &input, "--format", "sqlite", "--output", &path_str(&db),
    ]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let conn = rusqlite::Connection::open(&db).unwrap();
    let total: i64 = conn
        .query_row("SELECT SUM(moves) FROM attempts", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, 212);

    let json = dir.path().join("a.json");
    let res = run_cli(&[
        "export", "--input", &input, "--format", "json", "--output", &path_str(&json),
    ]);
    assert_eq!(res.exit_code, 0);
    let arr: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(arr[2]["result"], "abandoned");
}

#[test]
fn export_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = path_str(&write_file(dir.path(), "a.jsonl", MIXED));
    let res = run_cli(&[
        "export", "--input", &input, "--format", "parquet", "--output", "x.parquet",
    ]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("Unsupported format: parquet"));
}
