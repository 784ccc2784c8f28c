//! Shared helpers for the CLI integration tests.
//!
//! `run_cli` drives [`klondike_cli::run`] in-process with buffered streams;
//! `EnvGuard` sets `KLONDIKE_*` variables for one test and restores them on
//! drop. Tests that touch the environment must be `#[serial]`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_cli(args: &[&str]) -> CliResult {
    let mut argv = vec!["klondike"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let exit_code = klondike_cli::run(argv, &mut out, &mut err);
    CliResult {
        exit_code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

/// Value of the first `prefix...` line in `text`.
pub fn field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines().find_map(|l| l.strip_prefix(prefix))
}

pub struct EnvGuard {
    restores: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set(pairs: &[(&str, &str)]) -> Self {
        let mut restores = Vec::new();
        for (key, value) in pairs {
            restores.push((key.to_string(), std::env::var(key).ok()));
            // SAFETY: callers are #[serial], so no other test thread reads the environment.
            unsafe { std::env::set_var(key, value) };
        }
        EnvGuard { restores }
    }

    pub fn clear(keys: &[&str]) -> Self {
        let mut restores = Vec::new();
        for key in keys {
            restores.push((key.to_string(), std::env::var(key).ok()));
            // SAFETY: see `set`.
            unsafe { std::env::remove_var(key) };
        }
        EnvGuard { restores }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.restores.iter().rev() {
            // SAFETY: see `set`.
            unsafe {
                match previous {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

pub const KLONDIKE_ENV: [&str; 6] = [
    "KLONDIKE_CONFIG",
    "KLONDIKE_SEED",
    "KLONDIKE_DRAW",
    "KLONDIKE_PASSES",
    "KLONDIKE_PROFILE",
    "KLONDIKE_LOG_PATH",
];
