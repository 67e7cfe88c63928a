//! Engine configuration.
//!
//! The engine takes no opinion on where configuration comes from — parsing
//! env vars, TOML, or CLI flags is process bootstrap and stays outside this
//! crate. `Config` is just the plain struct an embedder fills in and hands
//! to [`crate::Engine::open`].

use std::path::{Path, PathBuf};

/// Fixed page size for [`crate::Engine::page`]; not configurable, per the
/// operation contract.
pub const PAGE_SIZE: usize = 20;

/// Number of synthetic records [`crate::Engine::open`] seeds a brand-new
/// store with, by default.
pub const DEFAULT_SEED_COUNT: usize = 0;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the append-only log file.
    pub log_path: PathBuf,
    /// Path to the sidecar index snapshot.
    pub snapshot_path: PathBuf,
    /// Number of synthetic records to seed when both files are absent.
    pub seed_count: usize,
}

impl Config {
    /// A config rooted at `dir`, using the reference file names
    /// `records.jsonl` and `records.idx`.
    pub fn new(dir: impl AsRef<Path>) -> Config {
        let dir = dir.as_ref();
        Config {
            log_path: dir.join("records.jsonl"),
            snapshot_path: dir.join("records.idx"),
            seed_count: DEFAULT_SEED_COUNT,
        }
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Config {
        self.log_path = path.into();
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Config {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_seed_count(mut self, seed_count: usize) -> Config {
        self.seed_count = seed_count;
        self
    }
}
