//! The sidecar snapshot file: a JSON array of `{key, offset}`, sorted
//! ascending by key, reflecting the index as of the last completed
//! mutation.
//!
//! Written whole on every mutation, via a temp-file-then-rename so a crash
//! mid-write leaves either the old snapshot or the new one, never a
//! half-written one — partial snapshots are not tolerated on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Serialize, Deserialize)]
struct Entry {
    key: String,
    offset: u64,
}

pub(crate) fn save(path: &Path, pairs: &[(String, u64)]) -> Result<()> {
    let entries: Vec<Entry> = pairs
        .iter()
        .map(|(key, offset)| Entry {
            key: key.clone(),
            offset: *offset,
        })
        .collect();
    let json = serde_json::to_vec(&entries).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Loads and validates the snapshot: must parse, and must be sorted
/// ascending with no duplicate keys. Any violation is `CorruptSnapshot`,
/// which the caller (engine startup) treats as "fall back to rebuild."
pub(crate) fn load(path: &Path) -> Result<Vec<(String, u64)>> {
    let data = fs::read(path)?;
    let entries: Vec<Entry> =
        serde_json::from_slice(&data).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;

    for pair in entries.windows(2) {
        if pair[0].key >= pair[1].key {
            return Err(Error::CorruptSnapshot(format!(
                "entries not strictly ascending at {:?} -> {:?}",
                pair[0].key, pair[1].key
            )));
        }
    }

    Ok(entries.into_iter().map(|e| (e.key, e.offset)).collect())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod snapshot_test;
