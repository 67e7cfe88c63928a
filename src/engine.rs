//! Composes the log store and the order-statistic index into the four
//! user-facing operations, plus the startup protocol that picks between
//! seeding, rehydrating from a snapshot, and rebuilding from the log.

use std::path::Path;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::config::{Config, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::log::Log;
use crate::record::{self, Record};
use crate::snapshot;

/// The result of any engine operation: the value plus how long the
/// operation took, measured from just before its first side effect to
/// just after its last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub elapsed_ms: f64,
}

/// A page of records in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub page: usize,
}

pub struct Engine {
    log: Log,
    index: Index<String>,
    config: Config,
    next_id: u64,
}

impl Engine {
    /// Runs the startup protocol against `config`'s files and returns a
    /// ready-to-serve engine.
    ///
    /// | log | snapshot | action |
    /// |---|---|---|
    /// | absent | — | create log, optionally seed, persist snapshot |
    /// | present | present | bulk-load from snapshot |
    /// | present | absent/corrupt | rebuild from log, persist snapshot |
    pub fn open(config: Config) -> Result<Engine> {
        let log_existed = config.log_path.exists();
        let snapshot_existed = config.snapshot_path.exists();

        let mut log = Log::open(&config.log_path)?;
        let mut index: Index<String> = Index::new();

        if !log_existed {
            tracing::info!(path = %config.log_path.display(), "no log found, starting fresh");
            if config.seed_count > 0 {
                seed(&mut log, &mut index, config.seed_count)?;
            }
            snapshot::save(&config.snapshot_path, &in_order_pairs(&index))?;
        } else if snapshot_existed {
            match snapshot::load(&config.snapshot_path) {
                Ok(pairs) => {
                    tracing::info!(entries = pairs.len(), "rehydrating index from snapshot");
                    index.bulk_load(pairs);
                }
                Err(err) => {
                    tracing::warn!(%err, "snapshot unreadable, rebuilding from log");
                    rebuild(&log, &mut index)?;
                    snapshot::save(&config.snapshot_path, &in_order_pairs(&index))?;
                }
            }
        } else {
            tracing::info!("log present without a snapshot, rebuilding index");
            rebuild(&log, &mut index)?;
            snapshot::save(&config.snapshot_path, &in_order_pairs(&index))?;
        }

        let next_id = next_id_after(&index);
        Ok(Engine {
            log,
            index,
            config,
            next_id,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Number of live keys currently in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Point lookup by key.
    pub fn get(&self, key: &str) -> Result<Outcome<Record>> {
        let start = Instant::now();
        let offset = self
            .index
            .lookup(&key.to_string())
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        let payload = self.log.read_frame(offset)?;
        let body = parse_payload(offset, &payload)?;
        Ok(Outcome {
            value: Record { body },
            elapsed_ms: elapsed_ms(start),
        })
    }

    /// Ordered pagination, 20 records per page, 1-based. A non-positive
    /// page number is coerced to page 1; a page past the end is an empty
    /// list, not an error.
    pub fn page(&self, n: i64) -> Result<Outcome<Page>> {
        let start = Instant::now();
        let page_no = if n < 1 { 1usize } else { n as usize };
        let offset = (page_no - 1) * PAGE_SIZE;

        let mut records = Vec::new();
        for (_, anchor) in self.index.range(offset, PAGE_SIZE) {
            let payload = self.log.read_frame(anchor)?;
            records.push(Record {
                body: parse_payload(anchor, &payload)?,
            });
        }

        Ok(Outcome {
            value: Page {
                records,
                page: page_no,
            },
            elapsed_ms: elapsed_ms(start),
        })
    }

    /// Appends a new record with caller-supplied `fields` under a freshly
    /// minted key. Side effects happen in order: log append, then index
    /// insert, then snapshot replace — a reader starting after this
    /// returns sees the new record; one starting before does not.
    pub fn insert(&mut self, fields: Map<String, Value>) -> Result<Outcome<Record>> {
        if fields.is_empty() {
            return Err(Error::MalformedInput(
                "insert requires at least one field".to_string(),
            ));
        }

        let start = Instant::now();
        let key = self.mint_key();
        let body = record::build_body(&key, &fields);
        let frame = record::frame_bytes(&body);

        let anchor = self.log.append(&frame)?;
        let added = self.index.insert(key.clone(), anchor);
        debug_assert!(added, "a freshly minted key cannot already be indexed");
        snapshot::save(&self.config.snapshot_path, &in_order_pairs(&self.index))?;

        tracing::debug!(key = %key, offset = anchor, "inserted record");
        Ok(Outcome {
            value: Record { body },
            elapsed_ms: elapsed_ms(start),
        })
    }

    /// Removes the index entry for `key`. The log itself is not modified
    /// — deleted frames remain on disk until a future compaction pass.
    pub fn delete(&mut self, key: &str) -> Result<Outcome<()>> {
        let start = Instant::now();
        if !self.index.delete(&key.to_string()) {
            return Err(Error::NotFound(key.to_string()));
        }
        snapshot::save(&self.config.snapshot_path, &in_order_pairs(&self.index))?;
        tracing::debug!(key = %key, "deleted record");
        Ok(Outcome {
            value: (),
            elapsed_ms: elapsed_ms(start),
        })
    }

    fn mint_key(&mut self) -> String {
        let key = format!("{:010}", self.next_id);
        self.next_id += 1;
        key
    }
}

fn parse_payload(offset: u64, payload: &[u8]) -> Result<Value> {
    serde_json::from_slice(payload).map_err(|e| Error::CorruptFrame {
        offset,
        reason: e.to_string(),
    })
}

fn in_order_pairs(index: &Index<String>) -> Vec<(String, u64)> {
    index.in_order().map(|(k, o)| (k.clone(), o)).collect()
}

/// The numeric tail of the highest minted key seen, plus one. Survives
/// deletions (a deleted key's number is never reused) and rebuild (which
/// only ever reconstructs live keys).
fn next_id_after(index: &Index<String>) -> u64 {
    index
        .in_order()
        .filter_map(|(k, _)| k.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

/// Scans the log end to end, indexing every frame whose payload yields an
/// extractable key at its frame anchor offset — not the JSON line's own
/// start, so a get issued after a rebuild reads the same bytes a get
/// issued after the original insert would have.
fn rebuild(log: &Log, index: &mut Index<String>) -> Result<()> {
    let frames = log.scan()?;
    let mut indexed = 0usize;
    for (anchor, payload) in frames {
        match record::extract_key(&payload) {
            Some(key) => {
                index.insert(key, anchor);
                indexed += 1;
            }
            None => tracing::warn!(offset = anchor, "frame has no extractable id, skipping"),
        }
    }
    tracing::info!(indexed, "rebuilt index from log");
    Ok(())
}

fn seed(log: &mut Log, index: &mut Index<String>, n: usize) -> Result<()> {
    for i in 0..n {
        let key = format!("{:010}", i);
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(format!("seed-user-{i}")));
        fields.insert(
            "email".to_string(),
            Value::String(format!("seed-{i}@example.com")),
        );
        let body = record::build_body(&key, &fields);
        let frame = record::frame_bytes(&body);
        let anchor = log.append(&frame)?;
        index.insert(key, anchor);
    }
    tracing::info!(count = n, "seeded synthetic records");
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod engine_test;
