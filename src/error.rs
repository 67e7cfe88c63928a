//! Crate-wide error type: one enum covering every failure mode of the
//! index/log/snapshot machinery.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Lookup or delete against a key that is not present in the index.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Insert was given a payload missing a required field.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A read/write against the log or snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame's length prefix decoded to zero, or EOF was reached before
    /// the full frame could be read.
    #[error("corrupt frame at offset {offset}: {reason}")]
    CorruptFrame { offset: u64, reason: String },

    /// The snapshot file could not be parsed as a sorted `(key, offset)`
    /// listing.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A positional lookup (`at`/`range`) asked for an index past the end
    /// of the tree.
    #[error("position {index} out of range (size {size})")]
    OutOfRange { index: usize, size: usize },
}
