//! Append-only framed log store.
//!
//! Every record occupies a *frame*: a 4-byte big-endian length `L`
//! followed by exactly `L` bytes of payload (the payload is expected to
//! end in a newline, but the log store itself does not care). A frame's
//! *anchor offset* is the offset of its length prefix, and is the value
//! callers hand back to [`Log::read_frame`].
//!
//! A single append-mode writer is held for the life of the log; reads open
//! a fresh read-only file descriptor each time.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const LEN_PREFIX_SIZE: u64 = 4;

/// An append-only log of length-prefixed frames.
pub struct Log {
    path: PathBuf,
    writer: File,
}

impl Log {
    /// Opens (creating if absent) the log file at `path` for append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Log> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Log { path, writer })
    }

    /// Appends `payload` as a single frame and returns its anchor offset.
    ///
    /// Durability: the write is `fsync`'d before this returns, matching the
    /// engine's assumption that an append is persisted before the
    /// enclosing operation completes.
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        let anchor = self.writer.seek(SeekFrom::End(0))?;
        let len: u32 = payload
            .len()
            .try_into()
            .map_err(|_| Error::CorruptFrame {
                offset: anchor,
                reason: "payload exceeds u32::MAX bytes".to_string(),
            })?;
        self.writer.write_all(&len.to_be_bytes())?;
        self.writer.write_all(payload)?;
        self.writer.sync_all()?;
        Ok(anchor)
    }

    /// Current end-of-file offset; the anchor the next append will land at.
    pub fn size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    /// Reads the frame anchored at `anchor`, returning its payload bytes.
    ///
    /// Opens a fresh read-only descriptor per read, closed at the end of
    /// the call.
    pub fn read_frame(&self, anchor: u64) -> Result<Vec<u8>> {
        let mut reader = File::open(&self.path)?;
        read_frame_at(&mut reader, anchor)
    }

    /// Scans the log from the start, tolerating a truncated tail frame.
    ///
    /// Returns the anchor offset and payload bytes of every complete frame
    /// encountered before the first unreadable one. Used only by rebuild —
    /// [`Log::read_frame`] itself fails hard on a short read.
    pub fn scan(&self) -> Result<Vec<(u64, Vec<u8>)>> {
        let mut reader = File::open(&self.path)?;
        let len = self.size()?;
        let mut out = Vec::new();
        let mut pos = 0u64;
        while pos < len {
            match read_frame_at(&mut reader, pos) {
                Ok(payload) => {
                    let frame_len = LEN_PREFIX_SIZE + payload.len() as u64;
                    out.push((pos, payload));
                    pos += frame_len;
                }
                Err(_) => break,
            }
        }
        Ok(out)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_frame_at(reader: &mut File, anchor: u64) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(anchor))?;

    let mut len_buf = [0u8; LEN_PREFIX_SIZE as usize];
    reader.read_exact(&mut len_buf).map_err(|_| Error::CorruptFrame {
        offset: anchor,
        reason: "length prefix truncated".to_string(),
    })?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        return Err(Error::CorruptFrame {
            offset: anchor,
            reason: "zero-length frame".to_string(),
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).map_err(|_| Error::CorruptFrame {
        offset: anchor,
        reason: format!("payload truncated, expected {len} bytes"),
    })?;
    Ok(payload)
}

#[cfg(test)]
mod log_test;
