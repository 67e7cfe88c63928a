//! The opaque JSON record payload, and the lightweight textual scan used
//! only during rebuild.
//!
//! Everywhere but rebuild, the engine treats a record's bytes as opaque;
//! only [`extract_key`] reaches into them, and it does so with a byte scan
//! rather than a full JSON parse, since a parse-then-discard would cost
//! more than rebuild needs.

use serde_json::{Map, Value};

/// A stored document, parsed as JSON. The primary key lives at `"id"`
/// inside `body` — callers never see a raw key/value pair, only the
/// whole document the engine wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub body: Value,
}

impl Record {
    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }
}

/// Builds the JSON body for a new record: `fields` plus a minted `"id"`.
/// A caller-supplied `id` field is never allowed to shadow the minted key.
pub(crate) fn build_body(key: &str, fields: &Map<String, Value>) -> Value {
    let mut body = Map::with_capacity(fields.len() + 1);
    body.insert("id".to_string(), Value::String(key.to_string()));
    for (k, v) in fields {
        body.entry(k.clone()).or_insert_with(|| v.clone());
    }
    Value::Object(body)
}

/// Serializes `body` to the exact bytes a log frame's payload should
/// carry, including the trailing newline the length prefix counts.
pub(crate) fn frame_bytes(body: &Value) -> Vec<u8> {
    let mut bytes = serde_json::to_vec(body).expect("a JSON object always serializes");
    bytes.push(b'\n');
    bytes
}

/// Textual scan for `"id":"<value>"` inside a raw frame payload. Used only
/// by rebuild; everywhere else the payload is opaque bytes.
pub(crate) fn extract_key(payload: &[u8]) -> Option<String> {
    const NEEDLE: &[u8] = b"\"id\":\"";
    let start = find(payload, NEEDLE)? + NEEDLE.len();
    let end = start + payload[start..].iter().position(|&b| b == b'"')?;
    std::str::from_utf8(&payload[start..end]).ok().map(str::to_string)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod record_test;
