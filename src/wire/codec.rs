//! Item-stream codec: rows to self-delimiting bytes and back
//!
//! Each cell becomes one item:
//!
//! ```text
//! type(4B) ',' size_lo(4B) size_hi(4B) ',' payload(escaped) '|'
//! ```
//!
//! Integer fields are raw native-endian 4-byte words; the 8-byte size is
//! split into two halves, least-significant first, and carries the escaped
//! (wire) payload length. The final item of a stream ends `\|` instead of
//! `|`, which is what makes the stream self-delimiting — no external item
//! count exists.
//!
//! Decoding never returns an error: a malformed type or size field, a
//! content-length mismatch, a bad escape, or plain truncation stops the loop
//! and whatever decoded so far is the result.

use rayon::prelude::*;
use tracing::debug;

use crate::model::{Row, Value, ValueType};

use super::escape::{escape, find_terminator, unescape, FIELD_SEP, FINAL_MARK, TERMINATOR};

/// type(4) + ',' + size(8) + ','
const HEADER_LEN: usize = 14;

/// Serialize a row into one item stream. An empty row produces no bytes.
pub fn encode_row(row: &Row) -> Vec<u8> {
    let mut out = Vec::new();
    let last = row.len().saturating_sub(1);
    for (i, cell) in row.iter().enumerate() {
        encode_item(&mut out, cell, i == last);
    }
    out
}

fn encode_item(out: &mut Vec<u8>, cell: &Value, is_final: bool) {
    let payload = escape(cell.bytes());
    let wire_size = payload.len() as u64;
    out.extend_from_slice(&cell.value_type().tag().to_ne_bytes());
    out.push(FIELD_SEP);
    out.extend_from_slice(&((wire_size & 0xFFFF_FFFF) as u32).to_ne_bytes());
    out.extend_from_slice(&((wire_size >> 32) as u32).to_ne_bytes());
    out.push(FIELD_SEP);
    out.extend_from_slice(&payload);
    if is_final {
        out.push(FINAL_MARK);
    }
    out.push(TERMINATOR);
}

/// Parse an item stream back into a row, stopping at the final terminator.
/// On any malformed item the loop stops and the rows accumulated so far are
/// returned — partial results, not an error.
pub fn decode_row(buf: &[u8]) -> Row {
    let mut row = Row::new();
    let mut cursor = 0usize;
    loop {
        let Some(item) = decode_item(buf, cursor) else {
            if cursor < buf.len() {
                debug!(at = cursor, parsed = row.len(), "item stream ended early");
            }
            return row;
        };
        row.push(item.value);
        if item.is_final {
            return row;
        }
        cursor = item.next;
    }
}

struct Item {
    value: Value,
    next: usize,
    is_final: bool,
}

fn decode_item(buf: &[u8], cursor: usize) -> Option<Item> {
    let header = buf.get(cursor..cursor + HEADER_LEN)?;
    if header[4] != FIELD_SEP || header[13] != FIELD_SEP {
        return None;
    }
    let ty = ValueType::from_tag(u32::from_ne_bytes(header[0..4].try_into().ok()?))?;
    let lo = u32::from_ne_bytes(header[5..9].try_into().ok()?);
    let hi = u32::from_ne_bytes(header[9..13].try_into().ok()?);
    let wire_size = (lo as u64) | ((hi as u64) << 32);

    // The escape-aware search only ever runs over payload bytes; header
    // commas sit at fixed offsets and are never scanned for.
    let content_start = cursor + HEADER_LEN;
    let term = find_terminator(buf, content_start)?;
    let content_end = if term.is_final { term.pos - 1 } else { term.pos };
    let content = buf.get(content_start..content_end)?;
    if content.len() as u64 != wire_size {
        return None;
    }
    let payload = unescape(content)?;
    if let Some(width) = ty.width() {
        // zero-length stays legal as the "valid empty" sentinel
        if !payload.is_empty() && payload.len() != width {
            return None;
        }
    }
    Some(Item {
        value: Value::from_raw(ty, payload),
        next: term.pos + 1,
        is_final: term.is_final,
    })
}

/// Encode independent rows in parallel, one frame per row.
pub fn encode_batch(rows: &[Row]) -> Vec<Vec<u8>> {
    rows.par_iter().map(encode_row).collect()
}

/// Decode independent frames in parallel.
pub fn decode_batch<B>(frames: &[B]) -> Vec<Row>
where
    B: AsRef<[u8]> + Sync,
{
    frames.par_iter().map(|f| decode_row(f.as_ref())).collect()
}
