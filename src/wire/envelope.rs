//! Service envelope: a numbered, named wrapper around row or table payloads
//!
//! The envelope flattens to `[service_num, service, body_tag, body...]` and
//! rides the same item stream as everything else. Numbering comes from a
//! [`ServiceSequence`] owned by the embedder and passed in at construction,
//! so the process-wide counter is explicit state rather than a hidden
//! static.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{Row, Table};

use super::codec::{decode_row, encode_row};
use super::table::{flatten, unflatten};

const BODY_ROW: i32 = 0;
const BODY_TABLE: i32 = 1;

/// Monotonic request-number generator shared by everything that builds
/// envelopes for one connection or process.
#[derive(Debug, Default)]
pub struct ServiceSequence(AtomicU64);

impl ServiceSequence {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self(AtomicU64::new(first))
    }

    /// Claim the next service number.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Payload carried by an [`Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Row(Row),
    Table(Table),
}

/// A numbered service message wrapping a row or table.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    service_num: u64,
    service: String,
    body: Body,
}

impl Envelope {
    /// Build an envelope, claiming its number from `seq`.
    pub fn new(seq: &ServiceSequence, service: impl Into<String>, body: Body) -> Self {
        Self {
            service_num: seq.next(),
            service: service.into(),
            body,
        }
    }

    fn from_parts(service_num: u64, service: String, body: Body) -> Self {
        Self {
            service_num,
            service,
            body,
        }
    }

    pub fn service_num(&self) -> u64 {
        self.service_num
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

/// Serialize an envelope into one item stream.
pub fn encode_envelope(envelope: &Envelope) -> Vec<u8> {
    let mut flat = Row::new();
    flat.push(envelope.service_num as i64);
    flat.push(envelope.service.as_str());
    match &envelope.body {
        Body::Row(row) => {
            flat.push(BODY_ROW);
            for cell in row.iter() {
                flat.push(cell.clone());
            }
        }
        Body::Table(table) => {
            flat.push(BODY_TABLE);
            for cell in flatten(table).iter() {
                flat.push(cell.clone());
            }
        }
    }
    encode_row(&flat)
}

/// Parse an item stream produced by [`encode_envelope`]. The fixed prefix
/// peels off the front; everything after the body tag is the body. Corrupt
/// input degrades to a zero-numbered envelope with an empty row body.
pub fn decode_envelope(buf: &[u8]) -> Envelope {
    let flat = decode_row(buf);
    let service_num = flat.get(0).as_long().max(0) as u64;
    let service = flat.get(1).as_string();
    let tag = flat.get(2).as_int();
    let rest: Row = flat
        .cells()
        .get(3..)
        .unwrap_or(&[])
        .iter()
        .cloned()
        .collect();
    let body = match tag {
        BODY_TABLE => Body::Table(unflatten(&rest)),
        _ => Body::Row(rest),
    };
    Envelope::from_parts(service_num, service, body)
}
