//! Self-delimiting escaped wire protocol
//!
//! Rows, tables, and service envelopes all serialize to the same item
//! stream: one `type,size,payload` item per cell, `|`-terminated, with the
//! final item ending `\|`. Reserved bytes inside payloads (`%`, `,`, `\`,
//! `|`) are escaped with a leading `%`. Deserialization is total — corrupt
//! or truncated streams return the successfully parsed prefix rather than
//! an error.
//!
//! The protocol performs no I/O and holds no state between calls; frames
//! are independent, which is what makes the batch helpers safely parallel.

mod codec;
mod envelope;
mod escape;
mod table;

pub use codec::{decode_batch, decode_row, encode_batch, encode_row};
pub use envelope::{decode_envelope, encode_envelope, Body, Envelope, ServiceSequence};
pub use escape::{escape, find_terminator, unescape, Terminator};
pub use escape::{ESCAPE, FIELD_SEP, FINAL_MARK, TERMINATOR};
pub use table::{decode_table, encode_table};
