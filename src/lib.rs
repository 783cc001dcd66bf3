//! gridwire - tagged-value cells, containers, and a self-delimiting wire protocol
//!
//! A dynamically-typed cell system (nine-kind tagged values over owned byte
//! blocks), row and table containers built on it, and an escaped, delimited
//! binary protocol that round-trips rows, tables, and service envelopes
//! through a byte stream — tolerating truncated or garbled input by
//! returning partial results.

pub mod config;
pub mod model;
pub mod output;
pub mod parser;
pub mod wire;

pub use model::{Row, Standardize, Table, Value, ValueType};
pub use parser::ImportError;
