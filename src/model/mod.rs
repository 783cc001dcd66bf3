//! Core data model: variant cells, rows, and tables

mod row;
mod table;
mod value;

pub use row::{Row, Standardize};
pub use table::{Table, DEFAULT_DELIMITER};
pub use value::{Value, ValueType};
