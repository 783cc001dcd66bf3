//! Table serialization layered on the row protocol
//!
//! A table is flattened into a single row — metadata first, then cell
//! contents row-major — and that row rides the ordinary item stream. The
//! metadata order is fixed: delimiter, min, max, range, row count, column
//! count, one header string per column, output-flag count, one flagged
//! index per flag. Decoding peels the same order off the front and leans on
//! the row's Null-default `get`, so a truncated stream degrades to zeroed
//! metadata and missing cells instead of failing.

use crate::model::{Row, Table, DEFAULT_DELIMITER};

use super::codec::{decode_row, encode_row};

/// Serialize a table into one item stream.
pub fn encode_table(table: &Table) -> Vec<u8> {
    encode_row(&flatten(table))
}

/// Parse an item stream produced by [`encode_table`]. Corrupt or truncated
/// input yields a table reconstructed from whatever prefix survived.
pub fn decode_table(buf: &[u8]) -> Table {
    unflatten(&decode_row(buf))
}

pub(crate) fn flatten(table: &Table) -> Row {
    let rows = table.number_of_rows();
    let cols = table.number_of_cols();
    let outputs: Vec<usize> = table.outputs().collect();
    let mut flat = Row::with_capacity(7 + cols + outputs.len() + rows * cols);
    flat.push(table.delimiter() as u8 as i8);
    flat.push(table.min());
    flat.push(table.max());
    flat.push(table.range());
    flat.push(rows as i64);
    flat.push(cols as i64);
    for name in table.header() {
        flat.push(name.as_str());
    }
    flat.push(outputs.len() as i64);
    for col in outputs {
        flat.push(col as i64);
    }
    for row in table.rows() {
        for cell in row.iter() {
            flat.push(cell.clone());
        }
    }
    flat
}

pub(crate) fn unflatten(flat: &Row) -> Table {
    let mut cursor = 0usize;
    let mut take = || {
        let v = flat.get(cursor);
        cursor += 1;
        v
    };

    let delimiter = match take().as_char() {
        c if c > 0 => c as u8 as char,
        _ => DEFAULT_DELIMITER,
    };
    let min = take().as_float();
    let max = take().as_float();
    let _range = take().as_float(); // recomputed from min/max

    // counts are capped by the flattened length so corrupt size fields
    // cannot demand unbounded work
    let rows = (take().as_long().max(0) as usize).min(flat.len());
    let cols = (take().as_long().max(0) as usize).min(flat.len());

    let mut header = Vec::with_capacity(cols);
    for _ in 0..cols {
        header.push(take().as_string());
    }
    let n_outputs = (take().as_long().max(0) as usize).min(flat.len());
    let mut outputs = Vec::with_capacity(n_outputs);
    for _ in 0..n_outputs {
        outputs.push(take().as_long().max(0) as usize);
    }
    let mut cells = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut row = Row::with_capacity(cols);
        for _ in 0..cols {
            row.push(take());
        }
        cells.push(row);
    }

    let mut table = Table::from_parts(delimiter, header, cells, outputs);
    table.set_bounds(min, max);
    table
}
