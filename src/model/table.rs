//! Two-dimensional grid of rows with named columns and output flags

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::warn;

use super::row::{Row, Standardize};
use super::value::Value;

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = ',';

type OutputSet = IndexSet<usize, FxBuildHasher>;

/// A grid of [`Row`]s plus one header name per column.
///
/// Invariant: once any column exists, `header.len() == number_of_cols()` and
/// every row's length equals `number_of_cols()`. Mutations that would break
/// the invariant are rejected with a logged warning and no state change.
///
/// Columns can be flagged as model outputs; with no explicit flags the last
/// column is the implicit output.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    delimiter: char,
    header: Vec<String>,
    cells: Vec<Row>,
    outputs: OutputSet,
    min: f32,
    max: f32,
    range: f32,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Create an empty table with the default delimiter.
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// Create an empty table with a text import/export delimiter.
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            header: Vec::new(),
            cells: Vec::new(),
            outputs: OutputSet::default(),
            min: 0.0,
            max: 0.0,
            range: 0.0,
        }
    }

    /// Assemble a table from already-validated parts.
    pub(crate) fn from_parts(
        delimiter: char,
        header: Vec<String>,
        cells: Vec<Row>,
        outputs: impl IntoIterator<Item = usize>,
    ) -> Self {
        debug_assert!(cells.iter().all(|r| r.len() == header.len()));
        Self {
            delimiter,
            header,
            cells,
            outputs: outputs.into_iter().collect(),
            min: 0.0,
            max: 0.0,
            range: 0.0,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.delimiter = delimiter;
    }

    pub fn number_of_rows(&self) -> usize {
        self.cells.len()
    }

    pub fn number_of_cols(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.cells.is_empty()
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.cells
    }

    /// Copy out the row at `index`; out of range yields an empty row.
    pub fn row(&self, index: usize) -> Row {
        self.cells.get(index).cloned().unwrap_or_default()
    }

    /// Copy out column `index` as a row of its cells, top to bottom.
    pub fn col(&self, index: usize) -> Row {
        if index >= self.number_of_cols() {
            return Row::new();
        }
        self.cells.iter().map(|r| r.get(index)).collect()
    }

    /// Copy out a single cell; out of range yields a Null default.
    pub fn get(&self, row: usize, col: usize) -> Value {
        self.cells.get(row).map(|r| r.get(col)).unwrap_or_default()
    }

    /// Insert a column at `index` (clamped to append). On an empty table
    /// this establishes the first column, creating one row per element of
    /// `data`. On a non-empty table `data` must match the row count exactly;
    /// a mismatch is rejected without mutation.
    pub fn add_col(&mut self, name: impl Into<String>, data: Row, index: usize) {
        if self.is_empty() {
            self.header.push(name.into());
            self.cells = data
                .iter()
                .cloned()
                .map(|v| Row::from_values(vec![v]))
                .collect();
            return;
        }
        if data.len() != self.number_of_rows() {
            warn!(
                expected = self.number_of_rows(),
                got = data.len(),
                "add_col rejected: column length does not match row count"
            );
            return;
        }
        let index = index.min(self.number_of_cols());
        self.header.insert(index, name.into());
        for (row, value) in self.cells.iter_mut().zip(data.iter().cloned()) {
            row.insert(index, value);
        }
        self.outputs = self
            .outputs
            .iter()
            .map(|&c| if c >= index { c + 1 } else { c })
            .collect();
    }

    /// Remove column `index` and its header; out of range is a no-op.
    /// Output flags referencing later columns shift down with the data.
    pub fn remove_col(&mut self, index: usize) {
        if index >= self.number_of_cols() {
            return;
        }
        self.header.remove(index);
        for row in &mut self.cells {
            row.remove(index);
        }
        self.outputs = self
            .outputs
            .iter()
            .filter(|&&c| c != index)
            .map(|&c| if c > index { c - 1 } else { c })
            .collect();
        if self.header.is_empty() {
            self.cells.clear();
        }
    }

    /// Swap two columns, keeping header/data pairing and output flags with
    /// the moved data.
    pub fn swap_col(&mut self, a: usize, b: usize) {
        let cols = self.number_of_cols();
        if a >= cols || b >= cols || a == b {
            return;
        }
        self.header.swap(a, b);
        for row in &mut self.cells {
            let va = row.get(a);
            let vb = row.get(b);
            row.remove(a);
            row.insert(a, vb);
            row.remove(b);
            row.insert(b, va);
        }
        let had_a = self.outputs.contains(&a);
        let had_b = self.outputs.contains(&b);
        if had_a != had_b {
            if had_a {
                self.outputs.shift_remove(&a);
                self.outputs.insert(b);
            } else {
                self.outputs.shift_remove(&b);
                self.outputs.insert(a);
            }
        }
    }

    /// Move column `from` to position `to` via remove and reinsert. Output
    /// flags follow the moved data.
    pub fn move_col(&mut self, from: usize, to: usize) {
        let cols = self.number_of_cols();
        if from >= cols || to >= cols || from == to {
            return;
        }
        let name = self.header.remove(from);
        let data: Vec<Value> = self
            .cells
            .iter_mut()
            .map(|row| {
                let v = row.get(from);
                row.remove(from);
                v
            })
            .collect();
        let was_output = self.outputs.shift_remove(&from);
        self.outputs = self
            .outputs
            .iter()
            .map(|&c| if c > from { c - 1 } else { c })
            .collect();

        self.header.insert(to, name);
        for (row, value) in self.cells.iter_mut().zip(data) {
            row.insert(to, value);
        }
        self.outputs = self
            .outputs
            .iter()
            .map(|&c| if c >= to { c + 1 } else { c })
            .collect();
        if was_output {
            self.outputs.insert(to);
        }
    }

    /// Append a data row. The length must match the column count.
    pub fn add_row(&mut self, row: Row) {
        if row.len() != self.number_of_cols() {
            warn!(
                expected = self.number_of_cols(),
                got = row.len(),
                "add_row rejected: row length does not match column count"
            );
            return;
        }
        self.cells.push(row);
    }

    /// Remove the row at `index`; out of range is a no-op.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.cells.len() {
            self.cells.remove(index);
        }
    }

    /// Append another table's rows. An empty `other` is a no-op; appending
    /// onto an empty table copies `other` wholesale; a column-count mismatch
    /// is a no-op. On success `other`'s headers are adopted.
    pub fn append(&mut self, other: &Table) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        if other.number_of_cols() != self.number_of_cols() {
            warn!(
                ours = self.number_of_cols(),
                theirs = other.number_of_cols(),
                "append rejected: column count mismatch"
            );
            return;
        }
        self.header = other.header.clone();
        self.cells.extend(other.cells.iter().cloned());
    }

    /// Round-robin the rows into `k` tables, each keeping the header,
    /// delimiter, and output flags. Row `i` lands in partition `i % k`, so
    /// trailing partitions may come up one row short.
    pub fn stratify(&self, k: usize) -> Vec<Table> {
        Self::stratify_many(std::slice::from_ref(self), k)
    }

    /// Round-robin split over the concatenated row space of several tables.
    /// Header and output metadata come from the first non-empty input.
    pub fn stratify_many(tables: &[Table], k: usize) -> Vec<Table> {
        if k == 0 {
            return Vec::new();
        }
        let template = match tables.iter().find(|t| !t.is_empty()) {
            Some(t) => t,
            None => return Vec::new(),
        };
        let mut parts: Vec<Table> = (0..k)
            .map(|_| {
                Table::from_parts(
                    template.delimiter,
                    template.header.clone(),
                    Vec::new(),
                    template.outputs.iter().copied(),
                )
            })
            .collect();
        let mut next = 0usize;
        for table in tables {
            for row in &table.cells {
                parts[next % k].cells.push(row.clone());
                next += 1;
            }
        }
        parts
    }

    /// Flip column `index`'s explicit output flag; out of range is a no-op.
    pub fn toggle_output(&mut self, index: usize) {
        if index >= self.number_of_cols() {
            return;
        }
        if !self.outputs.shift_remove(&index) {
            self.outputs.insert(index);
        }
    }

    /// Whether a column is a model output. Explicit flags win; with none
    /// set, the last column is the implicit output.
    pub fn is_output(&self, index: usize) -> bool {
        if self.outputs.is_empty() {
            self.number_of_cols() > 0 && index + 1 == self.number_of_cols()
        } else {
            self.outputs.contains(&index)
        }
    }

    /// Explicitly flagged output columns, in toggle order.
    pub fn outputs(&self) -> impl Iterator<Item = usize> + '_ {
        self.outputs.iter().copied()
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub(crate) fn set_bounds(&mut self, min: f32, max: f32) {
        self.min = min;
        self.max = max;
        self.range = max - min;
    }

    /// Min-max rescale every numeric cell with bounds computed table-wide,
    /// so all rows share one domain. Same per-cell rule as
    /// [`Row::standardize`].
    pub fn standardize(&mut self, mode: Standardize) {
        let mut bounds: Option<(f32, f32)> = None;
        for row in &self.cells {
            if let Some((lo, hi)) = row.scan_bounds(mode) {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(lo), max.max(hi)),
                    None => (lo, hi),
                });
            }
        }
        let Some((min, max)) = bounds else {
            return;
        };
        self.set_bounds(min, max);
        if self.range == 0.0 {
            return;
        }
        for row in &mut self.cells {
            row.rescale(min, max - min);
        }
    }

    /// Drop all rows, headers, output flags, and normalization state. The
    /// delimiter survives.
    pub fn clear(&mut self) {
        self.header.clear();
        self.cells.clear();
        self.outputs.clear();
        self.min = 0.0;
        self.max = 0.0;
        self.range = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[i32]) -> Row {
        values.iter().map(|&v| Value::from(v)).collect()
    }

    fn sample() -> Table {
        let mut t = Table::new();
        t.add_col("open", col(&[10, 20, 30]), 0);
        t.add_col("close", col(&[11, 21, 31]), 1);
        t
    }

    fn assert_invariant(t: &Table) {
        assert_eq!(t.header().len(), t.number_of_cols());
        for row in t.rows() {
            assert_eq!(row.len(), t.number_of_cols());
        }
    }

    #[test]
    fn test_add_col_bootstraps_empty_table() {
        let t = sample();
        assert_eq!(t.number_of_rows(), 3);
        assert_eq!(t.number_of_cols(), 2);
        assert_eq!(t.get(1, 0).as_int(), 20);
        assert_eq!(t.get(2, 1).as_int(), 31);
        assert_invariant(&t);
    }

    #[test]
    fn test_add_col_length_mismatch_leaves_table_untouched() {
        let mut t = sample();
        let snapshot = t.clone();
        t.add_col("bad", col(&[1, 2]), 1);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_add_col_inserts_in_the_middle() {
        let mut t = sample();
        t.add_col("volume", col(&[100, 200, 300]), 1);
        assert_eq!(t.header(), &["open", "volume", "close"]);
        assert_eq!(t.get(0, 1).as_int(), 100);
        assert_eq!(t.get(0, 2).as_int(), 11);
        assert_invariant(&t);
    }

    #[test]
    fn test_remove_col_shifts_output_flags() {
        let mut t = sample();
        t.add_col("volume", col(&[100, 200, 300]), 2);
        t.toggle_output(2);
        t.remove_col(0);
        assert_eq!(t.header(), &["close", "volume"]);
        assert!(t.is_output(1));
        assert!(!t.is_output(0));
        assert_invariant(&t);
    }

    #[test]
    fn test_remove_col_out_of_range_is_noop() {
        let mut t = sample();
        let snapshot = t.clone();
        t.remove_col(5);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_swap_col_keeps_pairing_and_flags() {
        let mut t = sample();
        t.toggle_output(0);
        t.swap_col(0, 1);
        assert_eq!(t.header(), &["close", "open"]);
        assert_eq!(t.get(0, 0).as_int(), 11);
        assert_eq!(t.get(0, 1).as_int(), 10);
        assert!(t.is_output(1));
        assert!(!t.is_output(0));
        assert_invariant(&t);
    }

    #[test]
    fn test_move_col_reorders_and_remaps_flags() {
        let mut t = sample();
        t.add_col("volume", col(&[100, 200, 300]), 2);
        t.toggle_output(2);
        t.move_col(2, 0);
        assert_eq!(t.header(), &["volume", "open", "close"]);
        assert_eq!(t.get(1, 0).as_int(), 200);
        assert!(t.is_output(0));
        assert_invariant(&t);
    }

    #[test]
    fn test_append_adopts_rows_and_header() {
        let mut a = sample();
        let mut b = Table::new();
        b.add_col("o", col(&[40]), 0);
        b.add_col("c", col(&[41]), 1);
        a.append(&b);
        assert_eq!(a.number_of_rows(), 4);
        assert_eq!(a.header(), &["o", "c"]);
        assert_eq!(a.get(3, 1).as_int(), 41);
        assert_invariant(&a);
    }

    #[test]
    fn test_append_empty_other_is_noop() {
        let mut a = sample();
        let snapshot = a.clone();
        a.append(&Table::new());
        assert_eq!(a, snapshot);
    }

    #[test]
    fn test_append_onto_empty_copies() {
        let mut a = Table::new();
        let b = sample();
        a.append(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_append_column_mismatch_is_noop() {
        let mut a = sample();
        let snapshot = a.clone();
        let mut b = Table::new();
        b.add_col("only", col(&[1]), 0);
        a.append(&b);
        assert_eq!(a, snapshot);
    }

    #[test]
    fn test_stratify_round_robin() {
        let mut t = sample();
        t.add_row(Row::from_values(vec![
            Value::from(40i32),
            Value::from(41i32),
        ]));
        t.toggle_output(0);
        let parts = t.stratify(3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].number_of_rows(), 2);
        assert_eq!(parts[1].number_of_rows(), 1);
        assert_eq!(parts[2].number_of_rows(), 1);
        assert_eq!(parts[0].get(0, 0).as_int(), 10);
        assert_eq!(parts[0].get(1, 0).as_int(), 40);
        for part in &parts {
            assert_eq!(part.header(), t.header());
            assert!(part.is_output(0));
            assert_invariant(part);
        }
    }

    #[test]
    fn test_stratify_many_concatenates_row_spaces() {
        let a = sample();
        let mut b = Table::new();
        b.add_col("open", col(&[40, 50]), 0);
        b.add_col("close", col(&[41, 51]), 1);
        let parts = Table::stratify_many(&[a, b], 2);
        assert_eq!(parts[0].number_of_rows(), 3);
        assert_eq!(parts[1].number_of_rows(), 2);
        // rows 0,2,4 of the concatenated space
        assert_eq!(parts[0].get(2, 0).as_int(), 50);
    }

    #[test]
    fn test_is_output_defaults_to_last_column() {
        let t = sample();
        assert!(!t.is_output(0));
        assert!(t.is_output(1));
    }

    #[test]
    fn test_toggle_output_overrides_default() {
        let mut t = sample();
        t.toggle_output(0);
        assert!(t.is_output(0));
        assert!(!t.is_output(1));
        t.toggle_output(0);
        assert!(t.is_output(1));
    }

    #[test]
    fn test_standardize_uses_table_wide_bounds() {
        let mut t = sample();
        t.standardize(Standardize::Data);
        // domain is 10..31 across both columns
        assert_eq!(t.min(), 10.0);
        assert_eq!(t.max(), 31.0);
        assert_eq!(t.get(0, 0).as_float(), -0.5);
        assert_eq!(t.get(2, 1).as_float(), 0.5);
    }

    #[test]
    fn test_clear_resets_everything_but_delimiter() {
        let mut t = Table::with_delimiter(';');
        t.add_col("a", col(&[1]), 0);
        t.toggle_output(0);
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.outputs().count(), 0);
        assert_eq!(t.delimiter(), ';');
    }

    #[test]
    fn test_invariant_across_mutation_sequence() {
        let mut t = Table::new();
        t.add_col("a", col(&[1, 2]), 0);
        t.add_col("b", col(&[3, 4]), 0);
        t.add_col("c", col(&[5, 6]), 1);
        assert_invariant(&t);
        t.remove_col(1);
        assert_invariant(&t);
        t.swap_col(0, 1);
        assert_invariant(&t);
        t.remove_col(0);
        t.remove_col(0);
        assert_invariant(&t);
        assert_eq!(t.number_of_rows(), 0);
    }
}
