//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use termcolor::WriteColor;

use crate::model::{Table, Value, ValueType};

use super::{Renderer, StreamReport};

/// JSON output formatter.
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn emit<T: Serialize>(&self, value: &T, writer: &mut dyn WriteColor) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable wire item for JSON output.
#[derive(Serialize)]
struct JsonItem {
    index: usize,
    #[serde(rename = "type")]
    type_name: &'static str,
    size: usize,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct JsonStream {
    items: Vec<JsonItem>,
}

#[derive(Serialize)]
struct JsonTable {
    delimiter: char,
    header: Vec<String>,
    outputs: Vec<usize>,
    rows: Vec<Vec<serde_json::Value>>,
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value.value_type() {
        ValueType::Null => serde_json::Value::Null,
        ValueType::Char | ValueType::Short | ValueType::Int | ValueType::Long => {
            serde_json::json!(value.as_long())
        }
        ValueType::Float | ValueType::Double => serde_json::json!(value.as_double()),
        ValueType::Boolean => serde_json::Value::Bool(value.as_bool()),
        ValueType::String => serde_json::Value::String(value.as_string()),
    }
}

impl Renderer for JsonOutput {
    fn render_stream(&self, report: &StreamReport, writer: &mut dyn WriteColor) -> Result<()> {
        let items: Vec<JsonItem> = report
            .items
            .iter()
            .map(|item| JsonItem {
                index: item.index,
                type_name: item.value.value_type().as_str(),
                size: item.value.size(),
                value: value_to_json(&item.value),
            })
            .collect();
        self.emit(&JsonStream { items }, writer)
    }

    fn render_table(&self, table: &Table, writer: &mut dyn WriteColor) -> Result<()> {
        let output = JsonTable {
            delimiter: table.delimiter(),
            header: table.header().to_vec(),
            outputs: table.outputs().collect(),
            rows: table
                .rows()
                .iter()
                .map(|row| row.iter().map(value_to_json).collect())
                .collect(),
        };
        self.emit(&output, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use termcolor::Buffer;

    #[test]
    fn test_stream_json_shape() {
        let mut row = Row::new();
        row.push("TECL");
        row.push(2.5f64);
        row.push(Value::new());
        let report = StreamReport::from_row(&row);
        let mut buf = Buffer::no_color();
        JsonOutput::compact().render_stream(&report, &mut buf).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(buf.as_slice()).unwrap();
        assert_eq!(parsed["items"][0]["value"], "TECL");
        assert_eq!(parsed["items"][1]["type"], "double");
        assert_eq!(parsed["items"][1]["value"], 2.5);
        assert!(parsed["items"][2]["value"].is_null());
    }

    #[test]
    fn test_table_json_shape() {
        let mut table = Table::new();
        let mut col = Row::new();
        col.push(1i64);
        col.push(2i64);
        table.add_col("n", col, 0);
        table.toggle_output(0);
        let mut buf = Buffer::no_color();
        JsonOutput::compact().render_table(&table, &mut buf).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(buf.as_slice()).unwrap();
        assert_eq!(parsed["header"][0], "n");
        assert_eq!(parsed["outputs"][0], 0);
        assert_eq!(parsed["rows"][1][0], 2);
    }
}
