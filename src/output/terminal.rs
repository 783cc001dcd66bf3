//! Colored terminal output

use std::io::Write;

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::model::Table;

use super::{Renderer, StreamReport};

/// Terminal output with colors.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_heading(&self, writer: &mut dyn WriteColor, heading: &str) -> Result<()> {
        writer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Cyan)))?;
        writeln!(writer, "{}", heading)?;
        writer.reset()?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalOutput {
    fn render_stream(&self, report: &StreamReport, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_heading(writer, &format!("{} item(s)", report.items.len()))?;
        if report.items.is_empty() {
            return Ok(());
        }
        let mut data: Vec<Vec<String>> = Vec::with_capacity(report.items.len() + 1);
        data.push(vec![
            "#".to_string(),
            "type".to_string(),
            "size".to_string(),
            "value".to_string(),
        ]);
        for item in &report.items {
            data.push(vec![
                item.index.to_string(),
                item.value.value_type().as_str().to_string(),
                item.value.size().to_string(),
                item.value.as_string(),
            ]);
        }
        write!(writer, "{}", build_table(&data))?;
        Ok(())
    }

    fn render_table(&self, table: &Table, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_heading(
            writer,
            &format!(
                "{} row(s) x {} col(s)",
                table.number_of_rows(),
                table.number_of_cols()
            ),
        )?;
        if table.number_of_cols() == 0 {
            return Ok(());
        }
        let mut data: Vec<Vec<String>> = Vec::with_capacity(table.number_of_rows() + 1);
        data.push(
            table
                .header()
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    if table.is_output(i) {
                        format!("{}*", name)
                    } else {
                        name.clone()
                    }
                })
                .collect(),
        );
        for row in table.rows() {
            data.push(row.iter().map(|v| v.as_string()).collect());
        }
        write!(writer, "{}", build_table(&data))?;
        Ok(())
    }
}

/// Build a column-aligned box table; row 0 is the header.
fn build_table(data: &[Vec<String>]) -> String {
    if data.is_empty() || data[0].is_empty() {
        return String::new();
    }

    let col_count = data[0].len();
    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in data {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in col_widths.iter().enumerate() {
            line.push_str(&"─".repeat(*width + 2));
            line.push(if i + 1 < col_widths.len() { mid } else { right });
        }
        line.push('\n');
        line
    };
    let body_row = |row: &[String]| {
        let mut line = String::from("│");
        for (i, &width) in col_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {:width$} │", cell, width = width));
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&body_row(&data[0]));
    output.push_str(&border('├', '┼', '┤'));
    for row in data.iter().skip(1) {
        output.push_str(&body_row(row));
    }
    output.push_str(&border('└', '┴', '┘'));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use termcolor::Buffer;

    #[test]
    fn test_render_stream_lists_items() {
        let mut row = Row::new();
        row.push("TECL");
        row.push(4i32);
        let report = StreamReport::from_row(&row);
        let mut buf = Buffer::no_color();
        TerminalOutput::new().render_stream(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("2 item(s)"));
        assert!(text.contains("TECL"));
        assert!(text.contains("int"));
    }

    #[test]
    fn test_render_table_marks_output_columns() {
        let mut table = Table::new();
        let mut col = Row::new();
        col.push(1i32);
        table.add_col("a", col, 0);
        let mut col = Row::new();
        col.push(2i32);
        table.add_col("b", col, 1);
        let mut buf = Buffer::no_color();
        TerminalOutput::new().render_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert!(text.contains("1 row(s) x 2 col(s)"));
        assert!(text.contains("b*"));
    }
}
