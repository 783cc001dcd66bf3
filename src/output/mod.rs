//! Rendering for decoded item streams and tables

mod json;
mod terminal;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::config::OutputFormat;
use crate::model::{Row, Table, Value};

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// One decoded wire item.
pub struct StreamItem {
    pub index: usize,
    pub value: Value,
}

/// Flat report over a decoded row stream.
pub struct StreamReport {
    pub items: Vec<StreamItem>,
}

impl StreamReport {
    pub fn from_row(row: &Row) -> Self {
        let items = row
            .iter()
            .enumerate()
            .map(|(index, cell)| StreamItem {
                index,
                value: cell.clone(),
            })
            .collect();
        Self { items }
    }
}

/// Trait for stream/table renderers.
pub trait Renderer {
    /// Render an item-stream report to a writer.
    fn render_stream(&self, report: &StreamReport, writer: &mut dyn WriteColor) -> Result<()>;

    /// Render a decoded table to a writer.
    fn render_table(&self, table: &Table, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating renderers based on format type.
pub struct RendererFactory;

impl RendererFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Renderer> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render an item-stream report to stdout.
pub fn render_stream_to_stdout(report: &StreamReport, format: OutputFormat) -> Result<()> {
    let renderer = RendererFactory::create(format);
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    renderer.render_stream(report, &mut stdout)
}

/// Render a decoded table to stdout.
pub fn render_table_to_stdout(table: &Table, format: OutputFormat) -> Result<()> {
    let renderer = RendererFactory::create(format);
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    renderer.render_table(table, &mut stdout)
}
