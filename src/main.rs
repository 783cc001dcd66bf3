//! gridwire - encode, decode, and inspect wire streams

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use gridwire::config::OutputFormat;
use gridwire::output::{render_stream_to_stdout, render_table_to_stdout, StreamReport};
use gridwire::wire;
use gridwire::Table;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Tagged-value tables over a self-delimiting wire protocol
#[derive(Parser, Debug)]
#[command(name = "gridwire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a delimited text file and write it as a wire stream
    Encode {
        /// Delimited text input
        input: PathBuf,

        /// Wire stream output file
        #[arg(short, long)]
        output: PathBuf,

        /// Field delimiter for the text input
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Decode a table wire stream back to delimited text
    Decode {
        /// Wire stream input
        input: PathBuf,

        /// Delimited text output file; rendered to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format when rendering to stdout
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,
    },

    /// Dump every item of a wire stream
    Inspect {
        /// Wire stream input
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            input,
            output,
            delimiter,
        } => {
            let table = Table::import_from_file(&input, delimiter)
                .with_context(|| format!("Failed to import {}", input.display()))?;
            let bytes = wire::encode_table(&table);
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Encoded {} row(s) x {} col(s) into {} byte(s)",
                table.number_of_rows(),
                table.number_of_cols(),
                bytes.len()
            );
        }
        Command::Decode {
            input,
            output,
            format,
        } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let table = wire::decode_table(&bytes);
            match output {
                Some(path) => {
                    table
                        .export_to_file(&path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Decoded {} row(s) x {} col(s)",
                        table.number_of_rows(),
                        table.number_of_cols()
                    );
                }
                None => render_table_to_stdout(&table, format.into())?,
            }
        }
        Command::Inspect { input, format } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let row = wire::decode_row(&bytes);
            let report = StreamReport::from_row(&row);
            render_stream_to_stdout(&report, format.into())?;
        }
    }

    Ok(())
}
