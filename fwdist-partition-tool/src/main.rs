use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fwdist_partitions::{
    format::{format_analysis, format_csv, format_json, format_text},
    PartitionError, PartitionTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Text,
    Analysis,
}

#[derive(Debug, Parser)]
#[command(name = "fwdist-partitions-tool", version, about = "Decode a binary partition table", long_about = None)]
struct Cli {
    #[arg(value_name = "INPUT", help = "Path to the partition table image")]
    input: PathBuf,

    #[arg(
        value_name = "FORMAT",
        short,
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    format: OutputFormat,

    #[arg(
        value_name = "OUTPUT",
        short,
        long,
        help = "Write to this file instead of stdout"
    )]
    output: Option<PathBuf>,

    /// Report progress on stderr and show per-record details in text output.
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, help = "Skip validation of the decoded table")]
    no_validate: bool,
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decode(bytes: &[u8], validate: bool) -> Result<PartitionTable, PartitionError> {
    let table = fwdist_partitions::parse(bytes)?;
    if validate {
        fwdist_partitions::validate(&table)?;
    }
    Ok(table)
}

fn render(table: &PartitionTable, format: OutputFormat, verbose: bool) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Json => format_json(table, true)?,
        OutputFormat::Csv => format_csv(table)?,
        OutputFormat::Text => format_text(table, verbose),
        OutputFormat::Analysis => format_analysis(table)?,
    };
    Ok(rendered)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), cli.input.display());

    let table = decode(&bytes, !cli.no_validate)?;
    if cli.verbose && !cli.no_validate {
        eprintln!("Validated {} partition entries", table.len());
    }

    let rendered = render(&table, cli.format, cli.verbose)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .with_context(|| format!("cannot write {}", path.display()))?;
            if cli.verbose {
                eprintln!("Output written to {}", path.display());
            }
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PartitionError>() {
                Some(PartitionError::Format(e)) => eprintln!("Parse error: {}", e),
                Some(PartitionError::Validation(e)) => eprintln!("Validation error: {}", e),
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
