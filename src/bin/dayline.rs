//! Dayline CLI - Command-line interface for Dayline
//!
//! Commands:
//! - averages: Build the windowed-averages table from a data directory
//! - sequences: Build the day-sequence dataset from a data directory
//! - config: Print the effective pipeline configuration

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Env};
use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dayline::encoder::{averages_to_csv, averages_to_json, sequences_to_json, to_ndjson};
use dayline::pipeline::SkippedUser;
use dayline::{CsvDirectorySource, DatasetAssembler, DaylineError, PipelineConfig, DAYLINE_VERSION};

/// Dayline - Daily behaviour datasets from lifelog exports
#[derive(Parser)]
#[command(name = "dayline")]
#[command(version = DAYLINE_VERSION)]
#[command(about = "Turn tagged-event and step logs into daily datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the windowed-averages table joined with the user roster
    Averages {
        /// Data directory containing user_information.csv, user_tags/ and user_data/
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Window length in days (overrides --config)
        #[arg(long)]
        window_days: Option<u32>,

        /// Pipeline configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "csv")]
        format: AveragesFormat,
    },

    /// Build the day-sequence dataset
    Sequences {
        /// Data directory containing user_information.csv and user_tags/
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: SequencesFormat,
    },

    /// Print the effective pipeline configuration as JSON
    Config {
        /// Window length in days (overrides --config)
        #[arg(long)]
        window_days: Option<u32>,

        /// Pipeline configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum AveragesFormat {
    /// Comma-separated table with a header row
    Csv,
    /// JSON array of row objects
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum SequencesFormat {
    /// JSON array of flat day arrays
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Newline-delimited JSON (one day per line)
    Ndjson,
}

fn main() -> ExitCode {
    // Reads RUST_LOG; skip diagnostics stay visible by default
    logger(Env::default()).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DaylineCliError> {
    match cli.command {
        Commands::Averages {
            input,
            output,
            window_days,
            config,
            format,
        } => cmd_averages(&input, &output, window_days, config.as_deref(), format),

        Commands::Sequences {
            input,
            output,
            format,
        } => cmd_sequences(&input, &output, format),

        Commands::Config {
            window_days,
            config,
        } => {
            let config = load_config(window_days, config.as_deref())?;
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn cmd_averages(
    input: &Path,
    output: &Path,
    window_days: Option<u32>,
    config: Option<&Path>,
    format: AveragesFormat,
) -> Result<(), DaylineCliError> {
    let config = load_config(window_days, config)?;
    let assembler = DatasetAssembler::new(config)?;
    let source = CsvDirectorySource::new(input);

    let dataset = assembler.assemble_averages(&source)?;
    report_skipped(&dataset.skipped);
    info!(
        "Built {} averages rows ({}-day windows)",
        dataset.rows.len(),
        assembler.config().window_days
    );

    let encoded = match format {
        AveragesFormat::Csv => {
            let mut buf = Vec::new();
            averages_to_csv(&dataset.rows, &mut buf)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        AveragesFormat::Json => averages_to_json(&dataset.rows, pretty_on_tty(output))?,
        AveragesFormat::JsonPretty => averages_to_json(&dataset.rows, true)?,
        AveragesFormat::Ndjson => to_ndjson(&dataset.rows)?,
    };

    write_output(output, &encoded)
}

fn cmd_sequences(
    input: &Path,
    output: &Path,
    format: SequencesFormat,
) -> Result<(), DaylineCliError> {
    let source = CsvDirectorySource::new(input);
    let dataset = DatasetAssembler::default().assemble_sequences(&source)?;
    report_skipped(&dataset.skipped);
    info!("Built {} day sequences", dataset.sequences.len());

    let encoded = match format {
        SequencesFormat::Json => sequences_to_json(&dataset.sequences, pretty_on_tty(output))?,
        SequencesFormat::JsonPretty => sequences_to_json(&dataset.sequences, true)?,
        SequencesFormat::Ndjson => to_ndjson(&dataset.sequences)?,
    };

    write_output(output, &encoded)
}

// Helper functions

/// Logger that falls back to `info` when the environment sets no filter
fn logger(env: Env<'_>) -> Builder {
    Builder::from_env(env.default_filter_or("info"))
}

/// Config file first, then an explicit --window-days on top
fn load_config(
    window_days: Option<u32>,
    path: Option<&Path>,
) -> Result<PipelineConfig, DaylineCliError> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    if let Some(days) = window_days {
        config.window_days = days;
    }
    config.validate()?;
    Ok(config)
}

fn report_skipped(skipped: &[SkippedUser]) {
    if !skipped.is_empty() {
        warn!("Skipped {} users", skipped.len());
    }
}

fn is_stdout(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn pretty_on_tty(output: &Path) -> bool {
    is_stdout(output) && atty::is(atty::Stream::Stdout)
}

fn write_output(output: &Path, content: &str) -> Result<(), DaylineCliError> {
    if is_stdout(output) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
    } else {
        fs::write(output, content)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum DaylineCliError {
    Io(io::Error),
    Dayline(DaylineError),
}

impl From<io::Error> for DaylineCliError {
    fn from(e: io::Error) -> Self {
        DaylineCliError::Io(e)
    }
}

impl From<DaylineError> for DaylineCliError {
    fn from(e: DaylineError) -> Self {
        DaylineCliError::Dayline(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DaylineCliError> for CliError {
    fn from(e: DaylineCliError) -> Self {
        match e {
            DaylineCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            DaylineCliError::Dayline(e) => {
                let (code, hint) = match &e {
                    DaylineError::MissingRoster(_) => (
                        "MISSING_ROSTER",
                        Some("Input directory must contain user_information.csv"),
                    ),
                    DaylineError::MissingSource { .. } => ("MISSING_SOURCE", None),
                    DaylineError::Csv(_) => (
                        "CSV_ERROR",
                        Some("Check the CSV headers and column counts"),
                    ),
                    DaylineError::Io(_) => (
                        "IO_ERROR",
                        Some("Check file paths and permissions"),
                    ),
                    DaylineError::JsonError(_) => ("JSON_ERROR", Some("Check JSON syntax")),
                    DaylineError::DateParseError(_) | DaylineError::ParseError(_) => (
                        "PARSE_ERROR",
                        Some("Ensure timestamps and step values are well formed"),
                    ),
                    DaylineError::InvalidWindow(_) => (
                        "INVALID_WINDOW",
                        Some("Use --window-days 1 or greater"),
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_logger_defaults_to_info() {
        let env = Env::new().filter("DAYLINE_TEST_UNSET_LOG");
        assert_eq!(logger(env).build().filter(), LevelFilter::Info);
    }

    #[test]
    fn test_window_flag_overrides_default() {
        let config = load_config(Some(14), None).unwrap();
        assert_eq!(config.window_days, 14);
        assert!(matches!(
            load_config(Some(0), None),
            Err(DaylineCliError::Dayline(DaylineError::InvalidWindow(0)))
        ));
    }
}
