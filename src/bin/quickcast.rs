//! # quickcast
//!
//! Command-line front end: forecast a CSV or XLSX upload or inspect its columns.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use quickcast::config::PipelineConfig;
use quickcast::core::RawTable;
use quickcast::io::{read_table_from_path, write_forecast_csv, CsvOptions, Delimiter, Encoding, ExportMode};
use quickcast::models::ModelKind;
use quickcast::prep::{column_profiles, forecast_rows, resolve_columns, ColumnChoice};
use quickcast::session::{Selections, Session, DEFAULT_HORIZON};

#[derive(Parser)]
#[command(name = "quickcast")]
#[command(about = "Forecast a time series from a CSV or XLSX file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// CSV or XLSX file to read
    #[arg(short, long)]
    input: PathBuf,

    /// Field separator: a single character, 'tab' or 'auto'
    #[arg(long, default_value = "auto")]
    delimiter: Delimiter,

    /// CSV text encoding: auto, utf-8 or windows-1252 (cp1252, latin1)
    #[arg(long, default_value = "auto")]
    encoding: Encoding,

    /// YAML pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the series and export the result as CSV
    Forecast {
        #[command(flatten)]
        input: InputArgs,

        /// Date column (default: auto-detect)
        #[arg(long)]
        date_column: Option<String>,

        /// Value column (default: auto-detect)
        #[arg(long)]
        value_column: Option<String>,

        /// Periods to forecast (1-365)
        #[arg(long, default_value_t = DEFAULT_HORIZON)]
        horizon: usize,

        /// Model: drift or holt (default from config)
        #[arg(short, long)]
        model: Option<ModelKind>,

        /// Interval level in (0, 1)
        #[arg(long)]
        level: Option<f64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export history and fitted values as well as the forecast
        #[arg(long)]
        full: bool,
    },

    /// Show how each column parses and which pair would be auto-detected
    Inspect {
        #[command(flatten)]
        input: InputArgs,
    },
}

impl InputArgs {
    fn load(&self) -> Result<(RawTable, PipelineConfig)> {
        let config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        let options = CsvOptions {
            delimiter: self.delimiter,
            encoding: self.encoding,
        };
        let table = read_table_from_path(&self.input, &options)
            .with_context(|| format!("reading {}", self.input.display()))?;
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            "loaded {}",
            self.input.display()
        );
        Ok((table, config))
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}

#[allow(clippy::too_many_arguments)]
fn run_forecast(
    input: &InputArgs,
    date_column: Option<&str>,
    value_column: Option<&str>,
    horizon: usize,
    model: Option<ModelKind>,
    level: Option<f64>,
    output: Option<&Path>,
    full: bool,
) -> Result<()> {
    let (table, mut config) = input.load()?;
    if let Some(level) = level {
        config.level = level;
        config.validate()?;
    }

    let mut session = Session::new(table, config);
    let outcome = session.apply(Selections {
        date: ColumnChoice::from_option(date_column),
        value: ColumnChoice::from_option(value_column),
        horizon,
        model,
    })?;

    eprintln!(
        "date column: {}\nvalue column: {}\nmodel: {}",
        outcome.roles.date_column(),
        outcome.roles.value_column(),
        outcome.model_name
    );
    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {warning}");
    }
    let first = forecast_rows(&outcome.rows).next();
    let last = forecast_rows(&outcome.rows).last();
    if let (Some(first), Some(last)) = (first, last) {
        eprintln!(
            "forecast: {} periods from {} to {}",
            outcome.window.len(),
            first.timestamp,
            last.timestamp
        );
    }

    let mode = if full { ExportMode::Full } else { ExportMode::ForecastOnly };
    let mut writer = open_output(output)?;
    write_forecast_csv(&outcome.rows, &mut writer, mode)?;
    writer.flush().context("flushing output")?;
    Ok(())
}

fn run_inspect(input: &InputArgs) -> Result<()> {
    let (table, config) = input.load()?;

    let resolved = resolve_columns(
        &table,
        &ColumnChoice::Auto,
        &ColumnChoice::Auto,
        &config.inference,
    );

    println!(
        "{:<24} {:>9} {:>8} {:>8}  {:<12} role",
        "column", "non-empty", "date", "number", "date format"
    );
    let roles: Vec<_> = match &resolved {
        Ok(roles) => roles.iter().map(|(_, role)| role.to_string()).collect(),
        Err(_) => Vec::new(),
    };
    for (idx, profile) in column_profiles(&table).iter().enumerate() {
        let format = profile
            .date_format
            .map_or_else(|| "-".to_string(), |f| f.to_string());
        println!(
            "{:<24} {:>9} {:>7.0}% {:>7.0}%  {:<12} {}",
            profile.name,
            profile.non_empty,
            profile.date_fraction * 100.0,
            profile.number_fraction * 100.0,
            format,
            roles.get(idx).map_or("-", String::as_str)
        );
    }

    if let Err(e) = resolved {
        println!("\n{e}");
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.chain().find_map(|e| e.downcast_ref::<quickcast::Error>()) {
        Some(cause) => eprintln!("error during {}: {err:#}", cause.stage()),
        None => eprintln!("error: {err:#}"),
    }
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Forecast {
            input,
            date_column,
            value_column,
            horizon,
            model,
            level,
            output,
            full,
        } => run_forecast(
            input,
            date_column.as_deref(),
            value_column.as_deref(),
            *horizon,
            *model,
            *level,
            output.as_deref(),
            *full,
        ),
        Commands::Inspect { input } => run_inspect(input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
