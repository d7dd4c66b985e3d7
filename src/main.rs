//! quakeconv: command-line front end for the QuakeML and ShakeMap
//! converters.
//!
//! Entry point: parses arguments, initialises structured logging and hands
//! off to the library. All conversion logic lives in the `quakeconv` crate.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::Layer as _;

use quakeconv::core::quakeml_reader::parse_catalog;
use quakeconv::core::quakeml_writer::write_catalog_string;
use quakeconv::core::shakemap::Shakemap;
use quakeconv::export::csv_export::{
    export_catalog_csv, export_intensity_csv, import_catalog_csv,
};
use quakeconv::export::json_export::{
    catalog_geojson, export_catalog_json, export_json_value, intensity_geojson,
};
use quakeconv::export::raster_export::export_ascii_grid;
use quakeconv::export::validate_export_path;
use quakeconv::util::constants;
use quakeconv::util::error::Result;
use quakeconv::util::options::ShakemapOptions;

/// Convert QuakeML catalogs and ShakeMap grids to tables and back.
#[derive(Parser)]
#[command(name = "quakeconv", version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write a debug-level log to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a QuakeML catalog to a table.
    Quakeml {
        /// QuakeML input file.
        input: PathBuf,
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = CatalogFormat::Csv)]
        format: CatalogFormat,
    },
    /// Convert a catalog CSV table to QuakeML.
    ToQuakeml {
        /// Catalog CSV input file.
        input: PathBuf,
        /// QuakeML output file.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a ShakeMap grid to an intensity table.
    Shakemap {
        /// ShakeMap grid XML input file.
        input: PathBuf,
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = GridFormat::Csv)]
        format: GridFormat,
        /// Also write the one-row event summary as CSV.
        #[arg(long)]
        event: Option<PathBuf>,
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Rasterise one intensity column of a ShakeMap grid.
    Raster {
        /// ShakeMap grid XML input file.
        input: PathBuf,
        /// Column to rasterise, e.g. `value_PGA`.
        #[arg(long)]
        value: String,
        /// ESRI ASCII grid output file.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        columns: ColumnArgs,
    },
}

#[derive(clap::Args)]
struct ColumnArgs {
    /// Grid field holding the x coordinate.
    #[arg(long, default_value = constants::DEFAULT_X_COLUMN)]
    x_column: String,
    /// Grid field holding the y coordinate.
    #[arg(long, default_value = constants::DEFAULT_Y_COLUMN)]
    y_column: String,
}

impl From<ColumnArgs> for ShakemapOptions {
    fn from(args: ColumnArgs) -> Self {
        ShakemapOptions {
            x_column: args.x_column,
            y_column: args.y_column,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CatalogFormat {
    Csv,
    Json,
    Geojson,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GridFormat {
    Csv,
    Geojson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref());

    tracing::debug!("{} v{} starting", constants::APP_NAME, constants::APP_VERSION);
    let started = Instant::now();

    match run(cli.command) {
        Ok(()) => {
            tracing::info!("Done in {:.2?}", started.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    tracing::debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Quakeml {
            input,
            output,
            format,
        } => {
            validate_export_path(&output)?;
            let events = parse_catalog(&read_input(&input)?)?;
            let span = events
                .iter()
                .filter_map(|e| e.origin_time())
                .fold(None, |acc, t| match acc {
                    None => Some((t, t)),
                    Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
                });
            if let Some((first, last)) = span {
                tracing::info!("Catalog spans {first} to {last}");
            }
            match format {
                CatalogFormat::Csv => export_catalog_csv(&events, &output),
                CatalogFormat::Json => export_catalog_json(&events, &output),
                CatalogFormat::Geojson => export_json_value(&catalog_geojson(&events)?, &output),
            }
        }
        Command::ToQuakeml { input, output } => {
            validate_export_path(&output)?;
            let events = import_catalog_csv(&input)?;
            let xml = write_catalog_string(&events)?;
            std::fs::write(&output, xml)?;
            tracing::info!("Wrote QuakeML: {}", output.display());
            Ok(())
        }
        Command::Shakemap {
            input,
            output,
            format,
            event,
            columns,
        } => {
            validate_export_path(&output)?;
            let xml = read_input(&input)?;
            let shakemap = Shakemap::parse_with_options(&xml, columns.into())?;
            match format {
                GridFormat::Csv => export_intensity_csv(&shakemap.intensity_table()?, &output)?,
                GridFormat::Geojson => {
                    export_json_value(&intensity_geojson(&shakemap.intensity_table()?)?, &output)?
                }
            }
            if let Some(path) = event {
                validate_export_path(&path)?;
                match shakemap.event()? {
                    Some(summary) => export_catalog_csv(std::slice::from_ref(&summary), &path)?,
                    None => tracing::warn!("ShakeMap has no event; {} not written", path.display()),
                }
            }
            Ok(())
        }
        Command::Raster {
            input,
            value,
            output,
            columns,
        } => {
            validate_export_path(&output)?;
            let xml = read_input(&input)?;
            let shakemap = Shakemap::parse_with_options(&xml, columns.into())?;
            export_ascii_grid(&shakemap.intensity_raster(&value)?, &output)
        }
    }
}

/// Initialise the tracing subscriber.
///
/// - **stderr layer**: `RUST_LOG` if set, otherwise `info` raised by `-v`.
/// - **file layer** (if `log_file` is `Some`): always writes at `debug`
///   level, appending to the file.
fn init_logging(verbosity: u8, log_file: Option<&Path>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if let Some(path) = log_file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .with_filter(tracing_subscriber::EnvFilter::new("debug"));

                tracing_subscriber::registry()
                    .with(stderr_layer.with_filter(env_filter))
                    .with(file_layer)
                    .init();
                return;
            }
            Err(e) => eprintln!("Cannot open log file {}: {e}", path.display()),
        }
    }

    // Fallback: stderr only
    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(env_filter))
        .init();
}
