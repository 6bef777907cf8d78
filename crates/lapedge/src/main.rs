//! lapedge: Laplacian edge detection for binary PGM images.
//!
//! Reads a grayscale PGM, runs convolution, thinning, hysteresis
//! tracking, and normalization, then writes the edge map as a PGM of the
//! same size.
//!
//! # Usage
//!
//! ```text
//! lapedge foo.pgm foo_edges.pgm
//! lapedge foo.pgm foo_edges.pgm -v
//! lapedge foo.pgm foo_edges.pgm --diagnostics
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use lapedge_pgm::FormatError;
use lapedge_pipeline::diagnostics::{PipelineDiagnostics, process_with_diagnostics};
use lapedge_pipeline::{PipelineConfig, PipelineError};
use log::{LevelFilter, info, warn};

/// Detect edges in a binary PGM image.
///
/// Applies a 3x3 Laplacian kernel, thins edges with non-maximum
/// suppression, keeps strong edges and the weak edges touching them, and
/// writes the rectified result as a binary PGM.
#[derive(Parser)]
#[command(name = "lapedge", version)]
struct Cli {
    /// Input image in binary PGM (P5) format.
    input: PathBuf,

    /// Output image path. Overwritten if it exists.
    output: PathBuf,

    /// Log per-stage grids and header details.
    #[arg(short, long)]
    verbose: bool,

    /// Magnitude a pixel must exceed to be a strong edge.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_HIGH_THRESHOLD)]
    high_threshold: i32,

    /// Magnitude a pixel must exceed to be a weak edge.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_LOW_THRESHOLD)]
    low_threshold: i32,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, the threshold flags are ignored. Missing fields
    /// take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Print per-stage diagnostics as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    #[error("error serializing diagnostics: {0}")]
    DiagnosticsJson(#[source] serde_json::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// `--config-json` wins over the individual threshold flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, AppError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(AppError::ConfigJson);
    }
    Ok(PipelineConfig {
        high_threshold: cli.high_threshold,
        low_threshold: cli.low_threshold,
        ..PipelineConfig::default()
    })
}

/// Install the `LEVEL: message` logger. `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if path.exists() {
        warn!("Overwriting existing file '{}'", path.display());
    }
    std::fs::write(path, bytes).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn print_diagnostics(cli: &Cli, diagnostics: &PipelineDiagnostics) -> Result<(), AppError> {
    if cli.json {
        let json =
            serde_json::to_string_pretty(diagnostics).map_err(AppError::DiagnosticsJson)?;
        println!("{json}");
    }
    if cli.diagnostics {
        eprintln!("{}", diagnostics.report());
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), AppError> {
    info!("Input image: '{}'", cli.input.display());
    info!("Output image: '{}'", cli.output.display());
    info!("Verbose logging: {}", cli.verbose);

    let config = config_from_cli(cli)?;
    info!(
        "Thresholds: high {}, low {}",
        config.high_threshold, config.low_threshold,
    );

    info!("Reading PGM image '{}'...", cli.input.display());
    let decoded = lapedge_pgm::decode(&read_input(&cli.input)?)?;

    let (edges, diagnostics) = process_with_diagnostics(decoded.image, config)?;

    info!("Writing PGM image '{}'...", cli.output.display());
    write_output(&cli.output, &lapedge_pgm::encode(&edges))?;

    print_diagnostics(cli, &diagnostics)?;
    info!("Done.");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
