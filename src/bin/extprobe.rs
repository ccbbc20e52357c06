//! extprobe
//!
//! Opens a SQLite database with native extensions loaded and prints each
//! extension's `<name>_version()`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use extprobe::{
    default_database_path, default_library_dir, probe, DatabaseConfig, DatabaseLocation,
    ExtensionSpec, OpenMode, ProbeOptions, ProbeReport, DEFAULT_EXTENSIONS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "extprobe")]
#[command(version, about = "Load SQLite extensions and report their versions")]
struct Args {
    /// Extensions to load, looked up as <library-dir>/<name> [default: vector js]
    extensions: Vec<String>,

    /// Database file, or :memory: [default: <temp dir>/ext_test.db]
    #[arg(short = 'd', long)]
    database: Option<String>,

    /// Directory holding the extension libraries [default: executable's directory]
    #[arg(short = 'L', long)]
    library_dir: Option<PathBuf>,

    /// TOML configuration file; command line flags override its values
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Open the database read-only
    #[arg(long)]
    read_only: bool,

    /// Also report the SQLite engine version
    #[arg(long)]
    sqlite_version: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Merge the config file (if any) with command line overrides
fn build_config(args: &Args) -> Result<DatabaseConfig> {
    let mut config = match &args.config {
        Some(path) => DatabaseConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DatabaseConfig::new(default_database_path()),
    };

    if let Some(database) = &args.database {
        config.location = DatabaseLocation::from(database.clone());
    }

    if args.read_only {
        config.mode = OpenMode::ReadOnly;
    }

    if let Some(dir) = &args.library_dir {
        config.library_dir = Some(dir.clone());
    } else if config.library_dir.is_none() {
        config.library_dir =
            Some(default_library_dir().context("failed to locate executable directory")?);
    }

    if !args.extensions.is_empty() {
        let mut extensions = Vec::with_capacity(args.extensions.len());
        for name in &args.extensions {
            let spec = ExtensionSpec::new(name.as_str())?;
            // Keep path/entry point/min_version from the config file
            let spec = config
                .extension(&spec.name)
                .cloned()
                .unwrap_or(spec);
            extensions.push(spec);
        }
        config.extensions = extensions;
    } else if args.config.is_none() {
        config = config.with_extensions(DEFAULT_EXTENSIONS)?;
    }

    config.validate()?;
    Ok(config)
}

/// Exit status for bad arguments, config errors and output failures
const USAGE_ERROR: u8 = 2;

/// 0 for a successful probe, 1 for a failed one
fn exit_status(report: &ProbeReport) -> u8 {
    if report.is_success() {
        0
    } else {
        1
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(USAGE_ERROR);
        }
    };
    debug!("Effective configuration: {:?}", config);

    let report = probe(
        &config,
        ProbeOptions {
            sqlite_version: args.sqlite_version,
        },
    );

    let output = match args.format {
        Format::Text => report.render_text(),
        Format::Json => match report.to_json() {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(USAGE_ERROR);
            }
        },
    };
    println!("{}", output);

    ExitCode::from(exit_status(&report))
}
