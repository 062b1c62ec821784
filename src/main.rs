//! Binary entry point for lessonbank.
//!
//! This binary provides the maintenance CLI for the lessonbank storage core.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use lessonbank::cli;
use lessonbank::config::LessonbankConfig;
use lessonbank::observability;
use std::process::ExitCode;

/// Lessonbank - embedded storage core for teaching material services.
#[derive(Parser)]
#[command(name = "lessonbank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "LESSONBANK_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a fresh snapshot from the bootstrap DDL.
    Init {
        /// Recreate the snapshot even if one exists.
        #[arg(long)]
        force: bool,
    },

    /// Apply additive schema changes to the snapshot.
    Migrate,

    /// Show tables, row counts and snapshot file details.
    Status,

    /// Load the snapshot and rewrite it (round-trip check).
    Persist,
}

/// Main entry point.
fn main() -> ExitCode {
    // Pick up LESSONBANK_* overrides from a local .env during development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = run_command(cli, &config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &LessonbankConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init { force } => cli::cmd_init(config, force),
        Commands::Migrate => cli::cmd_migrate(config),
        Commands::Status => cli::cmd_status(config),
        Commands::Persist => cli::cmd_persist(config),
    }
}

/// Loads configuration from the given path or the default locations.
fn load_config(path: Option<&str>) -> lessonbank::Result<LessonbankConfig> {
    path.map_or_else(
        || Ok(LessonbankConfig::load_default()),
        |p| LessonbankConfig::load_from_file(std::path::Path::new(p)),
    )
}
