//! Command-line interface for assetman
//!
//! `assetman [SRC_PATH]` generates `build.ninja` in the current directory.
//! The hidden `refresh-file-list` subcommand is what the generated build file
//! runs to keep its dirty-tracking list current.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod generate;
mod refresh;

/// Generate Ninja build graphs from declarative asset pipelines
#[derive(Parser)]
#[command(name = "assetman")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: generate::GenerateArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a file list when the files matching its patterns change
    #[command(name = "refresh-file-list", hide = true)]
    RefreshFileList(refresh::RefreshArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Wire verbose flag to the tracing log level.
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Some(Commands::RefreshFileList(args)) => refresh::run(args),
        None => generate::run(cli.generate),
    }
}
