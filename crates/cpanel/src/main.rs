//! `cpanel` - run a live-reload development host with its control panel.
//!
//! `cpanel serve` starts a small host server that browsers connect to over
//! WebSockets and attaches the control panel to it.

mod commands;
mod error;
mod host;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use error::CliError;
use output::Output;

/// cpanel - live-reload control panel.
#[derive(Parser)]
#[command(name = "cpanel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a development host with the control panel attached.
    Serve(ServeArgs),
}

impl Cli {
    fn verbose(&self) -> bool {
        match &self.command {
            Commands::Serve(args) => args.verbose,
        }
    }

    fn run(self) -> Result<(), CliError> {
        let runtime = tokio::runtime::Runtime::new()?;
        match self.command {
            Commands::Serve(args) => runtime.block_on(args.execute()),
        }
    }
}

/// `--verbose` shows INFO, otherwise `RUST_LOG` decides (warnings and errors by default).
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose());

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Output::new().error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
