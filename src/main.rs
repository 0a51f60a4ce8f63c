// Command line host for netboot images
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::stderr;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod cmd;
mod config;
mod loader;

use cmd::probe::ProbeArgs;
use cmd::run::RunArgs;

// Define the command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Netboot image runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load images and boot one of them
    Run(RunArgs),
    /// Report the format of an image file
    Probe(ProbeArgs),
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // RUST_LOG wins; otherwise verbose selects debug for our crates
    let level = if cli.verbose { "debug" } else { "warn" };
    let default_directives = format!(
        "netboot={level},netboot_image={level},netboot_shell={level}",
        level = level
    );
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();
    debug!(?cli, "Logger initialized");

    match cli.command {
        Commands::Run(args) => match cmd::run::run_images(args) {
            Ok(status) => Ok(ExitCode::from(exit_code(status))),
            Err(e) => {
                error!("Run failed: {:#}", e);
                Err(e)
            }
        },
        Commands::Probe(args) => {
            let matched = cmd::probe::run_probe(args)?;
            Ok(if matched {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Map an image status onto a process exit code
///
/// Non-zero statuses outside 1..=255 exit with 1.
fn exit_code(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(1)
}
