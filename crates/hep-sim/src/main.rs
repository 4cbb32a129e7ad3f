use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    analyze::{self, AnalyzeArgs},
    generate::{self, GenerateArgs},
    run::{self, RunArgs},
    types::{self, TypesArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "hepsim", about = "Particle decay event generator and validator")]
struct Cli {
    /// Log verbosity (trace, debug, info, warn, error); `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the particle catalog.
    Types(TypesArgs),
    /// Generate events and write the distribution dataset.
    Generate(GenerateArgs),
    /// Validate an existing dataset.
    Analyze(AnalyzeArgs),
    /// Generate, then validate the fresh dataset.
    Run(RunArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Types(args) => types::run(&args),
        Command::Generate(args) => generate::run(&args),
        Command::Analyze(args) => analyze::run(&args),
        Command::Run(args) => run::run(&args),
    }
}
