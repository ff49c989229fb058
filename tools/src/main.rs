mod build_dataset;
mod dataset_writer;
mod info;

use crate::build_dataset::build_dataset;
use crate::info::info;
use build_dataset::BuildDatasetCommand;
use clap::{Parser, Subcommand};
use info::InfoCommand;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Cli {
    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Samples positions from a PGN corpus into win and loss arrays
    BuildDataset(BuildDatasetCommand),
    /// Prints the encoding of a position
    Info(InfoCommand),
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::BuildDataset(cmd) => build_dataset(cmd),
        Commands::Info(cmd) => info(cmd),
    }
}
