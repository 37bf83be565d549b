//! flashsniff - SPI flash bus command decoder
//!
//! Reads a recorded bus capture and prints the flash commands it contains.
//! Two capture modes are supported:
//! - **spi** - byte events with explicit chip-select edges, as produced by
//!   an SPI protocol decoder
//! - **parallel** - one 16-bit sample per clock edge from a generic
//!   parallel sampler, used for Quad SPI. Chip-select is inferred from
//!   clock timing.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Decode {
            input,
            mode,
            filter,
            lines,
            stats,
        } => commands::decode::run(&input, mode, &filter, &lines, stats),
        Commands::Opcodes { class } => commands::list_opcodes(class.as_deref()),
    }
}
