//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "flashsniff")]
#[command(author, version, about = "SPI flash bus command decoder", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// How the capture was recorded
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Byte events with chip-select edges from an SPI decoder
    Spi,
    /// Raw 16-line samples, one per clock edge (Quad SPI)
    Parallel,
}

/// How much of each command is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Level {
    /// Command name only
    Opcode,
    /// Command name and address
    Address,
    /// Command name, address and data
    Full,
    /// Like full, but only malformed commands
    Errors,
}

/// Filter options, override the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Configuration file (TOML format)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address width in bytes for commands without a fixed width
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub address_width: Option<u8>,

    /// Lowest address of interest (hex or decimal)
    #[arg(long, value_parser = parse_hex_u32)]
    pub min_address: Option<u32>,

    /// Highest address of interest (hex or decimal)
    #[arg(long, value_parser = parse_hex_u32)]
    pub max_address: Option<u32>,

    /// Decode level
    #[arg(short, long, value_enum)]
    pub level: Option<Level>,

    /// Only show these command classes (comma-separated: status, read,
    /// program, erase, id, reset, other, or the groups data and control)
    #[arg(long, value_delimiter = ',')]
    pub classes: Vec<String>,

    /// Follow EN4B/EX4B to switch between 3- and 4-byte addresses
    #[arg(long)]
    pub track_address_mode: bool,
}

/// Line assignment of the parallel sampler
#[derive(clap::Args, Debug, Clone)]
pub struct LineArgs {
    /// Sampler lines of IO0..IO3 (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [0u8, 1, 2, 3])]
    pub io_lines: Vec<u8>,

    /// Sampler line of chip-select
    #[arg(long, default_value_t = 15, conflicts_with = "no_cs")]
    pub cs_line: u8,

    /// Chip-select was not sampled, rely on clock timing only
    #[arg(long)]
    pub no_cs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a recorded capture file
    Decode {
        /// Capture file
        #[arg(short, long)]
        input: PathBuf,

        /// Capture mode
        #[arg(short, long, value_enum, default_value_t = Mode::Spi)]
        mode: Mode,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        lines: LineArgs,

        /// Print a summary after the frames
        #[arg(long)]
        stats: bool,
    },

    /// List known opcodes
    Opcodes {
        /// Only show this command class
        #[arg(long)]
        class: Option<String>,
    },
}
