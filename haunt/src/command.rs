//! The command line surface of `haunt`.

use std::num::ParseIntError;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use wraith::addr::parse_addr;

#[derive(Debug, Parser)]
#[command(version, about = "Watches Tetris for game overs and decodes its score counter")]
pub struct Args {
    /// A TOML file overriding the watch addresses, score address, or ROM digest.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Increase logging. Once for debug, twice for trace.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Checks that a ROM is the revision the watch addresses were recovered from.
    Verify { rom: PathBuf },
    /// Decodes the three score bytes, least significant first, e.g. `decode 73 64 01`.
    Decode {
        #[arg(value_parser = parse_byte, num_args = 3, required = true)]
        bytes: Vec<u8>,
    },
    /// Decodes the score counter out of a raw memory dump.
    Scan {
        dump: PathBuf,
        /// The address the first byte of the dump was read from.
        #[arg(long, value_parser = parse_addr, default_value = "0xC000")]
        base: u16,
    },
    /// Plays a recorded run through the watches and prints every game over.
    Replay {
        recording: PathBuf,
        /// Stop after this many frames, even if the recording is longer.
        #[arg(long)]
        frames: Option<usize>,
        /// Verify this ROM before replaying, as a live run would.
        #[arg(long)]
        rom: Option<PathBuf>,
    },
    /// Prints the config in effect.
    Config,
}

/// Score bytes are always written in hex, with or without a `0x` prefix.
fn parse_byte(input: &str) -> Result<u8, ParseIntError> {
    u8::from_str_radix(input.strip_prefix("0x").unwrap_or(input), 16)
}
