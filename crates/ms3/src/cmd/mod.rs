use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod command;
pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode hex-encoded MS3 capture data into messages.
    Decode(DecodeArgs),
    /// Encode a full frame from a flag byte and a hex body.
    Encode(EncodeArgs),
    /// Encode a flag-only outbound command frame.
    Command(CommandArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Command(args) => command::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded wire data. Reads stdin when neither this nor --file is given.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read hex-encoded wire data from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Replay the input in fixed-size chunks to exercise reassembly.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,
    /// Exit with a failure code unless exactly N messages decode.
    #[arg(long, value_name = "N")]
    pub expect: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Flag byte, two hex digits (e.g. 01).
    #[arg(long, short = 'f')]
    pub flag: String,
    /// Hex-encoded body (at least one byte).
    pub body: String,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Flag byte, two hex digits (e.g. 52).
    #[arg(long, short = 'f')]
    pub flag: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
