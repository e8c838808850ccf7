use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use stowage_archive::Codec;

mod archive;
mod codec;

pub use archive::{Archive, Extract, ExtractEntry, List};
pub use codec::{Compress, Decompress};

#[derive(Debug, Parser)]
#[command(name = "stowage", version, about)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, short = 'l', global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Compress(Compress),
    Decompress(Decompress),
    Archive(Archive),
    Extract(Extract),
    ExtractEntry(ExtractEntry),
    #[command(visible_alias = "ls")]
    List(List),
}

impl Command {
    pub fn run(self) -> Result<()> {
        match self {
            Self::Compress(cmd) => cmd.run(),
            Self::Decompress(cmd) => cmd.run(),
            Self::Archive(cmd) => cmd.run(),
            Self::Extract(cmd) => cmd.run(),
            Self::ExtractEntry(cmd) => cmd.run(),
            Self::List(cmd) => cmd.run(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Gzip,
    Bzip2,
    Lzf,
    Zstd,
}

impl From<CodecArg> for Codec {
    fn from(value: CodecArg) -> Self {
        match value {
            CodecArg::Gzip => Codec::Gzip,
            CodecArg::Bzip2 => Codec::Bzip2,
            CodecArg::Lzf => Codec::Lzf,
            CodecArg::Zstd => Codec::Zstd,
        }
    }
}
