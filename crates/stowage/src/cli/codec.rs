use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use stowage_archive::{
    Codec, CompressionRequest, DEFAULT_BUFFER_SIZE, DecompressionRequest, SingleFileCodec,
};
use tracing::{error, info};

use super::CodecArg;

/// Compress each input into its own file
#[derive(Debug, clap::Args)]
pub struct Compress {
    #[arg(long, short, value_enum, default_value_t = CodecArg::Gzip)]
    pub codec: CodecArg,

    /// Output directory, or output file for a single input
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: u32,

    /// Delete each input once its output is complete
    #[arg(long)]
    pub remove: bool,

    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl Compress {
    pub fn run(self) -> Result<()> {
        let codec = Codec::from(self.codec);
        let failed = for_each_input(&self.inputs, |input| {
            let mut builder = CompressionRequest::builder(input)
                .buffer_size(self.buffer_size)
                .remove_input_on_success(self.remove);
            if let Some(output) = &self.output {
                builder = builder.output_target(output);
            }
            let output = codec.compress(&builder.build()?)?;
            Ok(output.path().map(Path::to_path_buf))
        });
        finish("compress", failed)
    }
}

/// Decompress each input next to itself or into another directory
#[derive(Debug, clap::Args)]
pub struct Decompress {
    /// Codec to use; guessed from each input's extension when omitted
    #[arg(long, short, value_enum)]
    pub codec: Option<CodecArg>,

    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Output file name, replacing the derived one
    #[arg(long)]
    pub filename: Option<String>,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: u32,

    #[arg(long)]
    pub remove: bool,

    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl Decompress {
    pub fn run(self) -> Result<()> {
        let failed = for_each_input(&self.inputs, |input| {
            let codec = match self.codec {
                Some(codec) => Codec::from(codec),
                None => Codec::from_path(input).with_context(|| {
                    format!("cannot tell the codec of '{}', pass --codec", input.display())
                })?,
            };

            let mut builder = DecompressionRequest::builder(input)
                .buffer_size(self.buffer_size)
                .remove_input_on_success(self.remove);
            if let Some(dir) = &self.output_dir {
                builder = builder.alternative_output_dir(dir);
            }
            if let Some(name) = &self.filename {
                builder = builder.alternative_filename(name);
            }
            let output = codec.decompress(&builder.build()?)?;
            Ok(output.path().map(Path::to_path_buf))
        });
        finish("decompress", failed)
    }
}

/// Runs `op` on every input, logging failures; returns how many failed.
fn for_each_input<F>(inputs: &[PathBuf], mut op: F) -> usize
where
    F: FnMut(&Path) -> Result<Option<PathBuf>>,
{
    let mut failed = 0;
    for input in inputs {
        match op(input) {
            Ok(Some(output)) => info!("'{}' -> '{}'", input.display(), output.display()),
            Ok(None) => {}
            Err(e) => {
                error!("'{}': {e:#}", input.display());
                failed += 1;
            }
        }
    }
    failed
}

fn finish(action: &str, failed: usize) -> Result<()> {
    if failed > 0 {
        bail!("failed to {action} {failed} input(s)");
    }
    Ok(())
}
