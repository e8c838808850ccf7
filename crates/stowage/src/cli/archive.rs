use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use stowage_archive::{
    ArchiveRequest, DEFAULT_BUFFER_SIZE, ExtractionRequest, create_archive, extract,
    extract_entry, list_entries,
};
use tracing::info;

/// Pack files into one archive; the format follows the output extension
#[derive(Debug, clap::Args)]
pub struct Archive {
    pub output: PathBuf,

    /// Regex removed from each input's absolute parent directory
    #[arg(long, default_value = "")]
    pub strip: String,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: u32,

    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl Archive {
    pub fn run(self) -> Result<()> {
        let request = ArchiveRequest::builder(&self.output)
            .inputs(&self.inputs)
            .strip_rule(self.strip)
            .buffer_size(self.buffer_size)
            .build()?;
        let output = create_archive(&request)
            .with_context(|| format!("failed to create '{}'", self.output.display()))?;
        info!("archived {} file(s) into '{}'", self.inputs.len(), output.display());
        Ok(())
    }
}

/// Extract the entries of an archive
#[derive(Debug, clap::Args)]
pub struct Extract {
    pub archive: PathBuf,

    pub output_dir: PathBuf,

    /// Regex matched against each entry's full name
    #[arg(long, default_value = "")]
    pub pattern: String,

    /// Extract the entries that do not match
    #[arg(long)]
    pub invert: bool,

    /// Keep the archive's directory layout instead of flattening
    #[arg(long)]
    pub restore_dirs: bool,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: u32,
}

impl Extract {
    pub fn run(self) -> Result<()> {
        let request = ExtractionRequest::builder(&self.archive, &self.output_dir)
            .pattern(self.pattern)
            .invert(self.invert)
            .restore_directory_structure(self.restore_dirs)
            .buffer_size(self.buffer_size)
            .build()?;
        let report = extract(&request)
            .with_context(|| format!("failed to extract '{}'", self.archive.display()))?;
        for file in &report.files {
            println!("{}", file.display());
        }
        info!(
            "extracted {} file(s), {} bytes from {} archive",
            report.file_count(),
            report.total_bytes,
            report.format.name()
        );
        Ok(())
    }
}

/// Extract a single entry to a given file
#[derive(Debug, clap::Args)]
pub struct ExtractEntry {
    pub archive: PathBuf,

    /// Full entry name inside the archive
    pub entry: String,

    pub output: PathBuf,

    /// Create missing parent directories of the output
    #[arg(long)]
    pub create_dirs: bool,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: u32,
}

impl ExtractEntry {
    pub fn run(self) -> Result<()> {
        let found = extract_entry(
            &self.archive,
            &self.entry,
            &self.output,
            self.create_dirs,
            self.buffer_size,
        )
        .with_context(|| format!("failed to extract '{}'", self.archive.display()))?;
        if !found {
            bail!("'{}' has no entry '{}'", self.archive.display(), self.entry);
        }
        info!("'{}' -> '{}'", self.entry, self.output.display());
        Ok(())
    }
}

/// List the entries of an archive
#[derive(Debug, clap::Args)]
pub struct List {
    pub archive: PathBuf,

    /// Include directory entries
    #[arg(long)]
    pub dirs: bool,
}

impl List {
    pub fn run(self) -> Result<()> {
        let entries = list_entries(&self.archive, self.dirs)
            .with_context(|| format!("failed to read '{}'", self.archive.display()))?;
        for entry in entries {
            if entry.is_directory {
                println!("{}", entry.name);
            } else {
                println!("{}\t{}", entry.size, entry.name);
            }
        }
        Ok(())
    }
}
