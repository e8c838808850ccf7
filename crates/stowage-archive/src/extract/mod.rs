//! Archive reading: extraction, single-entry extraction and listing.
//!
//! Every format walks its entries in archive order and hands each one to an
//! [`EntryVisitor`], which decides whether the entry's bytes are read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::copy::{CopyError, copy_tracked};
use crate::entry::{ArchiveEntry, ArchiveReport};
use crate::error::{Error, Result};
use crate::filter::ExtractionFilter;
use crate::format::ArchiveFormat;
use crate::naming::{ensure_dir, ensure_parent};
use crate::request::{ExtractionRequest, validate_buffer_size};
use crate::sanitize::{flattened_target, restored_target};

#[cfg(feature = "rar")]
mod rar;
mod tar;
mod zip;

pub(crate) enum Visit {
    Skip,
    Read,
}

pub(crate) enum Flow {
    Continue,
    Stop,
}

pub(crate) trait EntryVisitor {
    fn visit(&mut self, entry: &ArchiveEntry) -> Result<Visit>;

    /// Called after `visit` returned [`Visit::Read`].
    fn consume(&mut self, entry: &ArchiveEntry, data: &mut dyn Read) -> Result<Flow>;
}

/// Drive `visitor` over the entries of the archive at `path`.
fn walk(path: &Path, format: ArchiveFormat, visitor: &mut dyn EntryVisitor) -> Result<()> {
    match format {
        ArchiveFormat::Tar(compress) => {
            tar::walk(BufReader::new(open(path)?), compress, path, visitor)
        }
        ArchiveFormat::Zip => zip::walk(BufReader::new(open(path)?), path, visitor),
        #[cfg(feature = "rar")]
        ArchiveFormat::Rar => rar::walk(path, visitor),
        #[cfg(not(feature = "rar"))]
        ArchiveFormat::Rar => Err(Error::FeatureDisabled("rar")),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Extract the entries selected by the request's filter.
///
/// Processing stops at the first failure; files already written stay.
pub fn extract(request: &ExtractionRequest) -> Result<ArchiveReport> {
    let archive = request.archive();
    let format = ArchiveFormat::resolve(archive)?;
    let output_dir = std::path::absolute(request.output_dir()).map_err(|e| {
        Error::OutputDirectory {
            path: request.output_dir().to_path_buf(),
            source: e,
        }
    })?;
    ensure_dir(&output_dir)?;

    let mut extractor = Extractor {
        archive,
        output_dir,
        filter: request.filter(),
        buffer_size: request.buffer_size(),
        report: ArchiveReport::new(format),
    };
    walk(archive, format, &mut extractor)?;

    let report = extractor.report;
    debug!(
        format = format.name(),
        files = report.file_count(),
        bytes = report.total_bytes,
        "extracted '{}'",
        archive.display()
    );
    Ok(report)
}

struct Extractor<'a> {
    archive: &'a Path,
    output_dir: PathBuf,
    filter: &'a ExtractionFilter,
    buffer_size: u32,
    report: ArchiveReport,
}

impl EntryVisitor for Extractor<'_> {
    fn visit(&mut self, entry: &ArchiveEntry) -> Result<Visit> {
        if !self.filter.accepts(&entry.name) {
            return Ok(Visit::Skip);
        }
        if entry.is_directory {
            if self.filter.restores_directories() {
                ensure_dir(&restored_target(&self.output_dir, &entry.name)?)?;
            }
            return Ok(Visit::Skip);
        }
        Ok(Visit::Read)
    }

    fn consume(&mut self, entry: &ArchiveEntry, data: &mut dyn Read) -> Result<Flow> {
        let target = if self.filter.restores_directories() {
            let target = restored_target(&self.output_dir, &entry.name)?;
            ensure_parent(&target)?;
            target
        } else {
            flattened_target(&self.output_dir, &entry.name)?
        };

        let copied = write_entry(data, &target, self.archive, self.buffer_size)?;
        debug!(bytes = copied, "extracted '{}' to '{}'", entry.name, target.display());
        self.report.total_bytes += copied;
        self.report.files.push(target);
        Ok(Flow::Continue)
    }
}

/// Write one entry named exactly `entry_name` to `output`.
///
/// Returns `false` when the archive has no such file entry. Without
/// `create_dirs` the parent of `output` must already exist.
pub fn extract_entry(
    archive: &Path,
    entry_name: &str,
    output: &Path,
    create_dirs: bool,
    buffer_size: u32,
) -> Result<bool> {
    validate_buffer_size(buffer_size)?;
    if create_dirs {
        ensure_parent(output)?;
    } else if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(Error::MissingOutputDirectory(parent.to_path_buf()));
        }
    }

    let format = ArchiveFormat::resolve(archive)?;
    let mut single = SingleEntry {
        archive,
        entry_name,
        output,
        buffer_size,
        found: false,
    };
    walk(archive, format, &mut single)?;
    if !single.found {
        debug!("'{}' has no entry '{entry_name}'", archive.display());
    }
    Ok(single.found)
}

struct SingleEntry<'a> {
    archive: &'a Path,
    entry_name: &'a str,
    output: &'a Path,
    buffer_size: u32,
    found: bool,
}

impl EntryVisitor for SingleEntry<'_> {
    fn visit(&mut self, entry: &ArchiveEntry) -> Result<Visit> {
        if !entry.is_directory && entry.name == self.entry_name {
            Ok(Visit::Read)
        } else {
            Ok(Visit::Skip)
        }
    }

    fn consume(&mut self, entry: &ArchiveEntry, data: &mut dyn Read) -> Result<Flow> {
        let copied = write_entry(data, self.output, self.archive, self.buffer_size)?;
        debug!(bytes = copied, "extracted '{}' to '{}'", entry.name, self.output.display());
        self.found = true;
        Ok(Flow::Stop)
    }
}

/// Entries of an archive in archive order.
pub fn list_entries(archive: &Path, include_directories: bool) -> Result<Vec<ArchiveEntry>> {
    let format = ArchiveFormat::resolve(archive)?;
    let mut lister = Lister {
        include_directories,
        entries: Vec::new(),
    };
    walk(archive, format, &mut lister)?;
    Ok(lister.entries)
}

struct Lister {
    include_directories: bool,
    entries: Vec<ArchiveEntry>,
}

impl EntryVisitor for Lister {
    fn visit(&mut self, entry: &ArchiveEntry) -> Result<Visit> {
        if self.include_directories || !entry.is_directory {
            self.entries.push(entry.clone());
        }
        Ok(Visit::Skip)
    }

    fn consume(&mut self, _entry: &ArchiveEntry, _data: &mut dyn Read) -> Result<Flow> {
        Ok(Flow::Continue)
    }
}

/// Stream an entry to `target`. Failures reading the entry count as corrupt data.
fn write_entry(data: &mut dyn Read, target: &Path, archive: &Path, buffer_size: u32) -> Result<u64> {
    let write_error = |source| Error::Write {
        path: target.to_path_buf(),
        source,
    };
    let file = File::create(target).map_err(write_error)?;
    let mut writer = BufWriter::with_capacity(buffer_size as usize, file);
    let copied = copy_tracked(data, &mut writer, buffer_size).map_err(|e| match e {
        CopyError::Read(source) => Error::corrupt_archive(archive, source),
        CopyError::Write(source) => write_error(source),
    })?;
    writer
        .into_inner()
        .map_err(|e| write_error(e.into_error()))?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::ArchiveWriter;
    use crate::error::ErrorKind;

    fn sample_zip(dir: &Path) -> PathBuf {
        let path = dir.join("sample.zip");
        let mut writer = ArchiveWriter::create(&path, 1024).unwrap();
        writer.append_bytes("a.txt", b"first").unwrap();
        writer.append_bytes("b.csv", b"x,y").unwrap();
        writer.append_bytes("sub/a.txt", b"second").unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn missing_parent_without_create_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let archive = sample_zip(dir.path());
        let output = dir.path().join("missing/out.txt");
        let err = extract_entry(&archive, "a.txt", &output, false, 1024).unwrap_err();
        assert!(matches!(err, Error::MissingOutputDirectory(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        assert!(extract_entry(&archive, "a.txt", &output, true, 1024).unwrap());
        assert_eq!(std::fs::read(&output).unwrap(), b"first");
    }

    #[test]
    fn single_entry_matches_full_name() {
        let dir = tempfile::tempdir().unwrap();
        let archive = sample_zip(dir.path());
        let output = dir.path().join("out.txt");
        assert!(extract_entry(&archive, "sub/a.txt", &output, false, 1).unwrap());
        assert_eq!(std::fs::read(&output).unwrap(), b"second");
        assert!(!extract_entry(&archive, "nope.txt", &output, false, 1).unwrap());
    }

    #[test]
    fn listing_keeps_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = sample_zip(dir.path());
        let names: Vec<_> = list_entries(&archive, false)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["a.txt", "b.csv", "sub/a.txt"]);
    }

    #[test]
    fn escaping_entry_aborts_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evil.zip");
        let mut writer = ArchiveWriter::create(&path, 1024).unwrap();
        writer.append_bytes("../outside.txt", b"x").unwrap();
        writer.finish().unwrap();

        let request = ExtractionRequest::builder(&path, dir.path().join("out"))
            .restore_directory_structure(true)
            .build()
            .unwrap();
        let err = extract(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(!dir.path().join("outside.txt").exists());
    }

    #[test]
    fn unrecognized_archive_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.bin");
        std::fs::write(&path, b"just text").unwrap();
        let err = list_entries(&path, true).unwrap_err();
        assert!(matches!(err, Error::UnknownArchive(_)));
    }
}
