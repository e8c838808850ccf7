//! Archive creation.
//!
//! [`ArchiveWriter`] appends entries one at a time; [`create_archive`] drives
//! it from an [`ArchiveRequest`].

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::copy::CopyError;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::naming;
use crate::request::{ArchiveRequest, validate_buffer_size};

mod tar;
mod zip;

use self::tar::TarSink;
use self::zip::ZipSink;

enum Sink {
    Tar(TarSink),
    Zip(ZipSink),
}

/// Incremental archive writer.
///
/// The format comes from the output path's extension unless given with
/// [`ArchiveWriter::with_format`]. Nothing is complete until
/// [`finish`](ArchiveWriter::finish) returns.
pub struct ArchiveWriter {
    path: PathBuf,
    format: ArchiveFormat,
    sink: Sink,
    buffer_size: u32,
    entries: usize,
}

impl ArchiveWriter {
    pub fn create(path: impl Into<PathBuf>, buffer_size: u32) -> Result<Self> {
        let path = path.into();
        let format =
            ArchiveFormat::from_path(&path).ok_or_else(|| Error::UnsupportedOutput(path.clone()))?;
        Self::with_format(path, format, buffer_size)
    }

    pub fn with_format(
        path: impl Into<PathBuf>,
        format: ArchiveFormat,
        buffer_size: u32,
    ) -> Result<Self> {
        validate_buffer_size(buffer_size)?;
        if !format.is_writable() {
            return Err(Error::ReadOnlyFormat(format.name()));
        }
        if let ArchiveFormat::Tar(compress) = format {
            compress.ensure_available()?;
        }
        let path = naming::archive_path(&path.into())?;

        if path.exists() {
            warn!("overwriting existing archive '{}'", path.display());
        }
        let file = File::create(&path).map_err(|e| Error::Write {
            path: path.clone(),
            source: e,
        })?;

        let sink = match format {
            ArchiveFormat::Tar(compress) => Sink::Tar(TarSink::new(file, compress, buffer_size)?),
            ArchiveFormat::Zip => Sink::Zip(ZipSink::new(file, buffer_size)),
            ArchiveFormat::Rar => return Err(Error::ReadOnlyFormat(format.name())),
        };

        debug!(format = format.name(), "created archive '{}'", path.display());
        Ok(Self {
            path,
            format,
            sink,
            buffer_size,
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Append the contents of `file` under `name`. Returns the bytes stored.
    pub fn append_file(&mut self, name: &str, file: &Path) -> Result<u64> {
        if name.is_empty() {
            return Err(Error::EmptyEntryName);
        }
        let metadata = std::fs::metadata(file).map_err(|e| Error::Read {
            path: file.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(file.to_path_buf()));
        }
        if file.canonicalize().ok() == self.path.canonicalize().ok() {
            return Err(Error::OutputIsInput(self.path.clone()));
        }

        let mtime = metadata.modified().map(unix_seconds).unwrap_or(0);
        let mut reader = File::open(file).map_err(|e| Error::Read {
            path: file.to_path_buf(),
            source: e,
        })?;
        let copied = self
            .append(name, metadata.len(), mtime, &mut reader)
            .map_err(|e| match e {
                CopyError::Read(source) => Error::Read {
                    path: file.to_path_buf(),
                    source,
                },
                CopyError::Write(source) => Error::Write {
                    path: self.path.clone(),
                    source,
                },
            })?;
        debug!(bytes = copied, "added '{}' as '{name}'", file.display());
        Ok(copied)
    }

    /// Append an in-memory buffer under `name`.
    pub fn append_bytes(&mut self, name: &str, data: &[u8]) -> Result<u64> {
        if name.is_empty() {
            return Err(Error::EmptyEntryName);
        }
        let mtime = unix_seconds(SystemTime::now());
        let copied = self
            .append(name, data.len() as u64, mtime, &mut &data[..])
            .map_err(|e| Error::Write {
                path: self.path.clone(),
                source: e.into(),
            })?;
        debug!(bytes = copied, "added buffer as '{name}'");
        Ok(copied)
    }

    fn append(
        &mut self,
        name: &str,
        size: u64,
        mtime: u64,
        data: &mut dyn Read,
    ) -> std::result::Result<u64, CopyError> {
        let copied = match &mut self.sink {
            Sink::Tar(sink) => sink.append(name, size, mtime, data, self.buffer_size)?,
            Sink::Zip(sink) => sink.append(name, size, data, self.buffer_size)?,
        };
        self.entries += 1;
        Ok(copied)
    }

    /// Complete the archive and return its path.
    pub fn finish(self) -> Result<PathBuf> {
        let result = match self.sink {
            Sink::Tar(sink) => sink.finish(),
            Sink::Zip(sink) => sink.finish(),
        };
        result.map_err(|e| Error::Write {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(entries = self.entries, "finished archive '{}'", self.path.display());
        Ok(self.path)
    }
}

/// Create one archive holding every input, in input order.
///
/// Each entry is named by the request's strip rule. A failure aborts and
/// leaves the partial archive in place.
pub fn create_archive(request: &ArchiveRequest) -> Result<PathBuf> {
    let mut writer = ArchiveWriter::create(request.output(), request.buffer_size())?;
    for input in request.inputs() {
        let name = request.strip_rule().entry_name(input)?;
        writer.append_file(&name, input)?;
    }
    writer.finish()
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::format::TarCompress;

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveWriter::create(dir.path().join("out.bin"), 1024)
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnsupportedOutput(_)));
        assert!(!dir.path().join("out.bin").exists());
    }

    #[test]
    fn rar_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveWriter::create(dir.path().join("out.rar"), 1024)
            .err()
            .unwrap();
        assert!(matches!(err, Error::ReadOnlyFormat("rar")));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    #[cfg(not(feature = "xz"))]
    fn disabled_compression_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.tar.xz");
        std::fs::write(&path, b"previous contents").unwrap();

        let err = ArchiveWriter::create(&path, 1024).err().unwrap();
        assert!(matches!(err, Error::FeatureDisabled("xz")));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(std::fs::read(&path).unwrap(), b"previous contents");
    }

    #[test]
    fn empty_entry_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArchiveWriter::create(dir.path().join("out.zip"), 1024).unwrap();
        assert!(matches!(
            writer.append_bytes("", b"x"),
            Err(Error::EmptyEntryName)
        ));
        assert_eq!(writer.entry_count(), 0);
    }

    #[test]
    fn directories_are_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArchiveWriter::create(dir.path().join("out.tar"), 1024).unwrap();
        assert!(matches!(
            writer.append_file("d", dir.path()),
            Err(Error::NotAFile(_))
        ));
    }

    #[test]
    fn archive_cannot_contain_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tar");
        let mut writer = ArchiveWriter::create(&path, 1024).unwrap();
        assert!(matches!(
            writer.append_file("self", &path),
            Err(Error::OutputIsInput(_))
        ));
    }

    #[test]
    fn explicit_format_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.dat");
        let mut writer =
            ArchiveWriter::with_format(&path, ArchiveFormat::Tar(TarCompress::Gzip), 16).unwrap();
        writer.append_bytes("a.txt", b"alpha").unwrap();
        assert_eq!(writer.finish().unwrap(), path);
        assert_eq!(
            ArchiveFormat::resolve(&path).unwrap(),
            ArchiveFormat::Tar(TarCompress::Gzip)
        );
    }
}
