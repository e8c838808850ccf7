use std::fs::File;
use std::io::{self, BufWriter, Read};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::copy::{CopyError, copy_tracked};

/// Entries larger than this need zip64 extra fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

pub(super) struct ZipSink {
    writer: ZipWriter<BufWriter<File>>,
}

impl ZipSink {
    pub(super) fn new(file: File, buffer_size: u32) -> Self {
        Self {
            writer: ZipWriter::new(BufWriter::with_capacity(buffer_size as usize, file)),
        }
    }

    pub(super) fn append(
        &mut self,
        name: &str,
        size: u64,
        data: &mut dyn Read,
        buffer_size: u32,
    ) -> Result<u64, CopyError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size >= ZIP64_THRESHOLD);
        self.writer
            .start_file(name, options)
            .map_err(|e| CopyError::Write(io::Error::other(e)))?;
        copy_tracked(data, &mut self.writer, buffer_size)
    }

    /// Write the central directory and sync.
    pub(super) fn finish(self) -> io::Result<()> {
        let writer = self.writer.finish().map_err(io::Error::other)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}
