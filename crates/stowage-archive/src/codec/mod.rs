//! Single-file codecs.
//!
//! A [`Codec`] turns one input into one output. File inputs stream
//! file-to-file, in-memory inputs stream into a growable buffer; both go
//! through the same encoder/decoder and [`buffered_copy`](crate::copy::buffered_copy).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::copy::{CopyError, copy_tracked};
use crate::error::{Error, Result};
use crate::naming::{self, OutputNamingPolicy};
use crate::request::{
    CompressionRequest, DecompressionRequest, InputSource, OutputDescriptor, validate_buffer_size,
};

mod lzf;

pub use self::lzf::{LzfReader, LzfWriter, MAX_CHUNK_LEN};

/// Compress/decompress capability shared by every single-file codec.
pub trait SingleFileCodec {
    fn default_extension(&self) -> &str;
    fn compress(&self, request: &CompressionRequest) -> Result<OutputDescriptor>;
    fn decompress(&self, request: &DecompressionRequest) -> Result<OutputDescriptor>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Gzip,
    Bzip2,
    Lzf,
    Zstd,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Gzip, Codec::Bzip2, Codec::Lzf, Codec::Zstd];

    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Lzf => "lzf",
            Self::Zstd => "zstd",
        }
    }

    /// Extension used for output naming. Zstd keeps the legacy `.7z`.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
            Self::Lzf => ".lzf",
            Self::Zstd => ".7z",
        }
    }

    /// The codec whose extension `path` ends with.
    pub fn from_path(path: &Path) -> Option<Codec> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        Self::ALL.into_iter().find(|c| name.ends_with(c.extension()))
    }

    pub fn encoder<W: Write>(self, writer: W) -> io::Result<Encoder<W>> {
        Ok(match self {
            Self::Gzip => Encoder::Gzip(Box::new(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            Self::Bzip2 => Encoder::Bzip2(Box::new(bzip2::write::BzEncoder::new(
                writer,
                bzip2::Compression::default(),
            ))),
            Self::Lzf => Encoder::Lzf(LzfWriter::new(writer)),
            Self::Zstd => Encoder::Zstd(Box::new(zstd::stream::write::Encoder::new(
                writer,
                zstd::DEFAULT_COMPRESSION_LEVEL,
            )?)),
        })
    }

    pub fn decoder<R: Read>(self, reader: R) -> io::Result<Decoder<R>> {
        Ok(match self {
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            Self::Bzip2 => Decoder::Bzip2(Box::new(bzip2::read::MultiBzDecoder::new(reader))),
            Self::Lzf => Decoder::Lzf(LzfReader::new(reader)),
            Self::Zstd => Decoder::Zstd(Box::new(zstd::stream::read::Decoder::new(reader)?)),
        })
    }

    /// Bytes-to-bytes compression.
    pub fn compress_bytes(self, data: &[u8], buffer_size: u32) -> Result<Vec<u8>> {
        validate_buffer_size(buffer_size)?;
        let mut encoder = self.encoder(Vec::new())?;
        copy_tracked(&mut &data[..], &mut encoder, buffer_size).map_err(io::Error::from)?;
        Ok(encoder.finish()?)
    }

    /// Bytes-to-bytes decompression.
    pub fn decompress_bytes(self, data: &[u8], buffer_size: u32) -> Result<Vec<u8>> {
        validate_buffer_size(buffer_size)?;
        let mut decoder = self.decoder(data)?;
        let mut out = Vec::new();
        copy_tracked(&mut decoder, &mut out, buffer_size).map_err(|e| match e {
            CopyError::Read(source) => Error::CorruptBuffer {
                codec: self.name(),
                source,
            },
            CopyError::Write(source) => Error::Io(source),
        })?;
        Ok(out)
    }

    fn compress_file(self, input: &Path, output: &Path, buffer_size: u32) -> Result<u64> {
        let mut reader = File::open(input).map_err(|e| read_error(input, e))?;
        let file = File::create(output).map_err(|e| write_error(output, e))?;
        let writer = BufWriter::with_capacity(buffer_size as usize, file);
        let mut encoder = self.encoder(writer).map_err(|e| write_error(output, e))?;

        let copied = copy_tracked(&mut reader, &mut encoder, buffer_size).map_err(|e| match e {
            CopyError::Read(source) => read_error(input, source),
            CopyError::Write(source) => write_error(output, source),
        })?;

        let writer = encoder.finish().map_err(|e| write_error(output, e))?;
        close(writer, output)?;
        Ok(copied)
    }

    fn decompress_file(self, input: &Path, output: &Path, buffer_size: u32) -> Result<u64> {
        let file = File::open(input).map_err(|e| read_error(input, e))?;
        let reader = BufReader::with_capacity(buffer_size as usize, file);
        let mut decoder = self.decoder(reader).map_err(|e| read_error(input, e))?;
        let file = File::create(output).map_err(|e| write_error(output, e))?;
        let mut writer = BufWriter::with_capacity(buffer_size as usize, file);

        let copied = copy_tracked(&mut decoder, &mut writer, buffer_size).map_err(|e| match e {
            CopyError::Read(source) => Error::CorruptStream {
                codec: self.name(),
                path: input.to_path_buf(),
                source,
            },
            CopyError::Write(source) => write_error(output, source),
        })?;

        close(writer, output)?;
        Ok(copied)
    }
}

impl SingleFileCodec for Codec {
    fn default_extension(&self) -> &str {
        self.extension()
    }

    fn compress(&self, request: &CompressionRequest) -> Result<OutputDescriptor> {
        match request.source() {
            InputSource::FilePath(input) => {
                let output =
                    naming::compressed_path(input, request.output_target(), self.extension())?;
                reject_same_file(input, &output)?;
                let copied = self.compress_file(input, &output, request.buffer_size())?;
                debug!(
                    codec = self.name(),
                    bytes = copied,
                    "compressed '{}' to '{}'",
                    input.display(),
                    output.display()
                );
                if request.remove_input_on_success() {
                    remove_input(input)?;
                }
                Ok(OutputDescriptor::File(output))
            }
            InputSource::InMemoryBytes(data) => Ok(OutputDescriptor::Bytes(
                self.compress_bytes(data, request.buffer_size())?,
            )),
        }
    }

    fn decompress(&self, request: &DecompressionRequest) -> Result<OutputDescriptor> {
        match request.source() {
            InputSource::FilePath(input) => {
                let output = OutputNamingPolicy::new(self.extension())
                    .base_dir(request.base_dir().clone())
                    .filename_override(request.filename_override().map(str::to_string))
                    .decompressed_path(input)?;
                reject_same_file(input, &output)?;
                let copied = self.decompress_file(input, &output, request.buffer_size())?;
                debug!(
                    codec = self.name(),
                    bytes = copied,
                    "decompressed '{}' to '{}'",
                    input.display(),
                    output.display()
                );
                if request.remove_input_on_success() {
                    remove_input(input)?;
                }
                Ok(OutputDescriptor::File(output))
            }
            InputSource::InMemoryBytes(data) => Ok(OutputDescriptor::Bytes(
                self.decompress_bytes(data, request.buffer_size())?,
            )),
        }
    }
}

/// Output stream of a codec. `finish` must be called to complete the stream.
pub enum Encoder<W: Write> {
    Gzip(Box<flate2::write::GzEncoder<W>>),
    Bzip2(Box<bzip2::write::BzEncoder<W>>),
    Lzf(LzfWriter<W>),
    Zstd(Box<zstd::stream::write::Encoder<'static, W>>),
}

impl<W: Write> Encoder<W> {
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Gzip(e) => e.finish(),
            Self::Bzip2(e) => e.finish(),
            Self::Lzf(e) => e.finish(),
            Self::Zstd(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(e) => e.write(buf),
            Self::Bzip2(e) => e.write(buf),
            Self::Lzf(e) => e.write(buf),
            Self::Zstd(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(e) => e.flush(),
            Self::Bzip2(e) => e.flush(),
            Self::Lzf(e) => e.flush(),
            Self::Zstd(e) => e.flush(),
        }
    }
}

/// Input stream of a codec.
pub enum Decoder<R: Read> {
    Gzip(Box<flate2::read::MultiGzDecoder<R>>),
    Bzip2(Box<bzip2::read::MultiBzDecoder<R>>),
    Lzf(LzfReader<R>),
    Zstd(Box<zstd::stream::read::Decoder<'static, BufReader<R>>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
            Self::Lzf(d) => d.read(buf),
            Self::Zstd(d) => d.read(buf),
        }
    }
}

fn read_error(path: &Path, source: io::Error) -> Error {
    Error::Read {
        path: path.to_path_buf(),
        source,
    }
}

fn write_error(path: &Path, source: io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Flush and sync the destination; the handle is closed on return.
fn close(writer: BufWriter<File>, output: &Path) -> Result<()> {
    let file = writer
        .into_inner()
        .map_err(|e| write_error(output, e.into_error()))?;
    file.sync_all().map_err(|e| write_error(output, e))
}

fn reject_same_file(input: &Path, output: &Path) -> Result<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(Error::OutputIsInput(output.to_path_buf()));
    }
    Ok(())
}

fn remove_input(input: &Path) -> Result<()> {
    std::fs::remove_file(input).map_err(|e| Error::RemoveInput {
        path: input.to_path_buf(),
        source: e,
    })?;
    debug!("removed input '{}'", input.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> Vec<u8> {
        b"The quick brown fox jumps over the lazy dog. ".repeat(200)
    }

    #[test]
    fn extensions() {
        assert_eq!(Codec::Gzip.extension(), ".gz");
        assert_eq!(Codec::Bzip2.extension(), ".bz2");
        assert_eq!(Codec::Lzf.extension(), ".lzf");
        assert_eq!(Codec::Zstd.extension(), ".7z");
        assert_eq!(Codec::Gzip.default_extension(), ".gz");
    }

    #[test]
    fn codec_from_path() {
        assert_eq!(Codec::from_path(Path::new("a.txt.GZ")), Some(Codec::Gzip));
        assert_eq!(Codec::from_path(Path::new("a.bz2")), Some(Codec::Bzip2));
        assert_eq!(Codec::from_path(Path::new("a.7z")), Some(Codec::Zstd));
        assert_eq!(Codec::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn bytes_round_trip() {
        let data = sample();
        for codec in Codec::ALL {
            let compressed = codec.compress_bytes(&data, 64).unwrap();
            assert_ne!(compressed, data, "{codec:?}");
            let restored = codec.decompress_bytes(&compressed, 64).unwrap();
            assert_eq!(restored, data, "{codec:?}");
        }
    }

    #[test]
    fn gzip_output_is_standard_gzip() {
        let compressed = Codec::Gzip.compress_bytes(b"hello", 16).unwrap();
        assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
        let mut restored = String::new();
        flate2::read::GzDecoder::new(&compressed[..])
            .read_to_string(&mut restored)
            .unwrap();
        assert_eq!(restored, "hello");
    }

    #[test]
    fn garbage_is_a_format_error() {
        for codec in [Codec::Gzip, Codec::Bzip2, Codec::Lzf, Codec::Zstd] {
            let err = codec
                .decompress_bytes(b"definitely not compressed data", 16)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{codec:?}: {err}");
        }
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let err = Codec::Gzip.compress_bytes(b"x", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidBufferSize(0)));
    }

    #[test]
    fn bytes_request_returns_bytes() {
        let request = CompressionRequest::builder(sample()).build().unwrap();
        let output = Codec::Bzip2.compress(&request).unwrap();
        let compressed = output.into_bytes().unwrap();

        let request = DecompressionRequest::builder(compressed).build().unwrap();
        let output = Codec::Bzip2.decompress(&request).unwrap();
        assert_eq!(output.bytes(), Some(&sample()[..]));
    }

    #[test]
    fn output_equal_to_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, b"keep me").unwrap();
        let request = CompressionRequest::builder(input.as_path())
            .output_target(&input)
            .build()
            .unwrap();
        let err = Codec::Gzip.compress(&request).unwrap_err();
        assert!(matches!(err, Error::OutputIsInput(_)));
        assert_eq!(std::fs::read(&input).unwrap(), b"keep me");
    }
}
