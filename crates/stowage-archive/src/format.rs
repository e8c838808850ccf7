use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::codec::{self, Codec};
use crate::detect::detect_from_reader;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Tar(TarCompress),
    Zip,
    /// Read-only.
    Rar,
}

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TarCompress {
    None,
    Gzip,
    Bzip2,
    Lzf,
    Zstd,
    Xz,
}

/// Longest suffixes first so `.tar.gz` wins over `.tar`.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tar.bz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tar.zst", ArchiveFormat::Tar(TarCompress::Zstd)),
    (".tar.7z", ArchiveFormat::Tar(TarCompress::Zstd)),
    (".tar.lzf", ArchiveFormat::Tar(TarCompress::Lzf)),
    (".tar.xz", ArchiveFormat::Tar(TarCompress::Xz)),
    (".tgz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tbz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tar", ArchiveFormat::Tar(TarCompress::None)),
    (".zip", ArchiveFormat::Zip),
    (".rar", ArchiveFormat::Rar),
];

impl ArchiveFormat {
    /// Format named by the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<ArchiveFormat> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|&(_, format)| format)
    }

    /// Format of an existing archive: extension first, then magic bytes.
    pub fn resolve(path: &Path) -> Result<ArchiveFormat> {
        if let Some(format) = Self::from_path(path) {
            return Ok(format);
        }
        let mut file = File::open(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        detect_from_reader(&mut file)
            .map_err(|e| Error::Read {
                path: path.to_path_buf(),
                source: e,
            })?
            .ok_or_else(|| Error::UnknownArchive(path.to_path_buf()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Tar(TarCompress::None) => "tar",
            Self::Tar(TarCompress::Gzip) => "tar.gz",
            Self::Tar(TarCompress::Bzip2) => "tar.bz2",
            Self::Tar(TarCompress::Lzf) => "tar.lzf",
            Self::Tar(TarCompress::Zstd) => "tar.zst",
            Self::Tar(TarCompress::Xz) => "tar.xz",
            Self::Zip => "zip",
            Self::Rar => "rar",
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Rar)
    }
}

impl TarCompress {
    fn codec(self) -> Option<Codec> {
        match self {
            Self::Gzip => Some(Codec::Gzip),
            Self::Bzip2 => Some(Codec::Bzip2),
            Self::Lzf => Some(Codec::Lzf),
            Self::Zstd => Some(Codec::Zstd),
            Self::None | Self::Xz => None,
        }
    }

    /// Fails when this compression was left out of the build.
    pub fn ensure_available(self) -> Result<()> {
        match self {
            #[cfg(not(feature = "xz"))]
            Self::Xz => Err(Error::FeatureDisabled("xz")),
            _ => Ok(()),
        }
    }

    pub fn decoder<R: Read>(self, reader: R) -> Result<TarDecoder<R>> {
        if let Some(codec) = self.codec() {
            return Ok(TarDecoder::Codec(codec.decoder(reader)?));
        }
        match self {
            #[cfg(feature = "xz")]
            Self::Xz => Ok(TarDecoder::Xz(Box::new(xz2::read::XzDecoder::new(reader)))),
            #[cfg(not(feature = "xz"))]
            Self::Xz => Err(Error::FeatureDisabled("xz")),
            _ => Ok(TarDecoder::Passthrough(reader)),
        }
    }

    pub fn encoder<W: Write>(self, writer: W) -> Result<TarEncoder<W>> {
        if let Some(codec) = self.codec() {
            return Ok(TarEncoder::Codec(codec.encoder(writer)?));
        }
        match self {
            #[cfg(feature = "xz")]
            Self::Xz => Ok(TarEncoder::Xz(Box::new(xz2::write::XzEncoder::new(
                writer, 6,
            )))),
            #[cfg(not(feature = "xz"))]
            Self::Xz => Err(Error::FeatureDisabled("xz")),
            _ => Ok(TarEncoder::Passthrough(writer)),
        }
    }
}

/// Decoder wrapper for reading a tar stream.
pub enum TarDecoder<R: Read> {
    Passthrough(R),
    Codec(codec::Decoder<R>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::read::XzDecoder<R>>),
}

impl<R: Read> Read for TarDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Codec(d) => d.read(buf),
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.read(buf),
        }
    }
}

/// Encoder wrapper for writing a tar stream.
pub enum TarEncoder<W: Write> {
    Passthrough(W),
    Codec(codec::Encoder<W>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::write::XzEncoder<W>>),
}

impl<W: Write> TarEncoder<W> {
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Passthrough(w) => Ok(w),
            Self::Codec(e) => e.finish(),
            #[cfg(feature = "xz")]
            Self::Xz(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for TarEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(w) => w.write(buf),
            Self::Codec(e) => e.write(buf),
            #[cfg(feature = "xz")]
            Self::Xz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Passthrough(w) => w.flush(),
            Self::Codec(e) => e.flush(),
            #[cfg(feature = "xz")]
            Self::Xz(e) => e.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        let cases = [
            ("a.tar", ArchiveFormat::Tar(TarCompress::None)),
            ("a.tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
            ("A.TGZ", ArchiveFormat::Tar(TarCompress::Gzip)),
            ("a.tar.bz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
            ("a.tar.zst", ArchiveFormat::Tar(TarCompress::Zstd)),
            ("a.tar.7z", ArchiveFormat::Tar(TarCompress::Zstd)),
            ("a.tar.lzf", ArchiveFormat::Tar(TarCompress::Lzf)),
            ("a.tar.xz", ArchiveFormat::Tar(TarCompress::Xz)),
            ("a.zip", ArchiveFormat::Zip),
            ("dir/a.rar", ArchiveFormat::Rar),
        ];
        for (name, expected) in cases {
            assert_eq!(ArchiveFormat::from_path(Path::new(name)), Some(expected), "{name}");
        }
    }

    #[test]
    fn single_file_extensions_are_not_archives() {
        for name in ["a.gz", "a.bz2", "a.7z", "a.lzf", "archive"] {
            assert_eq!(ArchiveFormat::from_path(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn rar_is_read_only() {
        assert!(!ArchiveFormat::Rar.is_writable());
        assert!(ArchiveFormat::Zip.is_writable());
        assert!(ArchiveFormat::Tar(TarCompress::Lzf).is_writable());
    }

    #[test]
    fn passthrough_codec() {
        let decoder = TarCompress::None.decoder(&b"raw"[..]).unwrap();
        assert!(matches!(decoder, TarDecoder::Passthrough(_)));
        let encoder = TarCompress::None.encoder(Vec::new()).unwrap();
        assert!(matches!(encoder, TarEncoder::Passthrough(_)));
    }

    #[test]
    fn compressed_tar_stream_round_trip() {
        for compress in [
            TarCompress::Gzip,
            TarCompress::Bzip2,
            TarCompress::Lzf,
            TarCompress::Zstd,
        ] {
            let mut encoder = compress.encoder(Vec::new()).unwrap();
            encoder.write_all(b"tar bytes").unwrap();
            let encoded = encoder.finish().unwrap();

            let mut decoded = Vec::new();
            compress
                .decoder(&encoded[..])
                .unwrap()
                .read_to_end(&mut decoded)
                .unwrap();
            assert_eq!(decoded, b"tar bytes", "{compress:?}");
        }
    }

    #[test]
    #[cfg(not(feature = "xz"))]
    fn xz_needs_feature() {
        assert!(matches!(
            TarCompress::Xz.ensure_available(),
            Err(Error::FeatureDisabled("xz"))
        ));
        assert!(TarCompress::Gzip.ensure_available().is_ok());
        assert!(matches!(
            TarCompress::Xz.encoder(Vec::new()),
            Err(Error::FeatureDisabled("xz"))
        ));
    }

    #[test]
    fn resolve_falls_back_to_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.bin");
        std::fs::write(&path, Codec::Gzip.compress_bytes(b"x", 16).unwrap()).unwrap();
        assert_eq!(
            ArchiveFormat::resolve(&path).unwrap(),
            ArchiveFormat::Tar(TarCompress::Gzip)
        );

        std::fs::write(&path, b"plain text").unwrap();
        assert!(matches!(
            ArchiveFormat::resolve(&path),
            Err(Error::UnknownArchive(_))
        ));
    }
}
