use std::io::{self, Read, Seek};

use crate::format::{ArchiveFormat, TarCompress};

const TAR_MAGIC_OFFSET: usize = 257;

/// Archive format from leading bytes. Compressed streams are assumed to hold a tar.
pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        _ if is_zip(data) => Some(ArchiveFormat::Zip),
        [b'R', b'a', b'r', b'!', 0x1A, 0x07, ..] => Some(ArchiveFormat::Rar),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Tar(TarCompress::Gzip)),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(ArchiveFormat::Tar(TarCompress::Zstd)),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::Tar(TarCompress::Xz)),
        [b'B', b'Z', b'h', ..] => Some(ArchiveFormat::Tar(TarCompress::Bzip2)),
        [b'Z', b'V', 0 | 1, ..] => Some(ArchiveFormat::Tar(TarCompress::Lzf)),
        _ if is_tar_header(data) => Some(ArchiveFormat::Tar(TarCompress::None)),
        _ => None,
    }
}

/// Local file header or the end-of-central-directory record of an empty zip.
pub fn is_zip(data: &[u8]) -> bool {
    matches!(data, [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..])
}

/// POSIX `ustar\0` and GNU `ustar ` both start with `ustar`.
fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 512 && data[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == *b"ustar"
}

/// Sniff up to one tar block, then rewind.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut header = Vec::with_capacity(512);
    reader.by_ref().take(512).read_to_end(&mut header)?;
    reader.rewind()?;
    Ok(detect_format(&header))
}
