//! Bounded-buffer stream copy.

use std::io::{self, Read, Write};

/// Which side of a copy failed.
#[derive(Debug)]
pub(crate) enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

impl From<CopyError> for io::Error {
    fn from(err: CopyError) -> Self {
        match err {
            CopyError::Read(e) | CopyError::Write(e) => e,
        }
    }
}

/// Copy `reader` into `writer` through a buffer of `buffer_size` bytes.
///
/// Every chunk is written as soon as it is read, so memory use stays at one
/// buffer regardless of stream length. Returns the number of bytes copied.
/// The first error is returned unchanged.
pub fn buffered_copy<R, W>(reader: &mut R, writer: &mut W, buffer_size: u32) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    copy_tracked(reader, writer, buffer_size).map_err(io::Error::from)
}

pub(crate) fn copy_tracked<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: u32,
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if buffer_size == 0 {
        return Err(CopyError::Read(io::Error::new(
            io::ErrorKind::InvalidInput,
            "buffer size must be at least 1",
        )));
    }

    let mut buffer = vec![0u8; buffer_size as usize];
    let mut copied = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buffer[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "bad block"));
            }
            let n = self.remaining.min(buf.len());
            buf[..n].fill(b'x');
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn copies_everything() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        for buffer_size in [1, 7, 1024, 1 << 20] {
            let mut out = Vec::new();
            let n = buffered_copy(&mut Cursor::new(&data), &mut out, buffer_size).unwrap();
            assert_eq!(n, data.len() as u64);
            assert_eq!(out, data);
        }
    }

    #[test]
    fn empty_input_copies_nothing() {
        let mut out = Vec::new();
        let n = buffered_copy(&mut io::empty(), &mut out, 16).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let mut out = Vec::new();
        let err = buffered_copy(&mut Cursor::new(b"abc"), &mut out, 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn write_error_is_propagated() {
        let err = buffered_copy(&mut Cursor::new(b"abc"), &mut FailingWriter, 2).unwrap_err();
        assert_eq!(err.to_string(), "sink closed");
    }

    #[test]
    fn read_error_keeps_side() {
        let mut reader = FailingReader { remaining: 5 };
        let mut out = Vec::new();
        let err = copy_tracked(&mut reader, &mut out, 2).unwrap_err();
        assert!(matches!(err, CopyError::Read(ref e) if e.kind() == io::ErrorKind::InvalidData));
        assert_eq!(out.len(), 5);
    }
}
