//! LZF chunked stream framing.
//!
//! Each chunk starts with `ZV` and a type byte. Stored chunks (type 0) carry
//! a big-endian `u16` length and the raw bytes; compressed chunks (type 1)
//! carry the compressed length, the original length and the LZF block.

use std::io::{self, Read, Write};

const MAGIC: [u8; 2] = *b"ZV";
const CHUNK_STORED: u8 = 0;
const CHUNK_COMPRESSED: u8 = 1;

/// Largest payload a single chunk can describe.
pub const MAX_CHUNK_LEN: usize = 0xFFFF;

pub struct LzfWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> LzfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(MAX_CHUNK_LEN),
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.write_chunk()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_chunk(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let len = self.pending.len() as u16;
        match lzf::compress(&self.pending) {
            Ok(block) if block.len() < self.pending.len() => {
                let [c0, c1] = (block.len() as u16).to_be_bytes();
                let [u0, u1] = len.to_be_bytes();
                self.inner
                    .write_all(&[MAGIC[0], MAGIC[1], CHUNK_COMPRESSED, c0, c1, u0, u1])?;
                self.inner.write_all(&block)?;
            }
            // incompressible
            _ => {
                let [l0, l1] = len.to_be_bytes();
                self.inner
                    .write_all(&[MAGIC[0], MAGIC[1], CHUNK_STORED, l0, l1])?;
                self.inner.write_all(&self.pending)?;
            }
        }

        self.pending.clear();
        Ok(())
    }
}

impl<W: Write> Write for LzfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let take = (MAX_CHUNK_LEN - self.pending.len()).min(buf.len());
        self.pending.extend_from_slice(&buf[..take]);
        if self.pending.len() == MAX_CHUNK_LEN {
            self.write_chunk()?;
        }
        Ok(take)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_chunk()?;
        self.inner.flush()
    }
}

pub struct LzfReader<R: Read> {
    inner: R,
    chunk: Vec<u8>,
    pos: usize,
}

impl<R: Read> LzfReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            chunk: Vec::new(),
            pos: 0,
        }
    }

    /// Loads the next chunk; `false` on a clean end of stream.
    fn next_chunk(&mut self) -> io::Result<bool> {
        let mut header = [0u8; 5];
        if !self.read_first_byte(&mut header[0])? {
            return Ok(false);
        }
        self.inner.read_exact(&mut header[1..])?;
        if header[..2] != MAGIC {
            return Err(invalid("missing LZF chunk signature"));
        }

        let len = u16::from_be_bytes([header[3], header[4]]) as usize;
        match header[2] {
            CHUNK_STORED => {
                self.chunk.resize(len, 0);
                self.inner.read_exact(&mut self.chunk)?;
            }
            CHUNK_COMPRESSED => {
                let mut original = [0u8; 2];
                self.inner.read_exact(&mut original)?;
                let original = u16::from_be_bytes(original) as usize;
                let mut block = vec![0u8; len];
                self.inner.read_exact(&mut block)?;
                self.chunk = lzf::decompress(&block, original)
                    .map_err(|e| invalid(&format!("LZF block: {e:?}")))?;
                if self.chunk.len() != original {
                    return Err(invalid("LZF block length mismatch"));
                }
            }
            other => return Err(invalid(&format!("unknown LZF chunk type {other}"))),
        }

        self.pos = 0;
        Ok(true)
    }

    fn read_first_byte(&mut self, byte: &mut u8) -> io::Result<bool> {
        loop {
            match self.inner.read(std::slice::from_mut(byte)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for LzfReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.chunk.len() {
            if !self.next_chunk()? {
                return Ok(0);
            }
        }
        let n = (self.chunk.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}
