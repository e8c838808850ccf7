use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use tar::{Builder, EntryType, Header};

use crate::copy::{CopyError, copy_tracked};
use crate::error::Result;
use crate::format::{TarCompress, TarEncoder};

const NAME_FIELD_LEN: usize = 100;
const BLOCK_LEN: u64 = 512;
const LONG_LINK_NAME: &str = "././@LongLink";

/// Tar writer that keeps entry names byte-for-byte.
///
/// Names longer than the header's 100-byte field are preceded by a GNU
/// long-name record, so nothing is truncated and absolute names survive.
pub(super) struct TarSink {
    builder: Builder<TarEncoder<BufWriter<File>>>,
}

impl TarSink {
    pub(super) fn new(file: File, compress: TarCompress, buffer_size: u32) -> Result<Self> {
        let writer = BufWriter::with_capacity(buffer_size as usize, file);
        Ok(Self {
            builder: Builder::new(compress.encoder(writer)?),
        })
    }

    pub(super) fn append(
        &mut self,
        name: &str,
        size: u64,
        mtime: u64,
        data: &mut dyn Read,
        buffer_size: u32,
    ) -> std::result::Result<u64, CopyError> {
        let name = name.as_bytes();
        if name.len() > NAME_FIELD_LEN {
            self.append_long_name(name).map_err(CopyError::Write)?;
        }

        let mut header = Header::new_gnu();
        let len = name.len().min(NAME_FIELD_LEN);
        header.as_old_mut().name[..len].copy_from_slice(&name[..len]);
        header.set_size(size);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();

        let out = self.builder.get_mut();
        out.write_all(header.as_bytes()).map_err(CopyError::Write)?;
        let copied = copy_tracked(&mut data.take(size), out, buffer_size)?;
        if copied != size {
            return Err(CopyError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {size} bytes, input ended after {copied}"),
            )));
        }
        pad_block(out, size).map_err(CopyError::Write)?;
        Ok(copied)
    }

    fn append_long_name(&mut self, name: &[u8]) -> io::Result<()> {
        let mut data = Vec::with_capacity(name.len() + 1);
        data.extend_from_slice(name);
        data.push(0);

        let mut header = Header::new_gnu();
        header.set_path(LONG_LINK_NAME)?;
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_size(data.len() as u64);
        header.set_entry_type(EntryType::GNULongName);
        header.set_cksum();
        self.builder.append(&header, data.as_slice())
    }

    /// Write the end-of-archive blocks, finish compression and sync.
    pub(super) fn finish(self) -> io::Result<()> {
        let encoder = self.builder.into_inner()?;
        let writer = encoder.finish()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

fn pad_block<W: Write + ?Sized>(out: &mut W, size: u64) -> io::Result<()> {
    let remaining = ((BLOCK_LEN - size % BLOCK_LEN) % BLOCK_LEN) as usize;
    out.write_all(&[0u8; BLOCK_LEN as usize][..remaining])
}
