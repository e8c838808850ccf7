use std::path::Path;

use unrar::Archive;

use crate::entry::ArchiveEntry;
use crate::error::{Error, Result};
use crate::extract::{EntryVisitor, Flow, Visit};

/// The unrar cursor hands out whole entries, so a selected entry is
/// buffered in memory before it reaches the visitor.
pub(super) fn walk(path: &Path, visitor: &mut dyn EntryVisitor) -> Result<()> {
    let mut cursor = Archive::new(path)
        .open_for_processing()
        .map_err(|e| Error::corrupt_archive(path, e))?;

    loop {
        let Some(header) = cursor
            .read_header()
            .map_err(|e| Error::corrupt_archive(path, e))?
        else {
            break;
        };

        let record = {
            let entry = header.entry();
            let name = entry.filename.to_string_lossy().replace('\\', "/");
            ArchiveEntry::new(name, entry.is_directory(), entry.unpacked_size)
        };

        cursor = match visitor.visit(&record)? {
            Visit::Skip => header
                .skip()
                .map_err(|e| Error::corrupt_archive(path, e))?,
            Visit::Read => {
                let (data, rest) = header
                    .read()
                    .map_err(|e| Error::corrupt_archive(path, e))?;
                if let Flow::Stop = visitor.consume(&record, &mut data.as_slice())? {
                    break;
                }
                rest
            }
        };
    }
    Ok(())
}
