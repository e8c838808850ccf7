use std::io::Read;
use std::path::Path;

use crate::entry::ArchiveEntry;
use crate::error::{Error, Result};
use crate::extract::{EntryVisitor, Flow, Visit};
use crate::format::TarCompress;

/// Regular files and directories are reported; links and special entries
/// are passed over.
pub(super) fn walk<R: Read>(
    reader: R,
    compress: TarCompress,
    path: &Path,
    visitor: &mut dyn EntryVisitor,
) -> Result<()> {
    let mut archive = tar::Archive::new(compress.decoder(reader)?);
    let entries = archive
        .entries()
        .map_err(|e| Error::corrupt_archive(path, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| Error::corrupt_archive(path, e))?;
        let kind = entry.header().entry_type();
        if !kind.is_file() && !kind.is_dir() {
            continue;
        }

        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let record = ArchiveEntry::new(name, kind.is_dir(), entry.size());
        match visitor.visit(&record)? {
            Visit::Skip => {}
            Visit::Read => {
                if let Flow::Stop = visitor.consume(&record, &mut entry)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
