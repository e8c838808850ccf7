use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::entry::ArchiveEntry;
use crate::error::{Error, Result};
use crate::extract::{EntryVisitor, Flow, Visit};

pub(super) fn walk<R: Read + Seek>(
    reader: R,
    path: &Path,
    visitor: &mut dyn EntryVisitor,
) -> Result<()> {
    let mut archive = ZipArchive::new(reader).map_err(|e| Error::corrupt_archive(path, e))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::corrupt_archive(path, e))?;
        let record = ArchiveEntry::new(file.name(), file.is_dir(), file.size());
        match visitor.visit(&record)? {
            Visit::Skip => {}
            Visit::Read => {
                if let Flow::Stop = visitor.consume(&record, &mut file)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
