use std::path::PathBuf;

use crate::format::ArchiveFormat;

/// One entry as seen inside an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full in-archive name, `/`-separated.
    pub name: String,
    pub is_directory: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, is_directory: bool, size: u64) -> Self {
        Self {
            name: name.into(),
            is_directory,
            size,
        }
    }

    /// Last non-empty `/`-separated component of the name.
    pub fn basename(&self) -> &str {
        self.name
            .rsplit('/')
            .find(|part| !part.is_empty())
            .unwrap_or("")
    }
}

/// Outcome of an extraction.
#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    /// Written file paths in processing order.
    pub files: Vec<PathBuf>,
    pub total_bytes: u64,
}

impl ArchiveReport {
    pub(crate) fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            files: Vec::new(),
            total_bytes: 0,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_of_nested_entry() {
        assert_eq!(ArchiveEntry::new("sub/dir/a.txt", false, 3).basename(), "a.txt");
        assert_eq!(ArchiveEntry::new("a.txt", false, 3).basename(), "a.txt");
        assert_eq!(ArchiveEntry::new("sub/dir/", true, 0).basename(), "dir");
        assert_eq!(ArchiveEntry::new("/", true, 0).basename(), "");
    }

    #[test]
    fn empty_report() {
        let report = ArchiveReport::new(ArchiveFormat::Zip);
        assert_eq!(report.file_count(), 0);
        assert_eq!(report.total_bytes, 0);
    }
}
