use std::io;
use std::path::PathBuf;

/// Coarse classification of a failure.
///
/// Callers processing many items log the message and move on; the kind tells
/// them whether retrying with other settings could help.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad options, detected before any I/O.
    Configuration,
    /// Stream read/write failure.
    Io,
    /// Corrupt or unsupported compressed/archive data.
    Format,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("buffer size must be at least 1, got {0}")]
    InvalidBufferSize(u32),

    #[error("failed to create output directory '{path}': {source}")]
    OutputDirectory { path: PathBuf, source: io::Error },

    #[error("output directory '{0}' does not exist")]
    MissingOutputDirectory(PathBuf),

    #[error("output '{0}' would overwrite its own input")]
    OutputIsInput(PathBuf),

    #[error("archive entry name must not be empty")]
    EmptyEntryName,

    #[error("'{0}' is not a regular file")]
    NotAFile(PathBuf),

    #[error("'{0}' has no file name")]
    MissingFileName(PathBuf),

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: Box<regex::Error>,
    },

    #[error("no archive format matches the extension of '{0}'")]
    UnsupportedOutput(PathBuf),

    #[error("{0} archives are read-only")]
    ReadOnlyFormat(&'static str),

    #[error("{0} support was not compiled in")]
    FeatureDisabled(&'static str),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to remove input '{path}': {source}")]
    RemoveInput { path: PathBuf, source: io::Error },

    #[error("corrupt or unsupported {codec} data in '{path}': {source}")]
    CorruptStream {
        codec: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("corrupt or unsupported {codec} data in memory buffer: {source}")]
    CorruptBuffer {
        codec: &'static str,
        source: io::Error,
    },

    #[error("archive '{path}' is corrupted: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("cannot recognize the archive format of '{0}'")]
    UnknownArchive(PathBuf),

    #[error("entry '{entry}' resolves outside of '{base}'")]
    EntryEscapes { entry: String, base: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBufferSize(_)
            | Self::OutputDirectory { .. }
            | Self::MissingOutputDirectory(_)
            | Self::OutputIsInput(_)
            | Self::EmptyEntryName
            | Self::NotAFile(_)
            | Self::MissingFileName(_)
            | Self::InvalidPattern { .. }
            | Self::UnsupportedOutput(_)
            | Self::ReadOnlyFormat(_)
            | Self::FeatureDisabled(_) => ErrorKind::Configuration,
            Self::Read { .. } | Self::Write { .. } | Self::RemoveInput { .. } | Self::Io(_) => {
                ErrorKind::Io
            }
            Self::CorruptStream { .. }
            | Self::CorruptBuffer { .. }
            | Self::CorruptArchive { .. }
            | Self::UnknownArchive(_)
            | Self::EntryEscapes { .. } => ErrorKind::Format,
        }
    }

    pub(crate) fn corrupt_archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
