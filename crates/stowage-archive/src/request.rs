//! Immutable per-call requests.
//!
//! A request is assembled with its builder, validated once by `build()` and
//! never changes afterwards. Nothing carries over from one call to the next.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filter::ExtractionFilter;
use crate::naming::{BaseDir, PathStripRule};

/// Buffer size used when a request does not set one.
pub const DEFAULT_BUFFER_SIZE: u32 = 1024;

pub(crate) fn validate_buffer_size(buffer_size: u32) -> Result<()> {
    if buffer_size == 0 {
        return Err(Error::InvalidBufferSize(buffer_size));
    }
    Ok(())
}

/// Where the bytes of a single-file operation come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    FilePath(PathBuf),
    InMemoryBytes(Vec<u8>),
}

impl InputSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FilePath(path) => Some(path),
            Self::InMemoryBytes(_) => None,
        }
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        Self::FilePath(path)
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        Self::FilePath(path.to_path_buf())
    }
}

impl From<&str> for InputSource {
    fn from(path: &str) -> Self {
        Self::FilePath(PathBuf::from(path))
    }
}

impl From<String> for InputSource {
    fn from(path: String) -> Self {
        Self::FilePath(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::InMemoryBytes(bytes)
    }
}

impl From<&[u8]> for InputSource {
    fn from(bytes: &[u8]) -> Self {
        Self::InMemoryBytes(bytes.to_vec())
    }
}

/// What a single-file operation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputDescriptor {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl OutputDescriptor {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::File(_) => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::File(_) => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompressionRequest {
    source: InputSource,
    output_target: Option<PathBuf>,
    buffer_size: u32,
    remove_input_on_success: bool,
}

impl CompressionRequest {
    pub fn builder(source: impl Into<InputSource>) -> CompressionRequestBuilder {
        CompressionRequestBuilder {
            source: source.into(),
            output_target: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            remove_input_on_success: false,
        }
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    /// A directory to compress into, or the exact output file.
    pub fn output_target(&self) -> Option<&Path> {
        self.output_target.as_deref()
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn remove_input_on_success(&self) -> bool {
        self.remove_input_on_success
    }
}

#[derive(Clone, Debug)]
pub struct CompressionRequestBuilder {
    source: InputSource,
    output_target: Option<PathBuf>,
    buffer_size: u32,
    remove_input_on_success: bool,
}

impl CompressionRequestBuilder {
    pub fn output_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.output_target = Some(target.into());
        self
    }

    pub fn buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn remove_input_on_success(mut self, remove: bool) -> Self {
        self.remove_input_on_success = remove;
        self
    }

    pub fn build(self) -> Result<CompressionRequest> {
        validate_buffer_size(self.buffer_size)?;
        Ok(CompressionRequest {
            source: self.source,
            output_target: self.output_target,
            buffer_size: self.buffer_size,
            remove_input_on_success: self.remove_input_on_success,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DecompressionRequest {
    source: InputSource,
    base_dir: BaseDir,
    filename_override: Option<String>,
    buffer_size: u32,
    remove_input_on_success: bool,
}

impl DecompressionRequest {
    pub fn builder(source: impl Into<InputSource>) -> DecompressionRequestBuilder {
        DecompressionRequestBuilder {
            source: source.into(),
            base_dir: BaseDir::SourceDir,
            filename_override: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            remove_input_on_success: false,
        }
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn base_dir(&self) -> &BaseDir {
        &self.base_dir
    }

    pub fn filename_override(&self) -> Option<&str> {
        self.filename_override.as_deref()
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn remove_input_on_success(&self) -> bool {
        self.remove_input_on_success
    }
}

#[derive(Clone, Debug)]
pub struct DecompressionRequestBuilder {
    source: InputSource,
    base_dir: BaseDir,
    filename_override: Option<String>,
    buffer_size: u32,
    remove_input_on_success: bool,
}

impl DecompressionRequestBuilder {
    pub fn alternative_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = BaseDir::Alternative(dir.into());
        self
    }

    /// An empty name leaves the derived name in place.
    pub fn alternative_filename(mut self, name: impl Into<String>) -> Self {
        self.filename_override = Some(name.into());
        self
    }

    pub fn buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn remove_input_on_success(mut self, remove: bool) -> Self {
        self.remove_input_on_success = remove;
        self
    }

    pub fn build(self) -> Result<DecompressionRequest> {
        validate_buffer_size(self.buffer_size)?;
        Ok(DecompressionRequest {
            source: self.source,
            base_dir: self.base_dir,
            filename_override: self.filename_override,
            buffer_size: self.buffer_size,
            remove_input_on_success: self.remove_input_on_success,
        })
    }
}

/// Create one archive from several files.
#[derive(Clone, Debug)]
pub struct ArchiveRequest {
    output: PathBuf,
    inputs: Vec<PathBuf>,
    strip_rule: PathStripRule,
    buffer_size: u32,
}

impl ArchiveRequest {
    pub fn builder(output: impl Into<PathBuf>) -> ArchiveRequestBuilder {
        ArchiveRequestBuilder {
            output: output.into(),
            inputs: Vec::new(),
            strip_pattern: String::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn strip_rule(&self) -> &PathStripRule {
        &self.strip_rule
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }
}

#[derive(Clone, Debug)]
pub struct ArchiveRequestBuilder {
    output: PathBuf,
    inputs: Vec<PathBuf>,
    strip_pattern: String,
    buffer_size: u32,
}

impl ArchiveRequestBuilder {
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn strip_rule(mut self, pattern: impl Into<String>) -> Self {
        self.strip_pattern = pattern.into();
        self
    }

    pub fn buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn build(self) -> Result<ArchiveRequest> {
        validate_buffer_size(self.buffer_size)?;
        Ok(ArchiveRequest {
            strip_rule: PathStripRule::new(&self.strip_pattern)?,
            output: self.output,
            inputs: self.inputs,
            buffer_size: self.buffer_size,
        })
    }
}

/// Extract the entries of one archive into a directory.
#[derive(Clone, Debug)]
pub struct ExtractionRequest {
    archive: PathBuf,
    output_dir: PathBuf,
    filter: ExtractionFilter,
    buffer_size: u32,
}

impl ExtractionRequest {
    pub fn builder(
        archive: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> ExtractionRequestBuilder {
        ExtractionRequestBuilder {
            archive: archive.into(),
            output_dir: output_dir.into(),
            pattern: String::new(),
            invert: false,
            restore_directory_structure: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn filter(&self) -> &ExtractionFilter {
        &self.filter
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }
}

#[derive(Clone, Debug)]
pub struct ExtractionRequestBuilder {
    archive: PathBuf,
    output_dir: PathBuf,
    pattern: String,
    invert: bool,
    restore_directory_structure: bool,
    buffer_size: u32,
}

impl ExtractionRequestBuilder {
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn restore_directory_structure(mut self, restore: bool) -> Self {
        self.restore_directory_structure = restore;
        self
    }

    pub fn buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn build(self) -> Result<ExtractionRequest> {
        validate_buffer_size(self.buffer_size)?;
        let filter = ExtractionFilter::new(&self.pattern)?
            .invert(self.invert)
            .restore_directory_structure(self.restore_directory_structure);
        Ok(ExtractionRequest {
            archive: self.archive,
            output_dir: self.output_dir,
            filter,
            buffer_size: self.buffer_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn input_source_from_path_forms() {
        assert_eq!(
            InputSource::from("data/a.txt"),
            InputSource::FilePath(PathBuf::from("data/a.txt"))
        );
        assert_eq!(
            InputSource::from(String::from("a.txt")),
            InputSource::FilePath(PathBuf::from("a.txt"))
        );
        assert_eq!(
            InputSource::from(Path::new("a.txt")).path(),
            Some(Path::new("a.txt"))
        );
    }

    #[test]
    fn input_source_from_bytes() {
        let source = InputSource::from(vec![1u8, 2, 3]);
        assert_eq!(source, InputSource::InMemoryBytes(vec![1, 2, 3]));
        assert!(source.path().is_none());
        assert_eq!(
            InputSource::from(&b"xy"[..]),
            InputSource::InMemoryBytes(b"xy".to_vec())
        );
    }

    #[test]
    fn compression_request_defaults() {
        let request = CompressionRequest::builder("a.txt").build().unwrap();
        assert_eq!(request.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert!(request.output_target().is_none());
        assert!(!request.remove_input_on_success());
    }

    #[test]
    fn compression_request_builder_pattern() {
        let request = CompressionRequest::builder("a.txt")
            .output_target("/tmp")
            .buffer_size(16)
            .remove_input_on_success(true)
            .build()
            .unwrap();
        assert_eq!(request.output_target(), Some(Path::new("/tmp")));
        assert_eq!(request.buffer_size(), 16);
        assert!(request.remove_input_on_success());
    }

    #[test]
    fn zero_buffer_size_is_a_configuration_error() {
        let err = CompressionRequest::builder("a.txt")
            .buffer_size(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = DecompressionRequest::builder("a.gz")
            .buffer_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBufferSize(0)));

        assert!(ArchiveRequest::builder("a.tar").buffer_size(0).build().is_err());
        assert!(
            ExtractionRequest::builder("a.tar", "out")
                .buffer_size(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn decompression_request_alternatives() {
        let request = DecompressionRequest::builder("a.gz")
            .alternative_output_dir("/srv/out")
            .alternative_filename("b.txt")
            .build()
            .unwrap();
        assert_eq!(
            request.base_dir(),
            &BaseDir::Alternative(PathBuf::from("/srv/out"))
        );
        assert_eq!(request.filename_override(), Some("b.txt"));
    }

    #[test]
    fn archive_request_keeps_input_order() {
        let request = ArchiveRequest::builder("out.tar")
            .input("c.txt")
            .inputs(["a.txt", "b.txt"])
            .build()
            .unwrap();
        let names: Vec<_> = request.inputs().iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(names, ["c.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn bad_pattern_is_a_configuration_error() {
        let err = ExtractionRequest::builder("a.zip", "out")
            .pattern("(unclosed")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = ArchiveRequest::builder("a.zip")
            .strip_rule("[")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
