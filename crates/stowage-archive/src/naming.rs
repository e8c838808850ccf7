//! Output path resolution and archive entry naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};

/// Appended to a decompressed file name that does not carry the codec's
/// extension, so decompressing `weird` never silently overwrites `weird`.
pub const DECOMPRESSED_SUFFIX: &str = ".decompressed";

/// Directory a decompressed file is written to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BaseDir {
    /// Next to the input file.
    #[default]
    SourceDir,
    Alternative(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputNamingPolicy {
    pub base_dir: BaseDir,
    pub filename_override: Option<String>,
    pub default_extension: String,
}

impl OutputNamingPolicy {
    pub fn new(default_extension: impl Into<String>) -> Self {
        Self {
            base_dir: BaseDir::SourceDir,
            filename_override: None,
            default_extension: default_extension.into(),
        }
    }

    pub fn base_dir(mut self, base_dir: BaseDir) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn filename_override(mut self, name: Option<String>) -> Self {
        self.filename_override = name;
        self
    }

    /// Resolve where decompressing `input` writes to.
    pub fn decompressed_path(&self, input: &Path) -> Result<PathBuf> {
        let base = match &self.base_dir {
            BaseDir::Alternative(dir) => dir.clone(),
            BaseDir::SourceDir => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let name = match self.filename_override.as_deref() {
            Some(name) if !name.is_empty() => OsString::from(name),
            _ => {
                let name = input
                    .file_name()
                    .ok_or_else(|| Error::MissingFileName(input.to_path_buf()))?
                    .to_string_lossy();
                match strip_suffix_ignore_case(&name, &self.default_extension) {
                    Some(stem) if !stem.is_empty() && !self.default_extension.is_empty() => {
                        OsString::from(stem)
                    }
                    _ => OsString::from(format!("{name}{DECOMPRESSED_SUFFIX}")),
                }
            }
        };

        ensure_dir(&base)?;
        Ok(base.join(name))
    }
}

/// Extensions match regardless of ASCII case, like codec detection does.
fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    let (stem, tail) = (name.get(..split)?, name.get(split..)?);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}

/// Resolve where compressing `input` writes to.
///
/// An existing directory target receives `basename(input) + extension`; any
/// other target is used verbatim. Without a target the output sits next to
/// the input.
pub fn compressed_path(
    input: &Path,
    target: Option<&Path>,
    default_extension: &str,
) -> Result<PathBuf> {
    let output = match target {
        Some(target) if !target.is_dir() => target.to_path_buf(),
        _ => {
            let mut name = input
                .file_name()
                .ok_or_else(|| Error::MissingFileName(input.to_path_buf()))?
                .to_os_string();
            name.push(default_extension);
            match target {
                Some(dir) => dir.join(name),
                None => input.with_file_name(name),
            }
        }
    };

    ensure_parent(&output)?;
    Ok(output)
}

/// Archives are written exactly where asked; only the parent is prepared.
pub fn archive_path(target: &Path) -> Result<PathBuf> {
    ensure_parent(target)?;
    Ok(target.to_path_buf())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| Error::OutputDirectory {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Regex removed from an input's absolute directory to name its archive entry.
///
/// Every match is removed from the parent directory; the file name is then
/// appended with `/`. An empty rule keeps the full absolute path and `.*`
/// reduces every entry to its basename.
#[derive(Clone, Debug, Default)]
pub struct PathStripRule {
    pattern: Option<Regex>,
}

impl PathStripRule {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::default());
        }
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            pattern: Some(regex),
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_ref().map_or("", Regex::as_str)
    }

    pub fn entry_name(&self, file: &Path) -> Result<String> {
        let absolute = std::path::absolute(file).map_err(|e| Error::Read {
            path: file.to_path_buf(),
            source: e,
        })?;
        let name = absolute
            .file_name()
            .ok_or_else(|| Error::MissingFileName(file.to_path_buf()))?
            .to_string_lossy();
        let dir = absolute
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = match &self.pattern {
            Some(regex) => regex.replace_all(&dir, "").into_owned(),
            None => dir,
        };
        Ok(join_entry_name(&dir, &name))
    }
}

fn join_entry_name(dir: &str, name: &str) -> String {
    let dir = if cfg!(windows) {
        dir.replace('\\', "/")
    } else {
        dir.to_string()
    };
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
