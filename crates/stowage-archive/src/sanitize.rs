use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// `output_dir/entry_name`, with leading root components dropped.
///
/// `..` that would climb above `output_dir` is rejected.
pub(crate) fn restored_target(output_dir: &Path, entry_name: &str) -> Result<PathBuf> {
    let relative = normalize_entry(entry_name).ok_or_else(|| Error::EntryEscapes {
        entry: entry_name.to_string(),
        base: output_dir.to_path_buf(),
    })?;
    Ok(output_dir.join(relative))
}

/// `output_dir/basename(entry_name)`.
///
/// Only the last component is used, so `..` elsewhere in the name is
/// irrelevant. A name ending in `..` or a separator has no basename.
pub(crate) fn flattened_target(output_dir: &Path, entry_name: &str) -> Result<PathBuf> {
    let name = Path::new(entry_name)
        .file_name()
        .ok_or_else(|| Error::EntryEscapes {
            entry: entry_name.to_string(),
            base: output_dir.to_path_buf(),
        })?;
    Ok(output_dir.join(name))
}

fn normalize_entry(entry_name: &str) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    for component in Path::new(entry_name).components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::ParentDir => {
                if !result.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    Some(result)
}
