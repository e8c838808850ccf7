use regex::Regex;

use crate::error::{Error, Result};

/// Selects which archive entries get extracted and how they are laid out.
///
/// The pattern is matched (unanchored) against the entry's full name inside
/// the archive. An empty pattern or `.*` selects everything, whatever the
/// invert flag says.
#[derive(Clone, Debug, Default)]
pub struct ExtractionFilter {
    pattern: Option<Regex>,
    invert: bool,
    restore_directory_structure: bool,
}

impl ExtractionFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = if pattern.is_empty() || pattern == ".*" {
            None
        } else {
            Some(Regex::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source: Box::new(e),
            })?)
        };
        Ok(Self {
            pattern,
            ..Self::default()
        })
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn restore_directory_structure(mut self, restore: bool) -> Self {
        self.restore_directory_structure = restore;
        self
    }

    pub fn restores_directories(&self) -> bool {
        self.restore_directory_structure
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn accepts(&self, entry_name: &str) -> bool {
        match &self.pattern {
            None => true,
            Some(regex) => regex.is_match(entry_name) != self.invert,
        }
    }
}
