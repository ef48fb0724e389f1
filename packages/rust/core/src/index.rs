//! The tutorial index: an ordered, read-only catalog of summaries.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use monotone_content::bundled;
use monotone_shared::{ContentConfig, MonotoneError, Result, TutorialId, TutorialSummary};

/// On-disk shape of an index file.
#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    tutorials: Vec<TutorialSummary>,
}

/// Ordered catalog of tutorials. Order defines list display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialIndex {
    entries: Vec<TutorialSummary>,
}

impl TutorialIndex {
    /// Build an index, rejecting duplicate ids.
    pub fn new(entries: Vec<TutorialSummary>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(MonotoneError::validation(format!(
                    "duplicate tutorial id {} in index",
                    entry.id
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The index shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(bundled::INDEX_TOML)
    }

    /// Parse an index from TOML (`[[tutorials]]` tables).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: IndexFile = toml::from_str(s)
            .map_err(|e| MonotoneError::parse(format!("invalid tutorial index: {e}")))?;
        Self::new(file.tutorials)
    }

    /// Load an index from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MonotoneError::io(path, e))?;
        let index = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), entries = index.len(), "tutorial index loaded");
        Ok(index)
    }

    /// The configured override, or the bundled index.
    pub fn from_config(config: &ContentConfig) -> Result<Self> {
        match config.index_override() {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// All entries in display order.
    pub fn list(&self) -> &[TutorialSummary] {
        &self.entries
    }

    pub fn get(&self, id: TutorialId) -> Option<&TutorialSummary> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: TutorialId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Previous and next entries around `id` in display order.
    pub fn neighbours(
        &self,
        id: TutorialId,
    ) -> (Option<&TutorialSummary>, Option<&TutorialSummary>) {
        match self.position(id) {
            Some(i) => (
                i.checked_sub(1).and_then(|p| self.entries.get(p)),
                self.entries.get(i + 1),
            ),
            None => (None, None),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
