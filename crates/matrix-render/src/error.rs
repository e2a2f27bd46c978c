//! Error types for corpus loading

use std::path::PathBuf;

/// Text corpus could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Corpus file could not be read
    #[error("failed to read corpus {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Corpus is not the expected JSON shape
    #[error("corpus is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Top-level key is not an arcana number
    #[error("corpus key {0:?} is not an arcana number 1..=22")]
    InvalidArcana(String),
}

/// Non-fatal problem found while loading a corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Arcana entry the heading belongs to
    pub arcana: u32,
    /// Heading that could not be placed
    pub heading: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arcana {}: heading {:?} matches no sphere", self.arcana, self.heading)
    }
}
