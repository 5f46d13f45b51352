//! Error taxonomy for per-file analysis

use std::path::PathBuf;
use thiserror::Error;

/// Failures that can occur while analyzing a single file.
///
/// None of these abort a batch: the engine turns each one into an error
/// marker on that file's result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The file does not exist or is not valid UTF-8
    #[error("File read error: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// tree-sitter rejected the source text
    #[error("{message} ({line}:{column})")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// The regex fallback could not run
    #[error("Regex analysis failed: {0}")]
    Fallback(String),

    /// A tree-sitter grammar could not be loaded
    #[error("Failed to load grammar: {0}")]
    Language(String),
}

impl AnalysisError {
    /// Location of a parse error, if this is one
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            AnalysisError::Parse { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

impl From<regex::Error> for AnalysisError {
    fn from(e: regex::Error) -> Self {
        AnalysisError::Fallback(e.to_string())
    }
}
