//! Analyzer module - counting strategies and the batch engine

pub mod engine;
pub mod regex_fallback;
pub mod summary;
pub mod syntax_tree;

pub use engine::{AnalysisEngine, FileOutcome};
pub use regex_fallback::{extract_test_blocks, CommandMatcher, RegexFallbackCounter, TestBlock};
pub use summary::summarize;
pub use syntax_tree::SyntaxTreeCounter;

use crate::commands::CommandSets;
use crate::error::AnalysisError;
use crate::TestFile;
use std::path::Path;

/// Callee name that declares a test case
pub const TEST_FUNCTION: &str = "it";

/// Root object every Cypress command hangs off
pub const COMMAND_NAMESPACE: &str = "cy";

/// Test names starting with these are route fragments or intercept
/// aliases, not real tests.
pub const IGNORED_TEST_PREFIXES: &[char] = &['@', '/'];

/// Trait for the ways a test file can be turned into per-test counts
pub trait CountingStrategy: Send + Sync {
    /// Name of the strategy
    fn name(&self) -> &'static str;

    /// Count actionable commands per test in `source`
    fn count(
        &self,
        path: &Path,
        source: &str,
        commands: &CommandSets,
    ) -> Result<TestFile, AnalysisError>;
}
