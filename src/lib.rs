//! cyaction: Actionable Command Counter for Cypress tests
//!
//! This library parses Cypress test files, finds every `it(...)` test case
//! and counts the "actionable" commands (visits, clicks, typing, logins...)
//! each test performs. Files that tree-sitter cannot parse are analyzed with
//! a regex fallback, and a batch of files is folded into a summary.

pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod parser;
pub mod reporter;

pub use analyzer::{AnalysisEngine, CountingStrategy, RegexFallbackCounter, SyntaxTreeCounter};
pub use commands::{CommandSets, DEFAULT_ACTIONABLE_COMMANDS, DEFAULT_EXCLUDED_COMMANDS};
pub use error::AnalysisError;

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Result of analyzing one test file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFile {
    /// Number of test cases found
    pub total_tests: usize,
    /// Test display name -> per-test result. Serialized in discovery order.
    #[serde(serialize_with = "serialize_in_file_order")]
    pub tests: BTreeMap<String, TestCaseResult>,
    /// Set only when the file could not be analyzed at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnostic payload accompanying `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

impl TestFile {
    /// An empty result carrying an error marker
    pub fn failed(error: impl Into<String>, details: ErrorDetails) -> Self {
        Self {
            total_tests: 0,
            tests: BTreeMap::new(),
            error: Some(error.into()),
            error_details: Some(details),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Sum of actionable commands over every test in the file
    pub fn actionable_commands(&self) -> usize {
        self.tests.values().map(|t| t.actionable_commands).sum()
    }

    /// Tests in the order they were discovered
    pub fn tests_in_order(&self) -> Vec<(&str, &TestCaseResult)> {
        let mut tests: Vec<_> = self
            .tests
            .iter()
            .map(|(name, test)| (name.as_str(), test))
            .collect();
        tests.sort_by_key(|(_, t)| t.order_in_file);
        tests
    }
}

fn serialize_in_file_order<S: Serializer>(
    tests: &BTreeMap<String, TestCaseResult>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut ordered: Vec<_> = tests.iter().collect();
    ordered.sort_by_key(|(_, t)| t.order_in_file);
    serializer.collect_map(ordered)
}

/// One discovered test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    /// 1-based position in the file
    pub order_in_file: usize,
    /// Number of actionable commands counted
    pub actionable_commands: usize,
    /// Counted command names, in the order they were seen
    pub commands: Vec<String>,
}

impl TestCaseResult {
    pub fn new(order_in_file: usize) -> Self {
        Self {
            order_in_file,
            actionable_commands: 0,
            commands: Vec::new(),
        }
    }

    /// Record one counted command. Keeps `commands.len() == actionable_commands`.
    pub fn record(&mut self, command: &str) {
        self.commands.push(command.to_string());
        self.actionable_commands += 1;
    }
}

/// Diagnostics for a file that errored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<String>,
    /// Line of the first syntax error (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column of the first syntax error (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_error: Option<String>,
}

/// Per-file entry of the summary breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBreakdownEntry {
    pub actionable_commands: usize,
    pub it_block_count: usize,
}

/// Aggregate over every processed file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_test_files: usize,
    pub total_test_cases: usize,
    pub total_actionable_commands: usize,
    /// Rounded to two decimals; 0 when no tests were found
    pub average_commands_per_test: f64,
    pub file_breakdown: BTreeMap<String, FileBreakdownEntry>,
}

/// Full output of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// File name -> per-file result; one entry per requested input
    pub test_files: BTreeMap<String, TestFile>,
    pub summary: AnalysisSummary,
    /// Actionable command names used for this run
    pub actionable_command_types: Vec<String>,
    /// Excluded command names used for this run
    pub excluded_commands: Vec<String>,
}

impl AnalysisReport {
    /// Number of files that produced a result without an error marker
    pub fn successful_files(&self) -> usize {
        self.test_files.values().filter(|f| !f.is_error()).count()
    }

    /// Number of files carrying an error marker
    pub fn errored_files(&self) -> usize {
        self.test_files.values().filter(|f| f.is_error()).count()
    }

    /// How often each command was counted across all non-error files,
    /// most frequent first (ties broken by name).
    pub fn command_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for file in self.test_files.values().filter(|f| !f.is_error()) {
            for test in file.tests.values() {
                for command in &test.commands {
                    *counts.entry(command.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut distribution: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        distribution
    }

    /// Flatten into the per-test view with command histograms. Files
    /// without tests are dropped; the summary is carried over unchanged.
    pub fn simplified(&self) -> SimplifiedReport {
        let mut test_files = BTreeMap::new();
        for (file_name, file) in &self.test_files {
            if file.total_tests == 0 || file.tests.is_empty() {
                continue;
            }
            let entries = file
                .tests_in_order()
                .into_iter()
                .map(|(name, test)| {
                    let mut commands = BTreeMap::new();
                    for command in &test.commands {
                        *commands.entry(command.clone()).or_insert(0) += 1;
                    }
                    SimplifiedTest {
                        test_name: name.to_string(),
                        actionable_commands: test.actionable_commands,
                        commands,
                    }
                })
                .collect();
            test_files.insert(file_name.clone(), entries);
        }

        SimplifiedReport {
            test_files,
            summary: self.summary.clone(),
        }
    }
}

/// Flattened report: one entry per test with a command histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedReport {
    pub test_files: BTreeMap<String, Vec<SimplifiedTest>>,
    pub summary: AnalysisSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedTest {
    pub test_name: String,
    pub actionable_commands: usize,
    pub commands: BTreeMap<String, usize>,
}
