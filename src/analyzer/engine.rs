//! Analysis engine - per-file strategy selection and batch driver

use super::{summarize, CountingStrategy, RegexFallbackCounter, SyntaxTreeCounter};
use crate::commands::CommandSets;
use crate::error::AnalysisError;
use crate::{AnalysisReport, ErrorDetails, TestFile};
use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Result of analyzing one file, with the strategy that produced it
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: TestFile,
    /// `None` when no strategy succeeded
    pub strategy: Option<&'static str>,
}

/// Runs the counting strategies over files and builds reports
pub struct AnalysisEngine {
    commands: CommandSets,
    /// Tried in order; the first success wins
    strategies: Vec<Box<dyn CountingStrategy>>,
    parallel: bool,
}

impl AnalysisEngine {
    /// Create an engine with the default command sets: syntax tree first,
    /// regex fallback second.
    pub fn new() -> Self {
        Self {
            commands: CommandSets::default(),
            strategies: vec![
                Box::new(SyntaxTreeCounter::new()),
                Box::new(RegexFallbackCounter::new()),
            ],
            parallel: false,
        }
    }

    /// Use custom command sets
    pub fn with_commands(mut self, commands: CommandSets) -> Self {
        self.commands = commands;
        self
    }

    /// Replace the strategy ladder
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn CountingStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Analyze files on the rayon thread pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn commands(&self) -> &CommandSets {
        &self.commands
    }

    /// Count commands in already loaded source text.
    ///
    /// Strategies are tried in order. If all of them fail, the result is an
    /// empty file carrying the first (parser) error and the later ones.
    pub fn analyze_source(&self, path: &Path, source: &str) -> FileOutcome {
        let filename = display_name(path);
        let mut failures: Vec<AnalysisError> = Vec::new();

        for strategy in &self.strategies {
            match strategy.count(path, source, &self.commands) {
                Ok(file) => {
                    if !failures.is_empty() {
                        info!(
                            file = %filename,
                            strategy = strategy.name(),
                            tests = file.total_tests,
                            "analyzed with fallback strategy"
                        );
                    }
                    return FileOutcome {
                        file,
                        strategy: Some(strategy.name()),
                    };
                }
                Err(e) => {
                    warn!(file = %filename, strategy = strategy.name(), error = %e, "strategy failed");
                    failures.push(e);
                }
            }
        }

        error!(file = %filename, "all analysis methods failed");
        FileOutcome {
            file: all_failed(&filename, &failures),
            strategy: None,
        }
    }

    /// Read and analyze one file. Never fails: problems are recorded on
    /// the returned result.
    pub fn analyze_file(&self, path: &Path) -> FileOutcome {
        let filename = display_name(path);
        debug!(file = %path.display(), "analyzing");

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(source) => {
                let err = AnalysisError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                error!(file = %filename, error = %err, "failed to read file");
                let details = ErrorDetails {
                    filename,
                    read_error: Some(err.to_string()),
                    ..Default::default()
                };
                return FileOutcome {
                    file: TestFile::failed(err.to_string(), details),
                    strategy: None,
                };
            }
        };

        self.analyze_source(path, &source)
    }

    /// Analyze every path and build the full report.
    ///
    /// The report has exactly one entry per input path; a failing file
    /// (including one that panics) never stops the batch.
    pub fn analyze_files(&self, paths: &[PathBuf]) -> AnalysisReport {
        info!(files = paths.len(), "starting analysis");
        let total = paths.len();

        let results: Vec<TestFile> = if self.parallel {
            use rayon::prelude::*;
            paths.par_iter().map(|p| self.analyze_guarded(p)).collect()
        } else {
            paths
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    debug!("[{}/{}] {}", i + 1, total, p.display());
                    self.analyze_guarded(p)
                })
                .collect()
        };

        let mut test_files = BTreeMap::new();
        for (path, file) in paths.iter().zip(results) {
            let key = file_key(path, &test_files);
            test_files.insert(key, file);
        }

        let summary = summarize(&test_files);
        let report = AnalysisReport {
            test_files,
            summary,
            actionable_command_types: self.commands.actionable().to_vec(),
            excluded_commands: self.commands.excluded().to_vec(),
        };

        info!(
            successful = report.successful_files(),
            errored = report.errored_files(),
            "analysis complete"
        );
        report
    }

    fn analyze_guarded(&self, path: &Path) -> TestFile {
        match panic::catch_unwind(AssertUnwindSafe(|| self.analyze_file(path))) {
            Ok(outcome) => outcome.file,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let filename = display_name(path);
                error!(file = %filename, error = %message, "unexpected error");
                let details = ErrorDetails {
                    filename,
                    unexpected_error: Some(message.clone()),
                    ..Default::default()
                };
                TestFile::failed(format!("Unexpected error: {}", message), details)
            }
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn all_failed(filename: &str, failures: &[AnalysisError]) -> TestFile {
    let primary = failures.first();
    let later: Vec<String> = failures.iter().skip(1).map(|e| e.to_string()).collect();
    let (line, column) = match primary.and_then(AnalysisError::location) {
        Some((line, column)) => (Some(line), Some(column)),
        None => (None, None),
    };

    let primary_message = primary
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no analysis strategy configured".to_string());

    let details = ErrorDetails {
        filename: filename.to_string(),
        ast_error: Some(primary_message.clone()),
        fallback_error: (!later.is_empty()).then(|| later.join("; ")),
        line,
        column,
        ..Default::default()
    };
    TestFile::failed(
        format!("All analysis methods failed: {}", primary_message),
        details,
    )
}

/// File name component, or the whole path when there is none
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Key for a file in the report: its base name, or the full path when the
/// base name is already taken by an earlier input.
fn file_key(path: &Path, taken: &BTreeMap<String, TestFile>) -> String {
    let name = display_name(path);
    if !taken.contains_key(&name) {
        return name;
    }
    let full = path.display().to_string();
    if !taken.contains_key(&full) {
        return full;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} ({})", full, n);
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
