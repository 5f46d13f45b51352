//! Batch summary aggregation

use crate::{AnalysisSummary, FileBreakdownEntry, TestFile};
use std::collections::BTreeMap;

/// Fold per-file results into a summary.
///
/// Files with an error marker are counted in `total_test_files` and listed
/// in the breakdown with zeros, but contribute nothing to the totals.
pub fn summarize(test_files: &BTreeMap<String, TestFile>) -> AnalysisSummary {
    let mut total_test_cases = 0;
    let mut total_actionable_commands = 0;
    let mut file_breakdown = BTreeMap::new();

    for (name, file) in test_files {
        let entry = if file.is_error() {
            FileBreakdownEntry::default()
        } else {
            let commands = file.actionable_commands();
            total_test_cases += file.total_tests;
            total_actionable_commands += commands;
            FileBreakdownEntry {
                actionable_commands: commands,
                it_block_count: file.total_tests,
            }
        };
        file_breakdown.insert(name.clone(), entry);
    }

    AnalysisSummary {
        total_test_files: test_files.len(),
        total_test_cases,
        total_actionable_commands,
        average_commands_per_test: average(total_actionable_commands, total_test_cases),
        file_breakdown,
    }
}

/// Commands per test rounded to two decimals, 0 for no tests
fn average(commands: usize, tests: usize) -> f64 {
    if tests == 0 {
        return 0.0;
    }
    let ratio = commands as f64 / tests as f64;
    (ratio * 100.0).round() / 100.0
}
