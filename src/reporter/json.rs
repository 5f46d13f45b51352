//! JSON reporter for machine-readable output

use crate::AnalysisReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
    /// Emit the flattened per-test view instead of the full report
    simplified: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self {
            pretty: false,
            simplified: false,
        }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Emit the simplified report
    pub fn simplified(mut self) -> Self {
        self.simplified = true;
        self
    }

    /// Render the report as a JSON string
    pub fn render(&self, report: &AnalysisReport) -> Result<String> {
        if self.simplified {
            self.to_json(&report.simplified())
        } else {
            self.to_json(report)
        }
    }

    /// Write the rendered report to `path`
    pub fn write_to(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        let json = self.render(report)?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Failed to serialize report")
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
