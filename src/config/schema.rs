//! Config schema and deserialization

use crate::commands::CommandSets;
use serde::{Deserialize, Serialize};

/// Root config structure for .cyactionrc.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Commands counted as actions. Default: built-in list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actionable_commands: Option<Vec<String>>,

    /// Commands documented as non-actions. Default: built-in list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_commands: Option<Vec<String>>,

    /// Glob patterns selecting test files (default: Cypress spec files)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_patterns: Vec<String>,

    /// Glob patterns for files/directories to exclude from analysis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    /// Root directory to search for test files (relative to the config file)
    /// If not set, searches from the path provided on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_root: Option<String>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_actionable: Option<Vec<String>>,
        cli_excluded: Option<Vec<String>>,
        cli_patterns: &[String],
    ) -> Self {
        if cli_actionable.is_some() {
            self.actionable_commands = cli_actionable;
        }
        if cli_excluded.is_some() {
            self.excluded_commands = cli_excluded;
        }
        if !cli_patterns.is_empty() {
            self.test_patterns = cli_patterns.to_vec();
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.actionable_commands.is_none() {
            self.actionable_commands = base.actionable_commands;
        }
        if self.excluded_commands.is_none() {
            self.excluded_commands = base.excluded_commands;
        }

        if self.test_patterns.is_empty() {
            self.test_patterns = base.test_patterns;
        }

        // Merge ignore patterns
        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.test_root.is_none() {
            self.test_root = base.test_root;
        }
    }

    /// Command sets for this config, falling back to the defaults
    pub fn command_sets(&self) -> CommandSets {
        CommandSets::with_overrides(
            self.actionable_commands.clone(),
            self.excluded_commands.clone(),
        )
    }

    /// Get test file patterns
    pub fn get_test_patterns(&self) -> Vec<&str> {
        if self.test_patterns.is_empty() {
            vec!["**/*.spec.{ts,js,tsx,jsx}", "**/*.cy.{ts,js,tsx,jsx}"]
        } else {
            self.test_patterns.iter().map(|s| s.as_str()).collect()
        }
    }
}
