//! Console reporter with colored output

use crate::AnalysisReport;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show per-test details
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Print the full report
    pub fn report(&self, report: &AnalysisReport) {
        print!("{}", self.render(report));
    }

    /// Print one line per file
    pub fn report_quiet(&self, report: &AnalysisReport) {
        print!("{}", self.render_quiet(report));
    }

    pub fn render(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();
        self.write_summary(&mut out, report);
        self.write_breakdown(&mut out, report);
        self.write_distribution(&mut out, report);
        out
    }

    pub fn render_quiet(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();
        for (name, file) in &report.test_files {
            match file.error {
                Some(ref error) => {
                    let _ = writeln!(out, "{}: {}", name, self.paint(error.as_str().red()));
                }
                None => {
                    let _ = writeln!(
                        out,
                        "{}: {} tests, {} commands",
                        name,
                        file.total_tests,
                        file.actionable_commands()
                    );
                }
            }
        }
        out
    }

    fn write_summary(&self, out: &mut String, report: &AnalysisReport) {
        let summary = &report.summary;
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.paint("Analysis Summary".bold()));
        let _ = writeln!(out, "{}", "═".repeat(60));
        let _ = writeln!(out, "   Total Test Files:          {}", summary.total_test_files);
        let _ = writeln!(out, "   Total Test Cases:          {}", summary.total_test_cases);
        let _ = writeln!(
            out,
            "   Total Actionable Commands: {}",
            summary.total_actionable_commands
        );
        let _ = writeln!(
            out,
            "   Average Commands Per Test: {}",
            self.paint(format!("{:.2}", summary.average_commands_per_test).bold())
        );

        let errored = report.errored_files();
        if errored > 0 {
            let _ = writeln!(
                out,
                "   {}",
                self.paint(
                    format!(
                        "{} files successful, {} files with errors",
                        report.successful_files(),
                        errored
                    )
                    .yellow()
                )
            );
        }
        let _ = writeln!(out);
    }

    fn write_breakdown(&self, out: &mut String, report: &AnalysisReport) {
        if report.test_files.is_empty() {
            return;
        }
        let _ = writeln!(out, "   {}", self.paint("File Breakdown:".bold()));

        let max = report
            .summary
            .file_breakdown
            .values()
            .map(|e| e.actionable_commands)
            .max()
            .unwrap_or(0);

        for (name, file) in &report.test_files {
            if let Some(ref error) = file.error {
                let _ = writeln!(
                    out,
                    "   {} {} {}",
                    self.paint("✗".red()),
                    name,
                    self.paint(error.as_str().dimmed())
                );
                continue;
            }

            let entry = report
                .summary
                .file_breakdown
                .get(name)
                .copied()
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "   {} {:>4} commands in {:>3} tests  {}",
                self.create_mini_bar(entry.actionable_commands, max),
                entry.actionable_commands,
                entry.it_block_count,
                name
            );

            if self.verbose {
                for (test_name, test) in file.tests_in_order() {
                    let _ = writeln!(
                        out,
                        "       {} {} {} [{}]",
                        self.paint(format!("#{}", test.order_in_file).dimmed()),
                        test_name,
                        self.paint(format!("({})", test.actionable_commands).cyan()),
                        test.commands.join(", ")
                    );
                }
            }
        }
        let _ = writeln!(out);
    }

    fn write_distribution(&self, out: &mut String, report: &AnalysisReport) {
        let distribution = report.command_distribution();
        if distribution.is_empty() {
            return;
        }
        let _ = writeln!(out, "   {}", self.paint("Command Distribution:".bold()));
        for (command, count) in distribution {
            let _ = writeln!(out, "   {:>6}  {}", count, command);
        }
        let _ = writeln!(out);
    }

    fn paint(&self, s: ColoredString) -> ColoredString {
        if self.use_colors {
            s
        } else {
            s.clear()
        }
    }

    fn create_mini_bar(&self, value: usize, max: usize) -> String {
        let filled = if max == 0 { 0 } else { (value * 10) / max };
        let empty = 10 - filled;
        format!("[{}{}]", "▓".repeat(filled), "░".repeat(empty))
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
