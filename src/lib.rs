//! rlint - style conformance checking for R analysis scripts
//!
//! The library interface serves as the application layer: pure domain logic
//! (findings, rules) stays separate from infrastructure concerns (file
//! discovery, report formatting), and the [`Linter`] facade wires them
//! together for embedders and the CLI alike.

pub mod config;
pub mod domain;
pub mod engine;
pub mod parser;
pub mod report;
pub mod rules;

// Re-export main types for convenient access
pub use domain::findings::{
    Finding, FindingCounts, LintError, LintReport, LintResult, LintSummary, Severity,
};

pub use config::{LintConfig, PathConfig, RuleToggles};

pub use engine::{Engine, PathFilter, RunOptions};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use rules::{Rule, RuleSet};

use std::path::{Path, PathBuf};

/// High-level linter combining the engine with a report formatter
pub struct Linter {
    engine: Engine,
    formatter: ReportFormatter,
}

impl Linter {
    /// Create a linter with default configuration
    pub fn new() -> LintResult<Self> {
        Self::with_config(LintConfig::default())
    }

    /// Create a linter with the given configuration
    pub fn with_config(config: LintConfig) -> LintResult<Self> {
        Ok(Self {
            engine: Engine::from_config(&config)?,
            formatter: ReportFormatter::default(),
        })
    }

    /// Create a linter loading configuration from a YAML file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        Self::with_config(LintConfig::load_from_file(path)?)
    }

    /// Set a custom report formatter
    pub fn with_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Lint files and/or directories with the given options
    pub fn check_paths<P: AsRef<Path>>(
        &self,
        paths: Vec<P>,
        options: &RunOptions,
    ) -> LintResult<LintReport> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        self.engine.check_paths(&paths, options)
    }

    /// Lint a single file
    pub fn check_file<P: AsRef<Path>>(&self, path: P) -> LintReport {
        let mut report = LintReport::new();
        for finding in self.engine.check_file(path.as_ref()) {
            report.add_finding(finding);
        }
        report.set_files_scanned(1);
        report.sort_findings();
        report
    }

    /// Format a report for output
    pub fn format_report(&self, report: &LintReport, format: OutputFormat) -> LintResult<String> {
        self.formatter.format_report(report, format)
    }
}

/// Convenience function to lint a set of paths with default settings
pub fn lint_paths<P: AsRef<Path>>(paths: Vec<P>) -> LintResult<LintReport> {
    Linter::new()?.check_paths(paths, &RunOptions::default())
}

/// Convenience function to lint a directory tree with default settings
pub fn lint_directory<P: AsRef<Path>>(directory: P) -> LintResult<LintReport> {
    Linter::new()?.check_paths(vec![directory.as_ref()], &RunOptions::default())
}

/// Gate helpers for hooks and CI pipelines
pub mod ci {
    use super::*;

    /// Pre-commit gate: fails when any blocking finding exists.
    pub fn pre_commit_check<P: AsRef<Path>>(paths: Vec<P>) -> LintResult<()> {
        let report = lint_paths(paths)?;

        if report.has_errors() {
            let error_count = report.summary.findings_by_severity.error;
            return Err(LintError::config(format!(
                "pre-commit check failed: {} blocking finding{}",
                error_count,
                if error_count == 1 { "" } else { "s" }
            )));
        }

        Ok(())
    }

    /// Strict gate for CI: fails on any finding at all, warnings included.
    pub fn strict_check<P: AsRef<Path>>(paths: Vec<P>) -> LintResult<LintReport> {
        let report = lint_paths(paths)?;

        if report.has_findings() {
            return Err(LintError::config(format!(
                "strict check failed: {} findings",
                report.findings.len()
            )));
        }

        Ok(report)
    }
}
