//! Lint engine: discovery, rule fan-out and report assembly
//!
//! The engine owns an immutable rule registry and fans every source file out
//! to every rule. Files are independent, so runs are parallel by default;
//! findings are merged order-stably (sorted by file, line and severity after
//! collection) so output is deterministic regardless of completion order.
//!
//! Per-file failures never abort a run: unreadable and unparseable files are
//! demoted to `file/io` and `file/parse` error findings and the remaining
//! files are still linted.

pub mod path_filter;

pub use path_filter::PathFilter;

use crate::config::LintConfig;
use crate::domain::findings::{Finding, LintError, LintReport, LintResult, Severity};
use crate::parser;
use crate::rules::RuleSet;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for customizing a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Whether to lint files in parallel
    pub parallel: bool,
    /// Stop after the first file that yields an error finding
    /// (forces sequential evaluation)
    pub fail_fast: bool,
    /// Maximum number of files to lint
    pub max_files: Option<usize>,
    /// Additional exclude patterns for this run only
    pub exclude: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { parallel: true, fail_fast: false, max_files: None, exclude: Vec::new() }
    }
}

/// The conformance engine. Construct once from a validated configuration;
/// cheap to share by reference across a run.
pub struct Engine {
    rules: RuleSet,
    filter: PathFilter,
    fingerprint: Option<String>,
}

impl Engine {
    /// Build an engine from configuration. Configuration problems are fatal
    /// here, before any file is touched.
    pub fn from_config(config: &LintConfig) -> LintResult<Self> {
        config.validate()?;
        Ok(Self {
            rules: RuleSet::from_config(config)?,
            filter: PathFilter::from_config(&config.paths)?,
            fingerprint: Some(config.fingerprint()),
        })
    }

    /// Build an engine around an explicit rule set. Used to exercise the
    /// engine with synthetic rules in tests.
    pub fn with_rule_set(rules: RuleSet, filter: PathFilter) -> Self {
        Self { rules, filter, fingerprint: None }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Lint a set of files and/or directories and assemble the report
    pub fn check_paths(&self, paths: &[PathBuf], options: &RunOptions) -> LintResult<LintReport> {
        let started = Instant::now();

        let mut filter = self.filter.clone();
        for pattern in &options.exclude {
            filter.add_exclude(pattern)?;
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(filter.find_files(path));
            } else if !filter.is_excluded(path) {
                // Explicitly named files are linted even with a foreign
                // extension; missing ones surface as file/io findings.
                files.push(path.clone());
            }
        }
        files.sort();
        files.dedup();

        if let Some(max) = options.max_files {
            files.truncate(max);
        }
        let total_files = files.len();

        let findings = if options.parallel && !options.fail_fast && files.len() > 1 {
            files.par_iter().flat_map_iter(|path| self.check_file(path)).collect()
        } else {
            self.check_files_sequential(&files, options)
        };

        let mut report = LintReport::new();
        for finding in findings {
            report.add_finding(finding);
        }
        report.set_files_scanned(total_files);
        if let Some(fingerprint) = &self.fingerprint {
            report.set_config_fingerprint(fingerprint.clone());
        }
        report.sort_findings();

        tracing::debug!(
            files = total_files,
            findings = report.findings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lint run finished"
        );

        Ok(report)
    }

    fn check_files_sequential(&self, files: &[PathBuf], options: &RunOptions) -> Vec<Finding> {
        let mut findings = Vec::new();
        for path in files {
            let file_findings = self.check_file(path);
            let blocking = file_findings.iter().any(|f| f.severity == Severity::Error);
            findings.extend(file_findings);
            if options.fail_fast && blocking {
                tracing::debug!(file = %path.display(), "stopping early: blocking finding");
                break;
            }
        }
        findings
    }

    /// Lint one file. I/O and parse failures come back as findings, not
    /// errors, so one bad file never sinks the run.
    pub fn check_file(&self, path: &Path) -> Vec<Finding> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                return vec![Finding::new(
                    "file/io",
                    Severity::Error,
                    path.to_path_buf(),
                    format!("cannot read file: {e}"),
                )];
            }
        };
        self.check_source(path, &text)
    }

    /// Lint already-loaded source text
    pub fn check_source(&self, path: &Path, text: &str) -> Vec<Finding> {
        let file = match parser::parse_source(path, text) {
            Ok(file) => file,
            Err(error) => {
                let message = match &error {
                    LintError::Parse { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                return vec![Finding::new(
                    "file/parse",
                    Severity::Error,
                    path.to_path_buf(),
                    format!("file skipped: {message}"),
                )];
            }
        };

        self.rules.iter().flat_map(|rule| rule.check(&file)).collect()
    }
}
