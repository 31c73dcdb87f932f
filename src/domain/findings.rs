//! Core domain models for style findings and lint reports
//!
//! Findings are immutable once created; a `LintReport` acts as the aggregate
//! owning all findings for a run. Reports carry no timestamps so two runs
//! over identical input serialize byte-identically.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for style findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages and suggestions
    Info,
    /// Findings that should be addressed but don't block a run
    Warning,
    /// Findings that fail the run (non-zero exit code)
    Error,
}

impl Severity {
    /// Whether this severity level should cause the run to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single rule violation or per-file processing error.
///
/// Processing errors use the `file/` rule-id prefix so they remain
/// distinguishable from style findings in the same report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the rule that produced this finding
    pub rule_id: String,
    /// Severity level of this finding
    pub severity: Severity,
    /// File the finding was found in
    pub file: PathBuf,
    /// Line number (1-indexed) where the finding starts
    pub line: Option<u32>,
    /// Last line (1-indexed) covered by the finding, when it spans several
    pub end_line: Option<u32>,
    /// Human-readable description
    pub message: String,
    /// Suggested fix, when one exists
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        file: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            file,
            line: None,
            end_line: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Set the starting line
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set a full line span
    pub fn with_line_span(mut self, start: u32, end: u32) -> Self {
        self.line = Some(start);
        self.end_line = Some(end);
        self
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether this finding fails the run
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format for single-line display
    pub fn format_display(&self) -> String {
        let location = match self.line {
            Some(line) => format!(":{line}"),
            None => String::new(),
        };

        format!(
            "{}{} [{}] {} {}",
            self.file.display(),
            location,
            self.severity.as_str(),
            self.rule_id,
            self.message
        )
    }
}

/// Count of findings by severity level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl FindingCounts {
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }

    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// Summary statistics for a lint run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintSummary {
    /// Total number of files scanned
    pub files_scanned: usize,
    /// Findings by severity level
    pub findings_by_severity: FindingCounts,
}

/// Complete report for one lint run: all findings, deterministically ordered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintReport {
    pub findings: Vec<Finding>,
    pub summary: LintSummary,
    /// Fingerprint of the configuration that produced this report
    pub config_fingerprint: Option<String>,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_finding(&mut self, finding: Finding) {
        self.summary.findings_by_severity.add(finding.severity);
        self.findings.push(finding);
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Whether the report contains blocking (error) findings
    pub fn has_errors(&self) -> bool {
        self.summary.findings_by_severity.has_blocking()
    }

    pub fn findings_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    pub fn set_files_scanned(&mut self, count: usize) {
        self.summary.files_scanned = count;
    }

    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    pub fn merge(&mut self, other: LintReport) {
        for finding in other.findings {
            self.add_finding(finding);
        }
        self.summary.files_scanned += other.summary.files_scanned;
    }

    /// Sort by (file, line, severity rank, rule id) for deterministic output.
    /// Severity ranks error above warning above info.
    pub fn sort_findings(&mut self) {
        self.findings.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.line.unwrap_or(0).cmp(&b.line.unwrap_or(0)))
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
    }
}

/// Error types for lint operations.
///
/// Per-file failures (`Parse`, `Io`) are local: the engine converts them to
/// findings and continues. `Config` is global and fatal before any file is
/// processed.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// Configuration could not be loaded, parsed or validated
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A source file is not syntactically valid R
    #[error("cannot parse {file}: {message}")]
    Parse { file: String, message: String },

    /// File could not be read or accessed
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A configured pattern failed to compile
    #[error("pattern error: {message}")]
    Pattern { message: String },
}

impl LintError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern { message: message.into() }
    }
}

/// Result type for lint operations
pub type LintResult<T> = Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_finding_creation() {
        let finding = Finding::new(
            "style/test",
            Severity::Error,
            PathBuf::from("analysis/clean.R"),
            "Test message",
        );

        assert_eq!(finding.rule_id, "style/test");
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.file, Path::new("analysis/clean.R"));
        assert!(finding.is_blocking());
    }

    #[test]
    fn test_finding_with_span_and_suggestion() {
        let finding = Finding::new(
            "style/test",
            Severity::Warning,
            PathBuf::from("analysis/clean.R"),
            "Test message",
        )
        .with_line_span(4, 9)
        .with_suggestion("use seq_along(x)");

        assert_eq!(finding.line, Some(4));
        assert_eq!(finding.end_line, Some(9));
        assert_eq!(finding.suggestion.as_deref(), Some("use seq_along(x)"));
        assert!(!finding.is_blocking());
    }

    #[test]
    fn test_report_counts() {
        let mut report = LintReport::new();

        report.add_finding(Finding::new(
            "docs/missing_return",
            Severity::Error,
            PathBuf::from("R/model.R"),
            "missing @return",
        ));
        report.add_finding(Finding::new(
            "pipe/step_complexity",
            Severity::Warning,
            PathBuf::from("R/clean.R"),
            "step performs 6 operations",
        ));

        assert!(report.has_findings());
        assert!(report.has_errors());
        assert_eq!(report.summary.findings_by_severity.total(), 2);
        assert_eq!(report.summary.findings_by_severity.error, 1);
        assert_eq!(report.summary.findings_by_severity.warning, 1);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let mut report = LintReport::new();
        report.add_finding(
            Finding::new("style/line_length", Severity::Info, PathBuf::from("b.R"), "long line")
                .with_line(3),
        );
        report.add_finding(
            Finding::new("docs/missing_return", Severity::Error, PathBuf::from("b.R"), "no return")
                .with_line(3),
        );
        report.add_finding(
            Finding::new("style/boolean_literal", Severity::Error, PathBuf::from("a.R"), "use TRUE")
                .with_line(10),
        );

        report.sort_findings();

        // a.R first, then b.R line 3 with error ranked above info
        assert_eq!(report.findings[0].file, Path::new("a.R"));
        assert_eq!(report.findings[1].rule_id, "docs/missing_return");
        assert_eq!(report.findings[2].rule_id, "style/line_length");

        let once = report.clone();
        report.sort_findings();
        assert_eq!(once, report);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Error.is_blocking());
        assert!(!Severity::Warning.is_blocking());
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut report = LintReport::new();
        report.add_finding(
            Finding::new(
                "palette/disallowed",
                Severity::Error,
                PathBuf::from("figures/plot.R"),
                "scale_fill_manual is a disallowed colour scale",
            )
            .with_line(12),
        );
        report.set_files_scanned(1);
        report.set_config_fingerprint("abc123");

        let json = serde_json::to_string(&report).unwrap();
        let parsed: LintReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
    }
}
