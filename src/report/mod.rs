//! Report generation with multiple output formats
//!
//! Formatters translate the domain report into external representations:
//! a human-readable table grouped by file, machine-readable JSON that
//! round-trips back into a [`LintReport`], and GitHub Actions annotations.
//! Formatting never reorders findings; the engine already sorted them.

use crate::domain::findings::{Finding, LintError, LintReport, LintResult, Severity};
use std::io::Write;

/// Supported output formats for lint reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and grouping by file
    Human,
    /// JSON for programmatic consumption; parses back into a report
    Json,
    /// GitHub Actions workflow annotations
    GitHub,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to show suggested fixes
    pub show_suggestions: bool,
    /// Maximum number of findings to include
    pub max_findings: Option<usize>,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_suggestions: true, max_findings: None, min_severity: None }
    }
}

/// Formats a [`LintReport`] in the requested output format
pub struct ReportFormatter {
    options: ReportOptions,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn format_report(&self, report: &LintReport, format: OutputFormat) -> LintResult<String> {
        let filtered = self.filtered(report);

        match format {
            OutputFormat::Human => Ok(self.format_human(&filtered)),
            OutputFormat::Json => format_json(&filtered),
            OutputFormat::GitHub => Ok(format_github(&filtered)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &LintReport,
        format: OutputFormat,
        mut writer: W,
    ) -> LintResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes()).map_err(|e| LintError::Io { source: e })?;
        Ok(())
    }

    /// Apply severity and count filters, producing a self-consistent report
    /// whose summary matches what is shown
    fn filtered(&self, report: &LintReport) -> LintReport {
        let mut kept: Vec<&Finding> = report
            .findings
            .iter()
            .filter(|f| match self.options.min_severity {
                Some(min) => f.severity >= min,
                None => true,
            })
            .collect();

        if let Some(max) = self.options.max_findings {
            kept.truncate(max);
        }

        let mut out = LintReport::new();
        for finding in kept {
            out.add_finding(finding.clone());
        }
        out.set_files_scanned(report.summary.files_scanned);
        out.config_fingerprint = report.config_fingerprint.clone();
        out
    }

    fn format_human(&self, report: &LintReport) -> String {
        let mut output = String::new();

        if report.findings.is_empty() {
            if self.options.use_colors {
                output.push_str("\x1b[32mNo style findings\x1b[0m\n");
            } else {
                output.push_str("No style findings\n");
            }
            output.push_str(&self.format_summary(report));
            return output;
        }

        let header = if report.has_errors() {
            ("Style findings (blocking)", "31")
        } else {
            ("Style findings", "33")
        };
        if self.options.use_colors {
            output.push_str(&format!("\x1b[{}m{}\x1b[0m\n\n", header.1, header.0));
        } else {
            output.push_str(&format!("{}\n\n", header.0));
        }

        // Group findings by file; findings within a file are already in
        // (line, severity) order.
        let mut by_file: std::collections::BTreeMap<&std::path::Path, Vec<&Finding>> =
            std::collections::BTreeMap::new();
        for finding in &report.findings {
            by_file.entry(finding.file.as_path()).or_default().push(finding);
        }

        for (file, findings) in by_file {
            output.push_str(&format!("{}\n", file.display()));

            for finding in findings {
                let severity_color = match finding.severity {
                    Severity::Error => "31",
                    Severity::Warning => "33",
                    Severity::Info => "36",
                };
                let position = match finding.line {
                    Some(line) => line.to_string(),
                    None => "?".to_string(),
                };

                if self.options.use_colors {
                    output.push_str(&format!(
                        "  \x1b[2m{}\x1b[0m [\x1b[{}m{}\x1b[0m] {} {}\n",
                        position,
                        severity_color,
                        finding.severity.as_str(),
                        finding.rule_id,
                        finding.message
                    ));
                } else {
                    output.push_str(&format!(
                        "  {} [{}] {} {}\n",
                        position,
                        finding.severity.as_str(),
                        finding.rule_id,
                        finding.message
                    ));
                }

                if self.options.show_suggestions {
                    if let Some(suggestion) = &finding.suggestion {
                        if self.options.use_colors {
                            output.push_str(&format!("      \x1b[32m-> {}\x1b[0m\n", suggestion));
                        } else {
                            output.push_str(&format!("      -> {}\n", suggestion));
                        }
                    }
                }
            }
            output.push('\n');
        }

        output.push_str(&self.format_summary(report));
        output
    }

    fn format_summary(&self, report: &LintReport) -> String {
        let counts = &report.summary.findings_by_severity;

        if counts.total() == 0 {
            return format!("Summary: 0 findings in {} files\n", report.summary.files_scanned);
        }

        let mut parts = Vec::new();
        if counts.error > 0 {
            let text = format!("{} error{}", counts.error, plural(counts.error));
            parts.push(self.colored(text, "31"));
        }
        if counts.warning > 0 {
            let text = format!("{} warning{}", counts.warning, plural(counts.warning));
            parts.push(self.colored(text, "33"));
        }
        if counts.info > 0 {
            parts.push(self.colored(format!("{} info", counts.info), "36"));
        }

        format!("Summary: {} in {} files\n", parts.join(", "), report.summary.files_scanned)
    }

    fn colored(&self, text: String, color: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn format_json(report: &LintReport) -> LintResult<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| LintError::config(format!("JSON serialization failed: {e}")))
}

/// Parse a JSON report back into a [`LintReport`]. Inverse of the JSON
/// output format.
pub fn parse_json(json: &str) -> LintResult<LintReport> {
    serde_json::from_str(json)
        .map_err(|e| LintError::config(format!("JSON report failed to parse: {e}")))
}

fn format_github(report: &LintReport) -> String {
    let mut output = String::new();

    for finding in &report.findings {
        let level = match finding.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "notice",
        };
        let position = match finding.line {
            Some(line) => format!(",line={line}"),
            None => String::new(),
        };

        output.push_str(&format!(
            "::{} file={},title={}{}::{}\n",
            level,
            finding.file.display(),
            finding.rule_id,
            position,
            finding.message
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_report() -> LintReport {
        let mut report = LintReport::new();
        report.add_finding(
            Finding::new(
                "style/boolean_literal",
                Severity::Error,
                PathBuf::from("analysis/clean.R"),
                "use `TRUE` instead of `T`",
            )
            .with_line(7),
        );
        report.add_finding(
            Finding::new(
                "style/seq_along",
                Severity::Warning,
                PathBuf::from("analysis/clean.R"),
                "`1:length(xs)` misbehaves on empty input",
            )
            .with_line(12)
            .with_suggestion("use seq_along(x) or seq_len(n) instead"),
        );
        report.set_files_scanned(3);
        report.set_config_fingerprint("cafe1234");
        report.sort_findings();
        report
    }

    #[test]
    fn test_human_format_plain() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            ..Default::default()
        });
        let output = formatter.format_report(&sample_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("Style findings (blocking)"));
        assert!(output.contains("analysis/clean.R"));
        assert!(output.contains("7 [error] style/boolean_literal"));
        assert!(output.contains("-> use seq_along"));
        assert!(output.contains("Summary: 1 error, 1 warning in 3 files"));
    }

    #[test]
    fn test_empty_report_human_format() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            ..Default::default()
        });
        let output =
            formatter.format_report(&LintReport::new(), OutputFormat::Human).unwrap();
        assert!(output.contains("No style findings"));
    }

    #[test]
    fn test_json_round_trip() {
        let formatter = ReportFormatter::default();
        let report = sample_report();

        let json = formatter.format_report(&report, OutputFormat::Json).unwrap();
        let parsed = parse_json(&json).unwrap();

        assert_eq!(report, parsed);
    }

    #[test]
    fn test_json_output_is_stable() {
        let formatter = ReportFormatter::default();
        let report = sample_report();

        let first = formatter.format_report(&report, OutputFormat::Json).unwrap();
        let second = formatter.format_report(&report, OutputFormat::Json).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_github_format() {
        let formatter = ReportFormatter::default();
        let output = formatter.format_report(&sample_report(), OutputFormat::GitHub).unwrap();

        assert!(output.contains("::error file=analysis/clean.R,title=style/boolean_literal,line=7::"));
        assert!(output.contains("::warning "));
    }

    #[test]
    fn test_severity_filtering_adjusts_summary() {
        let formatter = ReportFormatter::new(ReportOptions {
            min_severity: Some(Severity::Error),
            ..Default::default()
        });

        let json = formatter.format_report(&sample_report(), OutputFormat::Json).unwrap();
        let parsed = parse_json(&json).unwrap();

        assert_eq!(parsed.findings.len(), 1);
        assert_eq!(parsed.findings[0].rule_id, "style/boolean_literal");
        assert_eq!(parsed.summary.findings_by_severity.warning, 0);
    }

    #[test]
    fn test_max_findings_cap() {
        let formatter = ReportFormatter::new(ReportOptions {
            max_findings: Some(1),
            ..Default::default()
        });

        let json = formatter.format_report(&sample_report(), OutputFormat::Json).unwrap();
        let parsed = parse_json(&json).unwrap();
        assert_eq!(parsed.findings.len(), 1);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }
}
