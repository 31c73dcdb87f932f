//! rlint CLI - command-line interface for R style conformance checking
//!
//! Translates user commands to engine operations and handles external
//! concerns: config discovery, report output, process exit codes and
//! terminal colors. Exit code is non-zero iff any error-severity finding
//! exists.

use clap::{Parser, Subcommand, ValueEnum};
use rlint::{
    rules, LintConfig, LintResult, Linter, OutputFormat, ReportFormatter, ReportOptions,
    RunOptions, Severity,
};
use std::path::{Path, PathBuf};
use std::process;

/// rlint - style conformance checking for R analysis scripts
#[derive(Parser)]
#[command(name = "rlint")]
#[command(version = "0.1.0")]
#[command(about = "Style conformance checker for R analysis scripts")]
#[command(
    long_about = "rlint checks R scripts against the analysis style guide: pipe-step simplicity, approved colour palettes, naming and assignment conventions, roxygen documentation and forbidden constructs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files or directories for style findings
    Check {
        /// Paths to check (files or directories; defaults to `.`)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Minimum severity level to report
        #[arg(short, long, value_enum)]
        severity: Option<SeverityArg>,

        /// Maximum number of findings to report
        #[arg(long)]
        max_findings: Option<usize>,

        /// Additional exclude patterns
        #[arg(long, action = clap::ArgAction::Append)]
        exclude: Vec<String>,

        /// Disable parallel processing
        #[arg(long)]
        no_parallel: bool,

        /// Stop after the first file with a blocking finding
        #[arg(long)]
        fail_fast: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Explain what a specific rule does
    Explain {
        /// Rule id to explain (e.g. pipe/step_complexity)
        rule_id: String,
    },

    /// List available rules and their enabled state
    Rules {
        /// Show only enabled rules
        #[arg(long)]
        enabled_only: bool,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

fn run_command(cli: Cli) -> LintResult<i32> {
    match cli.command {
        Commands::Check {
            paths,
            format,
            severity,
            max_findings,
            exclude,
            no_parallel,
            fail_fast,
            output,
        } => run_check(
            cli.config,
            paths,
            format,
            severity,
            max_findings,
            exclude,
            no_parallel,
            fail_fast,
            output,
            !cli.no_color,
        ),
        Commands::ValidateConfig { config_file } => {
            run_validate_config(config_file.or(cli.config))
        }
        Commands::Explain { rule_id } => run_explain(cli.config, rule_id),
        Commands::Rules { enabled_only } => run_list_rules(cli.config, enabled_only),
    }
}

/// Configuration file names probed when `--config` is not given
const DEFAULT_CONFIGS: &[&str] = &["rlint.yaml", "rlint.yml", ".rlint.yaml"];

fn load_config(config_path: Option<PathBuf>) -> LintResult<LintConfig> {
    if let Some(path) = config_path {
        return LintConfig::load_from_file(path);
    }

    for name in DEFAULT_CONFIGS {
        if Path::new(name).exists() {
            return LintConfig::load_from_file(name);
        }
    }

    Ok(LintConfig::default())
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    config_path: Option<PathBuf>,
    paths: Vec<PathBuf>,
    format: OutputFormatArg,
    severity: Option<SeverityArg>,
    max_findings: Option<usize>,
    exclude: Vec<String>,
    no_parallel: bool,
    fail_fast: bool,
    output: Option<PathBuf>,
    use_colors: bool,
) -> LintResult<i32> {
    let config = load_config(config_path)?;

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors: use_colors && output.is_none(),
        max_findings,
        min_severity: severity.map(|s| s.into()),
        ..Default::default()
    });
    let linter = Linter::with_config(config)?.with_formatter(formatter);

    let paths = if paths.is_empty() { vec![PathBuf::from(".")] } else { paths };

    let options = RunOptions {
        parallel: !no_parallel,
        fail_fast,
        exclude,
        ..Default::default()
    };

    let report = linter.check_paths(paths, &options)?;
    let formatted = linter.format_report(&report, format.into())?;

    match output {
        Some(path) => std::fs::write(&path, formatted)?,
        None => println!("{formatted}"),
    }

    if report.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn run_validate_config(config_path: Option<PathBuf>) -> LintResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("rlint.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match LintConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  pipe complexity threshold: {}", config.pipe_complexity_threshold);
            println!("  line length limit: {}", config.line_length_limit);
            println!("  allowed palettes: {}", config.allowed_palettes.len());
            println!("  denied functions: {}", config.denied_functions.len());
            println!("  fingerprint: {}", config.fingerprint());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

fn run_explain(config_path: Option<PathBuf>, rule_id: String) -> LintResult<i32> {
    let config = load_config(config_path)?;
    let catalog = rules::catalog(&config)?;

    let namespace = rule_id.split('/').next().unwrap_or("");
    let matched = catalog
        .iter()
        .find(|info| info.id == rule_id)
        .or_else(|| catalog.iter().find(|info| info.id.split('/').next() == Some(namespace)));

    match matched {
        Some(info) => {
            println!("Rule: {}", info.id);
            println!("Enabled: {}", info.enabled);
            println!();
            println!("{}", info.description);
            Ok(0)
        }
        None => {
            eprintln!("Rule '{rule_id}' not found");
            println!();
            println!("Available rules:");
            for info in &catalog {
                println!("  - {}", info.id);
            }
            Ok(1)
        }
    }
}

fn run_list_rules(config_path: Option<PathBuf>, enabled_only: bool) -> LintResult<i32> {
    let config = load_config(config_path)?;

    println!("Available rules\n");
    for info in rules::catalog(&config)? {
        if enabled_only && !info.enabled {
            continue;
        }
        let status = if info.enabled { "on " } else { "off" };
        println!("  [{}] {} - {}", status, info.id, info.description);
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_command_exit_code() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("clean.R");
        fs::write(&script, "flag <- T\n").unwrap();

        let code = run_check(
            None,
            vec![script],
            OutputFormatArg::Json,
            None,
            None,
            vec![],
            false,
            false,
            None,
            false,
        )
        .unwrap();

        // boolean literal findings are blocking
        assert_eq!(code, 1);
    }

    #[test]
    fn test_check_clean_file_exits_zero() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("clean.R");
        fs::write(&script, "x <- 1\n").unwrap();

        let code = run_check(
            None,
            vec![script],
            OutputFormatArg::Json,
            None,
            None,
            vec![],
            false,
            false,
            None,
            false,
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_check_writes_report_file() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("clean.R");
        let report_path = temp.path().join("report.json");
        fs::write(&script, "flag <- T\n").unwrap();

        run_check(
            None,
            vec![script],
            OutputFormatArg::Json,
            None,
            None,
            vec![],
            false,
            false,
            Some(report_path.clone()),
            false,
        )
        .unwrap();

        let written = fs::read_to_string(report_path).unwrap();
        let parsed = rlint::report::parse_json(&written).unwrap();
        assert!(parsed.has_errors());
    }

    #[test]
    fn test_validate_config_command() {
        let temp = TempDir::new().unwrap();
        let config_file = temp.path().join("rlint.yaml");

        let yaml = serde_yaml::to_string(&LintConfig::default()).unwrap();
        fs::write(&config_file, yaml).unwrap();

        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 0);
    }

    #[test]
    fn test_validate_config_rejects_bad_values() {
        let temp = TempDir::new().unwrap();
        let config_file = temp.path().join("rlint.yaml");
        fs::write(&config_file, "pipe_complexity_threshold: 0\n").unwrap();

        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 1);
    }

    #[test]
    fn test_explain_rule() {
        assert_eq!(run_explain(None, "pipe/step_complexity".to_string()).unwrap(), 0);
        assert_eq!(run_explain(None, "docs/missing_return".to_string()).unwrap(), 0);
        assert_eq!(run_explain(None, "nonexistent/rule".to_string()).unwrap(), 1);
    }

    #[test]
    fn test_list_rules() {
        assert_eq!(run_list_rules(None, false).unwrap(), 0);
        assert_eq!(run_list_rules(None, true).unwrap(), 0);
    }
}
