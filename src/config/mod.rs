//! Configuration loading and management for rlint
//!
//! Raw YAML structures are converted to validated domain objects; defaults
//! are embedded here, not in infrastructure. Collections are ordered
//! (`BTreeMap`/`BTreeSet`) so fingerprints, rule listings and serialized
//! reports stay stable across runs.

use crate::domain::findings::{LintError, LintResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];
const KNOWN_DOC_TAGS: &[&str] = &["title", "param", "return", "examples"];

/// Main configuration structure for rlint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Configuration format version
    pub version: String,
    /// File discovery configuration
    pub paths: PathConfig,
    /// Maximum operations per pipeline step before a warning
    pub pipe_complexity_threshold: u32,
    /// Maximum line length before an info finding
    pub line_length_limit: u32,
    /// Preferred assignment operator, `<-` or `=`
    pub preferred_assignment: String,
    /// Colour/fill scale functions that are always acceptable
    pub allowed_palettes: BTreeSet<String>,
    /// Regexes matching palette functions that are never acceptable
    pub denied_palette_patterns: Vec<String>,
    /// Function name to suggested replacement
    pub denied_functions: BTreeMap<String, String>,
    /// Calls whose string arguments may legitimately contain path fragments
    pub approved_path_builders: BTreeSet<String>,
    /// Roxygen tags every documented function must carry
    pub doc_required_tags: BTreeSet<String>,
    /// Per-rule enable toggles
    pub rules: RuleToggles,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Extensions treated as R scripts
    pub extensions: Vec<String>,
    /// Glob patterns excluded from discovery
    pub exclude: Vec<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["R".to_string(), "r".to_string()],
            exclude: vec![
                "**/renv/**".to_string(),
                "**/packrat/**".to_string(),
                "**/.Rproj.user/**".to_string(),
            ],
        }
    }
}

/// Enable/disable switches, one per rule. All default to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleToggles {
    pub pipe_complexity: bool,
    pub palette_usage: bool,
    pub assignment_operator: bool,
    pub boolean_literal: bool,
    pub seq_along: bool,
    pub denied_function: bool,
    pub line_length: bool,
    pub hardcoded_path: bool,
    pub documentation: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            pipe_complexity: true,
            palette_usage: true,
            assignment_operator: true,
            boolean_literal: true,
            seq_along: true,
            denied_function: true,
            line_length: true,
            hardcoded_path: true,
            documentation: true,
        }
    }
}

impl LintConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            LintError::config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            LintError::config(format!(
                "failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> LintResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| LintError::config(format!("failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration. Any violation is fatal and reported with
    /// expected vs. received value before any file is processed.
    pub fn validate(&self) -> LintResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(LintError::config(format!(
                "unsupported configuration version: expected one of {:?}, received '{}'",
                SUPPORTED_VERSIONS, self.version
            )));
        }

        if self.pipe_complexity_threshold == 0 {
            return Err(LintError::config(format!(
                "pipe_complexity_threshold: expected an integer >= 1, received {}",
                self.pipe_complexity_threshold
            )));
        }

        if self.line_length_limit == 0 {
            return Err(LintError::config(format!(
                "line_length_limit: expected an integer >= 1, received {}",
                self.line_length_limit
            )));
        }

        if !["<-", "="].contains(&self.preferred_assignment.as_str()) {
            return Err(LintError::config(format!(
                "preferred_assignment: expected '<-' or '=', received '{}'",
                self.preferred_assignment
            )));
        }

        for pattern in &self.denied_palette_patterns {
            regex::Regex::new(pattern).map_err(|e| {
                LintError::config(format!(
                    "denied_palette_patterns: expected a valid regex, received '{pattern}': {e}"
                ))
            })?;
        }

        for pattern in &self.paths.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                LintError::config(format!(
                    "paths.exclude: expected a valid glob, received '{pattern}': {e}"
                ))
            })?;
        }

        for tag in &self.doc_required_tags {
            if !KNOWN_DOC_TAGS.contains(&tag.as_str()) {
                return Err(LintError::config(format!(
                    "doc_required_tags: expected one of {:?}, received '{}'",
                    KNOWN_DOC_TAGS, tag
                )));
            }
        }

        Ok(())
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> LintResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LintError::config(format!("failed to serialize config: {e}")))
    }

    /// Stable fingerprint of the configuration, recorded in every report.
    /// All collections iterate in sorted order, so the hash is reproducible.
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.version.hash(&mut hasher);
        self.paths.extensions.hash(&mut hasher);
        self.paths.exclude.hash(&mut hasher);
        self.pipe_complexity_threshold.hash(&mut hasher);
        self.line_length_limit.hash(&mut hasher);
        self.preferred_assignment.hash(&mut hasher);
        for palette in &self.allowed_palettes {
            palette.hash(&mut hasher);
        }
        self.denied_palette_patterns.hash(&mut hasher);
        for (name, replacement) in &self.denied_functions {
            name.hash(&mut hasher);
            replacement.hash(&mut hasher);
        }
        for builder in &self.approved_path_builders {
            builder.hash(&mut hasher);
        }
        for tag in &self.doc_required_tags {
            tag.hash(&mut hasher);
        }
        let toggles = &self.rules;
        [
            toggles.pipe_complexity,
            toggles.palette_usage,
            toggles.assignment_operator,
            toggles.boolean_literal,
            toggles.seq_along,
            toggles.denied_function,
            toggles.line_length,
            toggles.hardcoded_path,
            toggles.documentation,
        ]
        .hash(&mut hasher);

        format!("{:x}", hasher.finish())
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathConfig::default(),
            pipe_complexity_threshold: 3,
            line_length_limit: 80,
            preferred_assignment: "<-".to_string(),
            allowed_palettes: default_allowed_palettes(),
            denied_palette_patterns: default_denied_palette_patterns(),
            denied_functions: default_denied_functions(),
            approved_path_builders: default_path_builders(),
            doc_required_tags: default_doc_tags(),
            rules: RuleToggles::default(),
        }
    }
}

fn default_allowed_palettes() -> BTreeSet<String> {
    [
        "scale_fill_viridis_d",
        "scale_fill_viridis_c",
        "scale_color_viridis_d",
        "scale_color_viridis_c",
        "scale_colour_viridis_d",
        "scale_colour_viridis_c",
        "scale_fill_brewer",
        "scale_color_brewer",
        "scale_colour_brewer",
        "scale_fill_distiller",
        "scale_color_distiller",
        "scale_colour_distiller",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_denied_palette_patterns() -> Vec<String> {
    vec![
        r"^scale_(fill|colou?r)_manual$".to_string(),
        r"^rainbow$".to_string(),
        r"^heat\.colors$".to_string(),
        r"^terrain\.colors$".to_string(),
        r"^cm\.colors$".to_string(),
    ]
}

fn default_denied_functions() -> BTreeMap<String, String> {
    [
        ("setwd", "rely on project-relative paths built with here()"),
        ("attach", "use with() or refer to data frame columns explicitly"),
        ("require", "use library() so missing packages fail loudly"),
        ("sapply", "use vapply() or purrr::map_*() for type-stable iteration"),
        ("subset", "use dplyr::filter() and dplyr::select()"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_path_builders() -> BTreeSet<String> {
    ["file.path", "here", "path", "system.file"].iter().map(|s| s.to_string()).collect()
}

fn default_doc_tags() -> BTreeSet<String> {
    ["title", "param", "return", "examples"].iter().map(|s| s.to_string()).collect()
}
