//! Naming, assignment and construct conventions
//!
//! Six independent rules, each toggleable in configuration. They run in
//! isolation and never short-circuit each other: a line can legitimately
//! collect an assignment error, a boolean error and a line-length info at
//! once.

use crate::domain::findings::{Finding, LintError, LintResult, Severity};
use crate::parser::SourceFile;
use crate::rules::Rule;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tree_sitter::Node;

/// Enforces the configured assignment operator (`<-` by default)
pub struct AssignmentOperator {
    preferred: String,
}

impl AssignmentOperator {
    pub fn new(preferred: String) -> Self {
        Self { preferred }
    }
}

impl Rule for AssignmentOperator {
    fn id(&self) -> &'static str {
        "style/assignment_operator"
    }

    fn description(&self) -> &'static str {
        "Assignments must use the configured operator; named arguments are not assignments and are never flagged"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        // `x = 1` at expression level parses as a binary operator; named
        // arguments parse as argument nodes, so they never appear here.
        let flagged = if self.preferred == "<-" { "=" } else { "<-" };

        file.nodes()
            .into_iter()
            .filter(|node| node.kind() == "binary_operator")
            .filter_map(|node| node.child_by_field_name("operator"))
            .filter(|op| op.kind() == flagged)
            .map(|op| {
                Finding::new(
                    self.id(),
                    Severity::Error,
                    file.path.clone(),
                    format!("use `{}` for assignment, not `{}`", self.preferred, flagged),
                )
                .with_line(file.start_line(op))
            })
            .collect()
    }
}

/// Flags the abbreviated boolean forms `T` and `F`
pub struct BooleanLiteral;

impl Rule for BooleanLiteral {
    fn id(&self) -> &'static str {
        "style/boolean_literal"
    }

    fn description(&self) -> &'static str {
        "Booleans must be spelled TRUE/FALSE; T and F are ordinary variables that can be reassigned"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.nodes()
            .into_iter()
            .filter(|node| node.kind() == "identifier")
            .filter(|node| matches!(file.node_text(*node), "T" | "F"))
            .filter(|node| !is_name_position(*node))
            .map(|node| {
                let spelled = if file.node_text(node) == "T" { "TRUE" } else { "FALSE" };
                Finding::new(
                    self.id(),
                    Severity::Error,
                    file.path.clone(),
                    format!("use `{}` instead of `{}`", spelled, file.node_text(node)),
                )
                .with_line(file.start_line(node))
            })
            .collect()
    }
}

/// True when an identifier is an argument/parameter name or a `$`/`@` field,
/// where `T`/`F` are labels rather than boolean values
fn is_name_position(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "argument" | "parameter" => parent
            .child_by_field_name("name")
            .map(|name| name.id() == node.id())
            .unwrap_or(false),
        "extract_operator" => parent
            .child_by_field_name("rhs")
            .map(|rhs| rhs.id() == node.id())
            .unwrap_or(false),
        _ => false,
    }
}

/// Flags the unsafe `1:length(x)` iteration idiom
pub struct SeqAlong;

const SEQ_SOURCES: &[&str] = &["length", "nrow", "ncol"];

impl Rule for SeqAlong {
    fn id(&self) -> &'static str {
        "style/seq_along"
    }

    fn description(&self) -> &'static str {
        "`1:length(x)` counts down from 1 when x is empty; seq_along()/seq_len() do not"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.nodes()
            .into_iter()
            .filter(|node| is_one_to_length(file, *node))
            .map(|node| {
                Finding::new(
                    self.id(),
                    Severity::Warning,
                    file.path.clone(),
                    format!("`{}` misbehaves on empty input", file.node_text(node)),
                )
                .with_line(file.start_line(node))
                .with_suggestion("use seq_along(x) or seq_len(n) instead")
            })
            .collect()
    }
}

fn is_one_to_length(file: &SourceFile, node: Node<'_>) -> bool {
    if node.kind() != "binary_operator" {
        return false;
    }
    let is_colon = node
        .child_by_field_name("operator")
        .map(|op| op.kind() == ":")
        .unwrap_or(false);
    if !is_colon {
        return false;
    }
    let lhs_is_one = node
        .child_by_field_name("lhs")
        .map(|lhs| {
            matches!(lhs.kind(), "float" | "integer")
                && matches!(file.node_text(lhs), "1" | "1L")
        })
        .unwrap_or(false);
    let rhs_is_size_call = node
        .child_by_field_name("rhs")
        .map(|rhs| {
            rhs.kind() == "call"
                && file.call_name(rhs).map(|n| SEQ_SOURCES.contains(&n)).unwrap_or(false)
        })
        .unwrap_or(false);

    lhs_is_one && rhs_is_size_call
}

/// Flags calls to functions on the configured deny-list, naming the
/// configured replacement
pub struct DeniedFunction {
    denied: BTreeMap<String, String>,
}

impl DeniedFunction {
    pub fn new(denied: BTreeMap<String, String>) -> Self {
        Self { denied }
    }
}

impl Rule for DeniedFunction {
    fn id(&self) -> &'static str {
        "style/denied_function"
    }

    fn description(&self) -> &'static str {
        "Certain base-R functions are denied in analysis scripts; each has a configured replacement"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.nodes()
            .into_iter()
            .filter(|node| node.kind() == "call")
            .filter_map(|node| {
                let name = file.call_name(node)?;
                let replacement = self.denied.get(name)?;
                Some(
                    Finding::new(
                        self.id(),
                        Severity::Warning,
                        file.path.clone(),
                        format!("{name}() is discouraged; {replacement}"),
                    )
                    .with_line(file.start_line(node)),
                )
            })
            .collect()
    }
}

/// Flags lines over the configured length limit
pub struct LineLength {
    limit: u32,
}

impl LineLength {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

impl Rule for LineLength {
    fn id(&self) -> &'static str {
        "style/line_length"
    }

    fn description(&self) -> &'static str {
        "Lines should stay under the configured length limit"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.text
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let width = line.chars().count();
                if width <= self.limit as usize {
                    return None;
                }
                Some(
                    Finding::new(
                        self.id(),
                        Severity::Info,
                        file.path.clone(),
                        format!("line is {width} characters (limit {})", self.limit),
                    )
                    .with_line(idx as u32 + 1),
                )
            })
            .collect()
    }
}

/// Flags hardcoded path literals outside approved path-builder calls
pub struct HardcodedPath {
    builders: BTreeSet<String>,
    matcher: Regex,
}

impl HardcodedPath {
    pub fn new(builders: BTreeSet<String>) -> LintResult<Self> {
        // Absolute, home-relative and dot-relative prefixes, Windows drive
        // letters, or a relative path ending in a tabular-data extension.
        let matcher = Regex::new(
            r"(?i)^(/|~(/|$)|\.{1,2}/|[a-z]:[/\\])|^[^\s:]+/[^\s]*\.(csv|tsv|txt|rds|rda|rdata|xlsx?|parquet|feather)$",
        )
        .map_err(|e| LintError::pattern(format!("path literal pattern failed to compile: {e}")))?;

        Ok(Self { builders, matcher })
    }
}

impl Rule for HardcodedPath {
    fn id(&self) -> &'static str {
        "style/hardcoded_path"
    }

    fn description(&self) -> &'static str {
        "Path literals must be built with an approved helper (file.path, here) so scripts stay portable"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        file.nodes()
            .into_iter()
            .filter(|node| node.kind() == "string")
            .filter_map(|node| {
                let content = file.string_content(node);
                if content.contains("://") || !self.matcher.is_match(content) {
                    return None;
                }
                if file.inside_call_to(node, &|name| self.builders.contains(name)) {
                    return None;
                }
                Some(
                    Finding::new(
                        self.id(),
                        Severity::Warning,
                        file.path.clone(),
                        format!("hardcoded path literal \"{content}\""),
                    )
                    .with_line(file.start_line(node))
                    .with_suggestion("build paths with file.path() or here()"),
                )
            })
            .collect()
    }
}
