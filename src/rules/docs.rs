//! Roxygen documentation analysis
//!
//! Every top-level named function must be preceded by a contiguous `#'`
//! block carrying a one-line summary, one `@param` per declared parameter,
//! a `@return`, and at least one `@examples` whose code parses as R. Each
//! missing piece is a separate error finding naming the missing tag.

use crate::domain::findings::{Finding, Severity};
use crate::parser::{parse_source, SourceFile};
use crate::rules::Rule;
use std::collections::BTreeSet;
use tree_sitter::Node;

const ID: &str = "docs/roxygen";

pub struct RoxygenDocs {
    required: BTreeSet<String>,
}

impl RoxygenDocs {
    pub fn new(required: BTreeSet<String>) -> Self {
        Self { required }
    }

    fn requires(&self, tag: &str) -> bool {
        self.required.contains(tag)
    }
}

impl Rule for RoxygenDocs {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Functions need a roxygen block with a summary, @param per parameter, @return, and a parseable @examples"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        let mut findings = Vec::new();

        let root = file.root();
        let top_level: Vec<Node<'_>> =
            (0..root.named_child_count()).filter_map(|i| root.named_child(i)).collect();

        for (idx, node) in top_level.iter().enumerate() {
            let Some((name, fn_def)) = function_assignment(file, *node) else {
                continue;
            };
            let fn_line = file.start_line(*node);

            let doc_lines = roxygen_block_above(file, &top_level[..idx], fn_line);
            if doc_lines.is_empty() {
                findings.push(self.missing(
                    file,
                    fn_line,
                    "docs/missing_block",
                    format!("function `{name}` has no roxygen documentation block"),
                ));
                continue;
            }

            let block = RoxygenBlock::parse(&doc_lines);

            if self.requires("title") && block.title.is_none() {
                findings.push(self.missing(
                    file,
                    fn_line,
                    "docs/missing_title",
                    format!("function `{name}` documentation has no one-line summary"),
                ));
            }

            if self.requires("param") {
                for param in declared_parameters(file, fn_def) {
                    if !block.params.contains(&param) {
                        findings.push(self.missing(
                            file,
                            fn_line,
                            "docs/missing_param",
                            format!("function `{name}` is missing @param {param}"),
                        ));
                    }
                }
            }

            if self.requires("return") && !block.has_return {
                findings.push(self.missing(
                    file,
                    fn_line,
                    "docs/missing_return",
                    format!("function `{name}` is missing @return"),
                ));
            }

            if self.requires("examples") {
                if !block.has_examples_tag || block.example_code.trim().is_empty() {
                    findings.push(self.missing(
                        file,
                        fn_line,
                        "docs/missing_examples",
                        format!("function `{name}` is missing a runnable @examples block"),
                    ));
                } else if parse_source("<roxygen examples>", block.example_code.clone()).is_err() {
                    findings.push(self.missing(
                        file,
                        fn_line,
                        "docs/examples_do_not_parse",
                        format!("the @examples code for `{name}` does not parse as R"),
                    ));
                }
            }
        }

        findings
    }
}

impl RoxygenDocs {
    fn missing(&self, file: &SourceFile, line: u32, id: &str, message: String) -> Finding {
        Finding::new(id, Severity::Error, file.path.clone(), message).with_line(line)
    }
}

/// `name <- function(...)` (or `=` / `<<-`) at top level
fn function_assignment<'a>(
    file: &'a SourceFile,
    node: Node<'a>,
) -> Option<(&'a str, Node<'a>)> {
    if node.kind() != "binary_operator" {
        return None;
    }
    let op = node.child_by_field_name("operator")?;
    if !matches!(op.kind(), "<-" | "=" | "<<-") {
        return None;
    }
    let rhs = node.child_by_field_name("rhs")?;
    if rhs.kind() != "function_definition" {
        return None;
    }
    let lhs = node.child_by_field_name("lhs")?;
    if lhs.kind() != "identifier" && lhs.kind() != "string" {
        return None;
    }
    Some((file.node_text(lhs), rhs))
}

fn declared_parameters(file: &SourceFile, fn_def: Node<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let Some(parameters) = fn_def.child_by_field_name("parameters") else {
        return out;
    };
    for i in 0..parameters.named_child_count() {
        let Some(parameter) = parameters.named_child(i) else { continue };
        if parameter.kind() != "parameter" {
            continue;
        }
        if let Some(name) = parameter.child_by_field_name("name") {
            out.push(file.node_text(name).to_string());
        }
    }
    out
}

/// The contiguous `#'` comment block ending on the line directly above
/// `fn_line`, stripped of markers, in source order
fn roxygen_block_above(file: &SourceFile, preceding: &[Node<'_>], fn_line: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut expected_line = fn_line.saturating_sub(1);

    for node in preceding.iter().rev() {
        if node.kind() != "comment" || file.end_line(*node) != expected_line {
            break;
        }
        let text = file.node_text(*node);
        let Some(stripped) = text.strip_prefix("#'") else {
            break;
        };
        lines.push(stripped.strip_prefix(' ').unwrap_or(stripped).to_string());
        expected_line = file.start_line(*node).saturating_sub(1);
    }

    lines.reverse();
    lines
}

#[derive(Debug, Default)]
struct RoxygenBlock {
    title: Option<String>,
    params: BTreeSet<String>,
    has_return: bool,
    has_examples_tag: bool,
    example_code: String,
}

impl RoxygenBlock {
    fn parse(lines: &[String]) -> Self {
        let mut block = Self::default();
        let mut example_lines: Vec<&str> = Vec::new();
        let mut in_examples = false;
        let mut seen_tag = false;

        for line in lines {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix('@') {
                seen_tag = true;
                in_examples = false;
                let mut words = rest.split_whitespace();
                match words.next().unwrap_or("") {
                    "param" => {
                        if let Some(name) = words.next() {
                            block.params.insert(name.to_string());
                        }
                    }
                    "return" | "returns" => block.has_return = true,
                    "examples" | "examplesIf" => {
                        block.has_examples_tag = true;
                        in_examples = true;
                    }
                    _ => {}
                }
            } else if in_examples {
                example_lines.push(line.as_str());
            } else if block.title.is_none() && !trimmed.is_empty() && !seen_tag {
                block.title = Some(trimmed.to_string());
            }
        }

        block.example_code = example_lines.join("\n");
        block
    }
}
