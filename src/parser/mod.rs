//! Parser adapter over the tree-sitter R grammar
//!
//! `parse_source` is a pure transform from raw script text to an immutable
//! [`SourceFile`]. A tree containing syntax errors is rejected outright with
//! `LintError::Parse` so no partially-parsed tree ever reaches a rule.
//!
//! The node helpers here (line numbers, call-name resolution through `::`,
//! named arguments) keep the rule modules free of grammar trivia.

use crate::domain::findings::{LintError, LintResult};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

fn r_language() -> Language {
    tree_sitter_r::LANGUAGE.into()
}

/// One source script: path, raw text and its syntax tree.
/// Immutable once loaded; rules only ever borrow it.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    tree: Tree,
}

/// Parse R script text into a [`SourceFile`].
///
/// Fails with `LintError::Parse` when the text is not syntactically valid R;
/// never returns a partial tree.
pub fn parse_source(path: impl Into<PathBuf>, text: impl Into<String>) -> LintResult<SourceFile> {
    let path = path.into();
    let text = text.into();

    let mut parser = Parser::new();
    parser
        .set_language(&r_language())
        .map_err(|e| LintError::parse(path.display().to_string(), format!("R grammar unavailable: {e}")))?;

    let tree = parser
        .parse(&text, None)
        .ok_or_else(|| LintError::parse(path.display().to_string(), "parser produced no tree"))?;

    if tree.root_node().has_error() {
        let detail = match first_error_line(tree.root_node()) {
            Some(line) => format!("syntax error near line {line}"),
            None => "syntax error".to_string(),
        };
        return Err(LintError::parse(path.display().to_string(), detail));
    }

    Ok(SourceFile { path, text, tree })
}

/// Read a file from disk and parse it
pub fn load_source(path: &Path) -> LintResult<SourceFile> {
    let text = std::fs::read_to_string(path)?;
    parse_source(path, text)
}

fn first_error_line(root: Node<'_>) -> Option<u32> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row as u32 + 1);
        }
        if !node.has_error() {
            continue;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    None
}

impl SourceFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text of a node
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }

    /// 1-indexed line a node starts on
    pub fn start_line(&self, node: Node<'_>) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// 1-indexed line a node ends on
    pub fn end_line(&self, node: Node<'_>) -> u32 {
        node.end_position().row as u32 + 1
    }

    /// All named nodes in source (preorder) order
    pub fn nodes(&self) -> Vec<Node<'_>> {
        self.subtree(self.root())
    }

    /// All named nodes under `node` (inclusive), in source order
    pub fn subtree<'a>(&'a self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            out.push(node);
            for i in (0..node.named_child_count()).rev() {
                if let Some(child) = node.named_child(i) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Name a call resolves to: `filter(...)` is "filter",
    /// `dplyr::filter(...)` also "filter". None when the callee is an
    /// arbitrary expression.
    pub fn call_name(&self, call: Node<'_>) -> Option<&str> {
        let callee = call.child_by_field_name("function")?;
        match callee.kind() {
            "identifier" => Some(self.node_text(callee)),
            "namespace_operator" => {
                let rhs = callee.child_by_field_name("rhs")?;
                Some(self.node_text(rhs))
            }
            _ => None,
        }
    }

    /// Named arguments of a call, in source order, as (name, value) pairs
    pub fn named_arguments<'a>(&'a self, call: Node<'a>) -> Vec<(&'a str, Node<'a>)> {
        let mut out = Vec::new();
        let Some(arguments) = call.child_by_field_name("arguments") else {
            return out;
        };
        for i in 0..arguments.named_child_count() {
            let Some(arg) = arguments.named_child(i) else { continue };
            if arg.kind() != "argument" {
                continue;
            }
            if let (Some(name), Some(value)) =
                (arg.child_by_field_name("name"), arg.child_by_field_name("value"))
            {
                out.push((self.node_text(name), value));
            }
        }
        out
    }

    /// Whether a call carries a named argument with the given name
    pub fn has_named_argument(&self, call: Node<'_>, name: &str) -> bool {
        self.named_arguments(call).iter().any(|(n, _)| *n == name)
    }

    /// Literal content of a string node with the surrounding quotes
    /// stripped. Escape sequences are left as written.
    pub fn string_content<'a>(&'a self, string: Node<'a>) -> &'a str {
        let text = self.node_text(string);
        let bytes = text.as_bytes();
        if text.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[text.len() - 1] == bytes[0]
        {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }

    /// Whether any ancestor of `node` is a call to one of `names`
    pub fn inside_call_to(&self, node: Node<'_>, names: &dyn Fn(&str) -> bool) -> bool {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if ancestor.kind() == "call" {
                if let Some(name) = self.call_name(ancestor) {
                    if names(name) {
                        return true;
                    }
                }
            }
            current = ancestor.parent();
        }
        false
    }
}
