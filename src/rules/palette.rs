//! Palette usage analysis for ggplot colour and fill scales
//!
//! Scale calls are classified against an allow-list (viridis scales, brewer
//! scales carrying a named palette) and a deny-pattern list (manual scales,
//! base-R palette constructors such as `rainbow`). A plot chain with no
//! explicit colour scale at all gets an info finding, since ggplot defaults
//! would apply silently.

use crate::domain::findings::{Finding, LintResult, Severity};
use crate::parser::SourceFile;
use crate::rules::Rule;
use regex::Regex;
use std::collections::BTreeSet;
use tree_sitter::Node;

const ID: &str = "palette/usage";
const ID_DISALLOWED: &str = "palette/disallowed";
const ID_NO_SCALE: &str = "palette/no_explicit_scale";

pub struct PaletteUsage {
    allowed: BTreeSet<String>,
    denied: Vec<Regex>,
}

impl PaletteUsage {
    pub fn new(allowed: BTreeSet<String>, denied_patterns: &[String]) -> LintResult<Self> {
        let denied = denied_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    crate::domain::findings::LintError::pattern(format!(
                        "invalid palette deny pattern '{pattern}': {e}"
                    ))
                })
            })
            .collect::<LintResult<Vec<_>>>()?;

        Ok(Self { allowed, denied })
    }

    fn is_denied(&self, name: &str) -> bool {
        self.denied.iter().any(|re| re.is_match(name))
    }

    fn classify_scale(&self, file: &SourceFile, call: Node<'_>, name: &str) -> Option<Finding> {
        if self.allowed.contains(name) {
            // Brewer scales are only meaningful with a named palette; the
            // package default is not an approved choice.
            if name.ends_with("_brewer") && !file.has_named_argument(call, "palette") {
                return Some(
                    Finding::new(
                        ID_DISALLOWED,
                        Severity::Error,
                        file.path.clone(),
                        format!("{name}() must name a palette (e.g. palette = \"Dark2\")"),
                    )
                    .with_line(file.start_line(call)),
                );
            }
            return None;
        }

        let message = if self.is_denied(name) {
            format!("{name}() is a disallowed colour scale; use an approved viridis or brewer scale")
        } else {
            format!("{name}() is not on the palette allow-list")
        };

        Some(
            Finding::new(ID_DISALLOWED, Severity::Error, file.path.clone(), message)
                .with_line(file.start_line(call)),
        )
    }
}

impl Rule for PaletteUsage {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Plots must use approved colour palettes (viridis, named brewer); manual scales, base-R palettes and silent defaults are flagged"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut scale_calls = Vec::new();
        let mut plot_calls = Vec::new();

        for node in file.nodes() {
            if node.kind() != "call" {
                continue;
            }
            let Some(name) = file.call_name(node) else { continue };

            if name == "ggplot" {
                plot_calls.push(node);
            } else if is_colour_scale(name) {
                scale_calls.push((node, name.to_string()));
            } else if self.is_denied(name) {
                findings.push(
                    Finding::new(
                        ID_DISALLOWED,
                        Severity::Error,
                        file.path.clone(),
                        format!(
                            "{name}() produces a disallowed palette; use an approved viridis or brewer scale"
                        ),
                    )
                    .with_line(file.start_line(node)),
                );
            }
        }

        for (call, name) in &scale_calls {
            if let Some(finding) = self.classify_scale(file, *call, name) {
                findings.push(finding);
            }
        }

        for plot in plot_calls {
            let chain = chain_root(file, plot);
            let has_scale = file.subtree(chain).into_iter().any(|n| {
                n.kind() == "call"
                    && file.call_name(n).map(is_colour_scale).unwrap_or(false)
            });
            if !has_scale {
                findings.push(
                    Finding::new(
                        ID_NO_SCALE,
                        Severity::Info,
                        file.path.clone(),
                        "plot sets no explicit colour scale; ggplot defaults may apply silently",
                    )
                    .with_line(file.start_line(plot)),
                );
            }
        }

        findings
    }
}

fn is_colour_scale(name: &str) -> bool {
    name.starts_with("scale_fill_")
        || name.starts_with("scale_color_")
        || name.starts_with("scale_colour_")
}

/// Root of the `+` chain a ggplot call participates in. Pipes are treated as
/// part of the chain so `df %>% ggplot(...) + ...` resolves to the full plot
/// expression.
fn chain_root<'a>(file: &SourceFile, node: Node<'a>) -> Node<'a> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        let is_chain_link = parent.kind() == "binary_operator"
            && parent
                .child_by_field_name("operator")
                .map(|op| op.kind() == "+" || op.kind() == "|>" || file.node_text(op) == "%>%")
                .unwrap_or(false);
        if !is_chain_link {
            break;
        }
        current = parent;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;
    use crate::parser::parse_source;
    use indoc::indoc;

    fn check(text: &str) -> Vec<Finding> {
        let config = LintConfig::default();
        let rule =
            PaletteUsage::new(config.allowed_palettes, &config.denied_palette_patterns).unwrap();
        let file = parse_source("plot.R", text).unwrap();
        rule.check(&file)
    }

    #[test]
    fn test_viridis_scale_is_clean() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, y, fill = group)) +
              geom_col() +
              scale_fill_viridis_d()
        "##});
        assert!(findings.is_empty());
    }

    #[test]
    fn test_manual_scale_is_an_error() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, y, fill = group)) +
              geom_col() +
              scale_fill_manual(values = c("red", "blue"))
        "##});
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "palette/disallowed");
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].line, Some(3));
    }

    #[test]
    fn test_rainbow_is_an_error() {
        let findings = check("colors <- rainbow(8)\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("rainbow"));
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_plot_without_scale_is_info() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, y, colour = group)) +
              geom_point()
        "##});
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "palette/no_explicit_scale");
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn test_brewer_without_named_palette_is_an_error() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, fill = g)) +
              geom_bar() +
              scale_fill_brewer()
        "##});
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("palette"));
    }

    #[test]
    fn test_brewer_with_named_palette_is_clean() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, fill = g)) +
              geom_bar() +
              scale_fill_brewer(palette = "Dark2")
        "##});
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unknown_scale_is_flagged_as_unapproved() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, fill = g)) +
              geom_bar() +
              scale_fill_hue()
        "##});
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("allow-list"));
    }

    #[test]
    fn test_axis_scales_are_not_palettes() {
        let findings = check(indoc! {r##"
            ggplot(df, aes(x, y, fill = g)) +
              geom_col() +
              scale_x_log10() +
              scale_fill_viridis_d()
        "##});
        assert!(findings.is_empty());
    }

    #[test]
    fn test_two_plots_evaluated_independently() {
        let findings = check(indoc! {r##"
            p1 <- ggplot(df, aes(x, fill = g)) +
              geom_bar() +
              scale_fill_viridis_d()
            p2 <- ggplot(df, aes(x, fill = g)) +
              geom_bar()
        "##});
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "palette/no_explicit_scale");
        assert_eq!(findings[0].line, Some(4));
    }
}
