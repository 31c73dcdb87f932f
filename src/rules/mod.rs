//! Rule registry for style conformance checks
//!
//! Every check is a stateless [`Rule`]: a pure function from a parsed
//! [`SourceFile`] to findings. The registry is built once from the
//! configuration and injected into the engine — never held in global state —
//! so the engine can also be exercised with a synthetic rule set in tests.

pub mod conventions;
pub mod docs;
pub mod palette;
pub mod pipeline;

use crate::config::{LintConfig, RuleToggles};
use crate::domain::findings::{Finding, LintResult};
use crate::parser::SourceFile;

/// A single style rule. Rules never mutate the source file and never
/// short-circuit each other; findings are independent of execution order.
pub trait Rule: Send + Sync {
    /// Stable identifier, namespaced like `style/seq_along`. Findings carry
    /// this id or a more specific id under the same namespace.
    fn id(&self) -> &'static str;

    /// One-line description shown by `rlint rules` and `rlint explain`
    fn description(&self) -> &'static str;

    /// Inspect a file and emit zero or more findings
    fn check(&self, file: &SourceFile) -> Vec<Finding>;
}

/// Ordered, immutable collection of rules. Insertion order is execution
/// order, though findings do not depend on it.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Build the registry from configuration, honoring per-rule toggles
    pub fn from_config(config: &LintConfig) -> LintResult<Self> {
        let toggles = &config.rules;
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();

        if toggles.pipe_complexity {
            rules.push(Box::new(pipeline::PipeComplexity::new(config.pipe_complexity_threshold)));
        }
        if toggles.palette_usage {
            rules.push(Box::new(palette::PaletteUsage::new(
                config.allowed_palettes.clone(),
                &config.denied_palette_patterns,
            )?));
        }
        if toggles.assignment_operator {
            rules.push(Box::new(conventions::AssignmentOperator::new(
                config.preferred_assignment.clone(),
            )));
        }
        if toggles.boolean_literal {
            rules.push(Box::new(conventions::BooleanLiteral));
        }
        if toggles.seq_along {
            rules.push(Box::new(conventions::SeqAlong));
        }
        if toggles.denied_function {
            rules.push(Box::new(conventions::DeniedFunction::new(config.denied_functions.clone())));
        }
        if toggles.line_length {
            rules.push(Box::new(conventions::LineLength::new(config.line_length_limit)));
        }
        if toggles.hardcoded_path {
            rules.push(Box::new(conventions::HardcodedPath::new(
                config.approved_path_builders.clone(),
            )?));
        }
        if toggles.documentation {
            rules.push(Box::new(docs::RoxygenDocs::new(config.doc_required_tags.clone())));
        }

        Ok(Self { rules })
    }

    /// Build a registry from an explicit rule list (synthetic rule sets in
    /// engine tests, custom embeddings)
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look a rule up by id. Finding ids may be more specific than the rule
    /// id (`docs/missing_return` is emitted by `docs/roxygen`), so an exact
    /// match is tried first and then the shared namespace prefix.
    pub fn find(&self, query: &str) -> Option<&dyn Rule> {
        if let Some(rule) = self.iter().find(|r| r.id() == query) {
            return Some(rule);
        }
        let namespace = query.split('/').next()?;
        self.iter().find(|r| r.id().split('/').next() == Some(namespace))
    }
}

/// Catalog entry for CLI listings
pub struct RuleInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

/// Every rule the crate knows about, with its enabled state under `config`.
/// Disabled rules are still listed so `rlint rules` can show what a config
/// switched off.
pub fn catalog(config: &LintConfig) -> LintResult<Vec<RuleInfo>> {
    let everything_on = LintConfig {
        rules: RuleToggles::default(),
        ..config.clone()
    };
    let full = RuleSet::from_config(&everything_on)?;

    Ok(full
        .iter()
        .map(|rule| RuleInfo {
            id: rule.id(),
            description: rule.description(),
            enabled: toggle_for(rule.id(), &config.rules),
        })
        .collect())
}

fn toggle_for(id: &str, toggles: &RuleToggles) -> bool {
    match id {
        "pipe/step_complexity" => toggles.pipe_complexity,
        "palette/usage" => toggles.palette_usage,
        "style/assignment_operator" => toggles.assignment_operator,
        "style/boolean_literal" => toggles.boolean_literal,
        "style/seq_along" => toggles.seq_along,
        "style/denied_function" => toggles.denied_function,
        "style/line_length" => toggles.line_length,
        "style/hardcoded_path" => toggles.hardcoded_path,
        "docs/roxygen" => toggles.documentation,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_default_config() {
        let rules = RuleSet::from_config(&LintConfig::default()).unwrap();
        assert_eq!(rules.len(), 9);

        let ids: Vec<&str> = rules.iter().map(|r| r.id()).collect();
        assert!(ids.contains(&"pipe/step_complexity"));
        assert!(ids.contains(&"docs/roxygen"));
    }

    #[test]
    fn test_disabled_rules_are_not_registered() {
        let mut config = LintConfig::default();
        config.rules.line_length = false;
        config.rules.documentation = false;

        let rules = RuleSet::from_config(&config).unwrap();
        assert_eq!(rules.len(), 7);
        assert!(rules.iter().all(|r| r.id() != "style/line_length"));
    }

    #[test]
    fn test_find_by_namespace_prefix() {
        let rules = RuleSet::from_config(&LintConfig::default()).unwrap();
        assert!(rules.find("docs/missing_return").is_some());
        assert!(rules.find("pipe/step_complexity").is_some());
        assert!(rules.find("nonsense/rule").is_none());
    }

    #[test]
    fn test_catalog_reports_disabled_state() {
        let mut config = LintConfig::default();
        config.rules.palette_usage = false;

        let catalog = catalog(&config).unwrap();
        assert_eq!(catalog.len(), 9);
        let palette = catalog.iter().find(|r| r.id == "palette/usage").unwrap();
        assert!(!palette.enabled);
        let pipe = catalog.iter().find(|r| r.id == "pipe/step_complexity").unwrap();
        assert!(pipe.enabled);
    }
}
