//! Pipe-step complexity analysis
//!
//! A pipeline step should perform one bounded transformation. Operations per
//! step are counted as: each top-level named-argument assignment, each call
//! nested more than one level below the step call, each embedded conditional
//! branch, and each assignment operator inside the step. A step with none of
//! these counts as a single operation, so a simple `filter()` or a one-column
//! `mutate()` never triggers.

use crate::domain::findings::{Finding, Severity};
use crate::parser::SourceFile;
use crate::rules::Rule;
use tree_sitter::Node;

const ID: &str = "pipe/step_complexity";

/// One stage of a chained pipeline, ordered as it appears in source
#[derive(Debug)]
pub struct PipelineStep {
    /// Operation name (`mutate`, `filter`, ...) or `<expression>`
    pub name: String,
    /// Operations this step performs under the counting heuristic
    pub operations: usize,
    /// 1-indexed first line of the step
    pub line: u32,
    /// 1-indexed last line of the step
    pub end_line: u32,
}

/// Flags pipeline steps whose operation count exceeds the threshold
pub struct PipeComplexity {
    threshold: u32,
}

impl PipeComplexity {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Rule for PipeComplexity {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Pipeline steps should each perform one bounded transformation; steps doing too much at once are flagged"
    }

    fn check(&self, file: &SourceFile) -> Vec<Finding> {
        collect_steps(file)
            .into_iter()
            .filter(|step| step.operations > self.threshold as usize)
            .map(|step| {
                Finding::new(
                    ID,
                    Severity::Warning,
                    file.path.clone(),
                    format!(
                        "pipeline step `{}` performs {} operations (threshold {})",
                        step.name, step.operations, self.threshold
                    ),
                )
                .with_line_span(step.line, step.end_line)
                .with_suggestion("split this step into several smaller pipeline steps")
            })
            .collect()
    }
}

/// Every pipeline step in the file, in source order. Each `%>%`/`|>` node
/// contributes exactly one step: its right-hand side. The leftmost
/// expression of a chain is the data source, not a step.
pub fn collect_steps(file: &SourceFile) -> Vec<PipelineStep> {
    let mut steps: Vec<(usize, PipelineStep)> = file
        .nodes()
        .into_iter()
        .filter(|node| is_pipe(file, *node))
        .filter_map(|node| node.child_by_field_name("rhs"))
        .map(|rhs| {
            (
                rhs.start_byte(),
                PipelineStep {
                    name: step_name(file, rhs),
                    operations: count_operations(file, rhs),
                    line: file.start_line(rhs),
                    end_line: file.end_line(rhs),
                },
            )
        })
        .collect();

    steps.sort_by_key(|(offset, _)| *offset);
    steps.into_iter().map(|(_, step)| step).collect()
}

fn is_pipe(file: &SourceFile, node: Node<'_>) -> bool {
    node.kind() == "binary_operator"
        && node
            .child_by_field_name("operator")
            .map(|op| op.kind() == "|>" || file.node_text(op) == "%>%")
            .unwrap_or(false)
}

fn step_name(file: &SourceFile, step: Node<'_>) -> String {
    match step.kind() {
        "call" => file.call_name(step).unwrap_or("<expression>").to_string(),
        "identifier" => file.node_text(step).to_string(),
        _ => "<expression>".to_string(),
    }
}

/// Count operations performed by one step under the heuristic described in
/// the module docs. Non-call steps (a bare `distinct` without parentheses)
/// count as one.
fn count_operations(file: &SourceFile, step: Node<'_>) -> usize {
    if step.kind() != "call" {
        return 1;
    }

    let mut named_assignments = 0usize;
    let mut nested_calls = 0usize;
    let mut conditionals = 0usize;
    let mut assignments = 0usize;

    if let Some(arguments) = step.child_by_field_name("arguments") {
        for i in 0..arguments.named_child_count() {
            let Some(arg) = arguments.named_child(i) else { continue };
            if arg.kind() != "argument" {
                continue;
            }
            if arg.child_by_field_name("name").is_some() {
                named_assignments += 1;
            }
            if let Some(value) = arg.child_by_field_name("value") {
                tally(file, value, 0, &mut nested_calls, &mut conditionals, &mut assignments);
            }
        }
    }

    (named_assignments + nested_calls + conditionals + assignments).max(1)
}

fn tally(
    file: &SourceFile,
    node: Node<'_>,
    call_depth: usize,
    nested_calls: &mut usize,
    conditionals: &mut usize,
    assignments: &mut usize,
) {
    let mut depth = call_depth;
    match node.kind() {
        "call" => {
            // The first call below an argument is the step doing its job;
            // anything deeper is an operation of its own.
            if call_depth >= 1 {
                *nested_calls += 1;
            }
            depth += 1;
        }
        "if_statement" => *conditionals += 1,
        "binary_operator" => {
            let is_assignment = node
                .child_by_field_name("operator")
                .map(|op| matches!(op.kind(), "<-" | "<<-" | "->" | "->>"))
                .unwrap_or(false);
            if is_assignment {
                *assignments += 1;
            }
        }
        _ => {}
    }

    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            tally(file, child, depth, nested_calls, conditionals, assignments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use indoc::indoc;

    fn check(text: &str, threshold: u32) -> Vec<Finding> {
        let file = parse_source("pipeline.R", text).unwrap();
        PipeComplexity::new(threshold).check(&file)
    }

    #[test]
    fn test_five_simple_steps_produce_nothing() {
        let findings = check(
            indoc! {r##"
                result <- raw %>%
                  filter(!is.na(exposure)) %>%
                  mutate(dose = exposure * 2) %>%
                  arrange(dose) %>%
                  select(id, dose) %>%
                  distinct()
            "##},
            3,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_six_assignments_in_one_mutate() {
        let findings = check(
            indoc! {r##"
                out <- df %>%
                  mutate(
                    a = x + y,
                    b = x - y,
                    c = x * y,
                    d = x / y,
                    e = x + 1,
                    f = y + 1
                  )
            "##},
            3,
        );

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.rule_id, "pipe/step_complexity");
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.line, Some(2));
        assert!(finding.message.contains("6 operations"));
        assert!(finding.message.contains("mutate"));
    }

    #[test]
    fn test_single_simple_call_never_triggers() {
        // Even at the lowest valid threshold a one-operation step passes.
        let findings = check("df %>% filter(x > 1)\n", 1);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_native_pipe_is_recognized() {
        let findings = check(
            "out <- df |> mutate(a = 1, b = 2, c = 3, d = 4)\n",
            3,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("4 operations"));
    }

    #[test]
    fn test_nested_calls_beyond_one_level_count() {
        let file = parse_source(
            "pipeline.R",
            "df %>% mutate(z = log(scale(x)))\n",
        )
        .unwrap();
        let steps = collect_steps(&file);
        assert_eq!(steps.len(), 1);
        // one named assignment plus `scale` nested below `log`
        assert_eq!(steps[0].operations, 2);
    }

    #[test]
    fn test_embedded_conditional_counts() {
        let file = parse_source(
            "pipeline.R",
            "df %>% mutate(z = if (flag) x else y)\n",
        )
        .unwrap();
        let steps = collect_steps(&file);
        assert_eq!(steps[0].operations, 2);
    }

    #[test]
    fn test_steps_are_in_source_order() {
        let file = parse_source(
            "pipeline.R",
            "df %>% filter(a > 0) %>% mutate(b = a) %>% arrange(b)\n",
        )
        .unwrap();
        let steps = collect_steps(&file);
        let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["filter", "mutate", "arrange"]);
    }

    #[test]
    fn test_bare_identifier_step_counts_one() {
        let file = parse_source("pipeline.R", "df %>% distinct\n").unwrap();
        let steps = collect_steps(&file);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operations, 1);
        assert_eq!(steps[0].name, "distinct");
    }
}
