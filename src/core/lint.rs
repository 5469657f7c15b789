/// Structural checks over a built grammar graph.

use crate::core::graph::{GrammarGraph, Group};

/// Findings of a lint run. Errors make a grammar unusable from its root;
/// warnings point at dead, redundant or undercounted content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn lint(graph: &GrammarGraph, root: &str) -> LintReport {
    let mut report = LintReport::default();

    let Some(root_id) = graph.id_of(root) else {
        report.errors.push(format!("No '{root}' group to start expansion from"));
        return report;
    };

    let reachable = graph.reachable_from(root_id);
    let used_as_base = bases_of_reachable(graph, &reachable);
    let productive = productive_groups(graph);
    let recursive = graph.recursive_groups();

    for group in graph.groups() {
        if !reachable[group.id.0] {
            // Derived groups only exist because something referenced them,
            // and a base group's rules are checked through its derived groups.
            if !group.derived && !used_as_base[group.id.0] {
                report
                    .warnings
                    .push(format!("Group '{}' is not reachable from '{root}'", group.name));
            }
            continue;
        }

        if group.rules.is_empty() {
            report.errors.push(format!("Group '{}' has no rules", group.name));
        } else if !productive[group.id.0] {
            report.errors.push(format!(
                "Group '{}' has no terminating expansion (infinite recursion)",
                group.name
            ));
        } else if recursive[group.id.0] {
            report.warnings.push(format!(
                "Group '{}' is recursive, its derivation count is a lower bound",
                group.name
            ));
        }

        for duplicate in duplicate_rules(group) {
            report
                .warnings
                .push(format!("Group '{}' repeats rule '{duplicate}'", group.name));
        }
    }

    report
}

/// Gendered groups that a reachable derived group was resolved from.
fn bases_of_reachable(graph: &GrammarGraph, reachable: &[bool]) -> Vec<bool> {
    let mut used = vec![false; graph.len()];
    for group in graph.groups() {
        if let (true, Some(base)) = (reachable[group.id.0], group.derived_from) {
            used[base.0] = true;
        }
    }
    used
}

/// A group is productive when one of its rules only references productive
/// groups. Iterates to a fixed point.
fn productive_groups(graph: &GrammarGraph) -> Vec<bool> {
    let mut productive = vec![false; graph.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for group in graph.groups() {
            if productive[group.id.0] {
                continue;
            }
            let terminates = group
                .rules
                .iter()
                .any(|rule| rule.references.iter().all(|id| productive[id.0]));
            if terminates {
                productive[group.id.0] = true;
                changed = true;
            }
        }
    }
    productive
}

fn duplicate_rules(group: &Group) -> Vec<&str> {
    let mut seen = Vec::new();
    let mut duplicates = Vec::new();
    for rule in &group.rules {
        let source = rule.source();
        if seen.contains(&source) {
            if !duplicates.contains(&source) {
                duplicates.push(source);
            }
        } else {
            seen.push(source);
        }
    }
    duplicates
}
