/// DOT export of the dependency graph between groups.
///
/// Nodes appear in graph order (first declaration or first reference) and
/// are never re-sorted, so the output is stable for a given grammar.

use num_traits::One;
use std::fmt;

use crate::core::cardinality::{format_count, Cardinalities};
use crate::core::graph::GrammarGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DotStyle {
    /// One node per group labelled with its name.
    #[default]
    Plain,
    /// One node per group labelled with its name and cardinality.
    Short,
    /// One node per rule, clustered by group, with cardinalities.
    Long,
}

impl DotStyle {
    pub fn needs_cardinalities(&self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// A graph ready to be written as DOT through its `Display` impl.
pub struct DotGraph<'g> {
    graph: &'g GrammarGraph,
    style: DotStyle,
    cardinalities: Option<&'g Cardinalities>,
}

impl<'g> DotGraph<'g> {
    /// Styles other than `Plain` print counts only when `cardinalities` is given.
    pub fn new(graph: &'g GrammarGraph, style: DotStyle, cardinalities: Option<&'g Cardinalities>) -> Self {
        Self {
            graph,
            style,
            cardinalities,
        }
    }

    fn write_groups(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in self.graph.groups() {
            let label = match (self.style, self.cardinalities) {
                (DotStyle::Plain, _) | (_, None) => group.name.clone(),
                (_, Some(counts)) => format!("{} {}", group.name, format_count(counts.group(group.id))),
            };
            writeln!(f, "\tgroup_{} [label=\"{}\"];", group.id.0, escape(&label))?;
        }
        writeln!(f)?;
        for group in self.graph.groups() {
            for dependency in &group.dependencies {
                writeln!(f, "\tgroup_{} -> group_{};", group.id.0, dependency.0)?;
            }
        }
        Ok(())
    }

    fn write_rules(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in self.graph.groups() {
            for (index, rule) in group.rules.iter().enumerate() {
                let label = match self.cardinalities.map(|c| c.rule(group.id, index)) {
                    Some(count) if !count.is_one() => {
                        format!("{} {}", rule.source(), format_count(count))
                    }
                    _ => rule.source().to_string(),
                };
                writeln!(f, "\trule_{}_{} [label=\"{}\"];", group.id.0, index, escape(&label))?;
            }
        }
        writeln!(f)?;

        for group in self.graph.groups() {
            let label = match self.cardinalities {
                Some(counts) => format!("{} {}", group.name, format_count(counts.group(group.id))),
                None => group.name.clone(),
            };
            writeln!(f, "\tsubgraph cluster_{} {{", group.id.0)?;
            writeln!(f, "\t\tlabel=\"{}\";", escape(&label))?;
            for index in 0..group.rules.len() {
                writeln!(f, "\t\trule_{}_{};", group.id.0, index)?;
            }
            writeln!(f, "\t}}")?;
        }
        writeln!(f)?;

        for group in self.graph.groups() {
            for (index, rule) in group.rules.iter().enumerate() {
                let mut seen = Vec::with_capacity(rule.references.len());
                for &target in &rule.references {
                    if seen.contains(&target) {
                        continue;
                    }
                    seen.push(target);
                    writeln!(
                        f,
                        "\trule_{}_{} -> rule_{}_0 [lhead=cluster_{}];",
                        group.id.0, index, target.0, target.0
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for DotGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph tracery {{")?;
        match self.style {
            DotStyle::Plain => self.write_groups(f)?,
            DotStyle::Short => {
                writeln!(f, "\tgraph [rankdir=LR];")?;
                self.write_groups(f)?;
            }
            DotStyle::Long => {
                writeln!(f, "\tcompound=true;")?;
                writeln!(f, "\tgraph [rankdir=LR];")?;
                self.write_rules(f)?;
            }
        }
        writeln!(f, "}}")
    }
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
