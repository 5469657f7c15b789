/// Cardinality: how many distinct derivations each group and rule can produce.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::core::graph::{GrammarGraph, GroupId};

/// Memo state of one group.
#[derive(Debug, Clone)]
enum Visit {
    Unvisited,
    /// Sum of the rules counted so far.
    InProgress(BigUint),
    Done(BigUint),
}

/// Counts for every group and rule of a graph.
///
/// A rule counts the product of its placeholders' groups (1 without
/// placeholders); a group counts the sum of its rules. When a cycle leads back
/// to a group still being counted, that group contributes its partial sum
/// instead of recursing, so recursive grammars are undercounted.
#[derive(Debug, Clone)]
pub struct Cardinalities {
    groups: Vec<BigUint>,
    rules: Vec<Vec<BigUint>>,
}

impl Cardinalities {
    pub fn compute(graph: &GrammarGraph) -> Cardinalities {
        let mut calculator = Calculator {
            graph,
            visits: vec![Visit::Unvisited; graph.len()],
            rules: graph
                .groups()
                .iter()
                .map(|group| vec![None; group.rules.len()])
                .collect(),
        };

        let groups = graph
            .groups()
            .iter()
            .map(|group| calculator.group(group.id))
            .collect();
        let rules = calculator
            .rules
            .into_iter()
            .map(|counts| counts.into_iter().map(Option::unwrap_or_default).collect())
            .collect();

        Cardinalities { groups, rules }
    }

    pub fn group(&self, id: GroupId) -> &BigUint {
        &self.groups[id.0]
    }

    pub fn rule(&self, id: GroupId, index: usize) -> &BigUint {
        &self.rules[id.0][index]
    }
}

struct Calculator<'g> {
    graph: &'g GrammarGraph,
    visits: Vec<Visit>,
    rules: Vec<Vec<Option<BigUint>>>,
}

impl Calculator<'_> {
    fn group(&mut self, id: GroupId) -> BigUint {
        match &self.visits[id.0] {
            Visit::Done(count) | Visit::InProgress(count) => return count.clone(),
            Visit::Unvisited => {}
        }

        self.visits[id.0] = Visit::InProgress(BigUint::zero());
        for index in 0..self.graph.group(id).rules.len() {
            let count = self.rule(id, index);
            if let Visit::InProgress(partial) = &mut self.visits[id.0] {
                *partial += count;
            }
        }

        let total = match std::mem::replace(&mut self.visits[id.0], Visit::Unvisited) {
            Visit::InProgress(total) | Visit::Done(total) => total,
            Visit::Unvisited => BigUint::zero(),
        };
        self.visits[id.0] = Visit::Done(total.clone());
        total
    }

    fn rule(&mut self, id: GroupId, index: usize) -> BigUint {
        if let Some(count) = &self.rules[id.0][index] {
            return count.clone();
        }

        let graph = self.graph;
        let mut product = BigUint::one();
        for &reference in &graph.group(id).rules[index].references {
            product *= self.group(reference);
        }
        self.rules[id.0][index] = Some(product.clone());
        product
    }
}

/// Format a count with `.` between groups of three digits: `1.234.567`.
pub fn format_count(count: &BigUint) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(digit);
    }
    out
}
