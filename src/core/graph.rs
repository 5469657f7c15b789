/// Grammar graph: every group with its parsed rules and the dependency
/// edges their placeholders create.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::grammar::{Grammar, GrammarError};
use crate::core::resolver::{SymbolName, SymbolResolver};
use crate::core::template::{Modifier, Template};

/// Index of a group inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupStatus {
    /// Referenced by a placeholder but not declared yet.
    Pending,
    Resolved,
}

/// One rule of a group, with the group each placeholder points at.
#[derive(Debug, Clone)]
pub struct Rule {
    pub template: Template,
    /// One entry per placeholder, in template order.
    pub references: Vec<GroupId>,
}

impl Rule {
    pub fn source(&self) -> &str {
        &self.template.source
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub status: GroupStatus,
    /// Declared through gender or pronoun naming rather than by a grammar key.
    pub derived: bool,
    /// For derived groups, the gendered group their rules were taken from.
    pub derived_from: Option<GroupId>,
    pub rules: Vec<Rule>,
    /// Distinct referenced groups, in first-reference order.
    pub dependencies: Vec<GroupId>,
}

impl Group {
    fn pending(id: GroupId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: GroupStatus::Pending,
            derived: false,
            derived_from: None,
            rules: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == GroupStatus::Resolved
    }
}

/// Options applied while building a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Drop repeated rules and sort each group's rules.
    pub dedup_rules: bool,
}

/// All groups of a grammar, in first-declaration-or-reference order.
#[derive(Debug, Clone, Default)]
pub struct GrammarGraph {
    groups: Vec<Group>,
    index: FxHashMap<String, GroupId>,
}

impl GrammarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate the graph of a grammar.
    pub fn build(grammar: &Grammar) -> Result<GrammarGraph, GrammarError> {
        Self::build_with(grammar, GraphOptions::default())
    }

    pub fn build_with(grammar: &Grammar, options: GraphOptions) -> Result<GrammarGraph, GrammarError> {
        let mut graph = GrammarGraph::new();
        for (name, rules) in grammar.iter() {
            graph.declare(name, &options.arrange(rules.all_rules()))?;
        }

        // Names such as `pronomdef_animal_masc` never appear as keys; their
        // rules come from the resolver. Declaring them can add new pending
        // groups, which the cursor reaches later.
        let resolver = SymbolResolver::new(grammar);
        let mut cursor = 0;
        while cursor < graph.groups.len() {
            let group = &graph.groups[cursor];
            if !group.is_resolved() && SymbolName::parse(&group.name).is_conventional() {
                let name = group.name.clone();
                let candidates = resolver.resolve(&name)?;
                let base = graph.id_of(SymbolName::parse(&name).base);
                let id = graph.declare(&name, &options.arrange(candidates))?;
                graph.groups[id.0].derived = true;
                graph.groups[id.0].derived_from = base;
            }
            cursor += 1;
        }

        graph.validate()?;
        Ok(graph)
    }

    /// Return the group named `name`, creating it as pending if needed.
    pub fn reference(&mut self, name: &str) -> GroupId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = GroupId(self.groups.len());
        self.groups.push(Group::pending(id, name));
        self.index.insert(name.to_string(), id);
        id
    }

    /// Mark `name` resolved with the given rules, referencing every
    /// placeholder they contain.
    pub fn declare(&mut self, name: &str, rules: &[String]) -> Result<GroupId, GrammarError> {
        let id = self.reference(name);
        if self.groups[id.0].is_resolved() {
            return Err(GrammarError::DuplicateGroup(name.to_string()));
        }
        debug!(group = name, rules = rules.len(), "declaring group");

        let mut parsed = Vec::with_capacity(rules.len());
        for source in rules {
            let template = Template::parse(source)?;
            let references = template
                .placeholders()
                .map(|placeholder| self.reference(&placeholder.symbol))
                .collect();
            parsed.push(Rule {
                template,
                references,
            });
        }

        let group = &mut self.groups[id.0];
        for rule in &parsed {
            for &dependency in &rule.references {
                if !group.dependencies.contains(&dependency) {
                    group.dependencies.push(dependency);
                }
            }
        }
        group.rules = parsed;
        group.status = GroupStatus::Resolved;
        Ok(id)
    }

    /// Fail on the first group that was referenced but never declared.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let Some(pending) = self.groups.iter().find(|group| !group.is_resolved()) else {
            return Ok(());
        };

        // `#name.s#` keeps `.s` in its symbol; name the modifier when the
        // part before the dot is a real group.
        if let Some((base, modifier)) = pending.name.rsplit_once('.') {
            let known_modifier = Modifier::ALL.iter().any(|m| m.name() == modifier);
            if !known_modifier && self.get(base).is_some_and(Group::is_resolved) {
                return Err(GrammarError::UnsupportedModifier {
                    placeholder: pending.name.clone(),
                    modifier: modifier.to_string(),
                });
            }
        }
        Err(GrammarError::UnresolvedGroup(pending.name.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|id| &self.groups[id.0])
    }

    pub fn id_of(&self, name: &str) -> Option<GroupId> {
        self.index.get(name).copied()
    }

    /// Panics if `id` does not come from this graph.
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups reachable from `root` through dependency edges, `root` included.
    pub fn reachable_from(&self, root: GroupId) -> Vec<bool> {
        let mut seen = vec![false; self.groups.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            stack.extend(self.groups[id.0].dependencies.iter().copied());
        }
        seen
    }

    /// Groups lying on a dependency cycle, self-references included.
    pub fn recursive_groups(&self) -> Vec<bool> {
        let mut components = Components {
            graph: self,
            order: vec![None; self.groups.len()],
            low: vec![0; self.groups.len()],
            on_stack: vec![false; self.groups.len()],
            stack: Vec::new(),
            next: 0,
            recursive: vec![false; self.groups.len()],
        };
        for group in &self.groups {
            if components.order[group.id.0].is_none() {
                components.visit(group.id);
            }
        }
        components.recursive
    }
}

/// Tarjan's strongly connected components over dependency edges.
struct Components<'g> {
    graph: &'g GrammarGraph,
    order: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<GroupId>,
    next: usize,
    recursive: Vec<bool>,
}

impl Components<'_> {
    fn visit(&mut self, id: GroupId) {
        self.order[id.0] = Some(self.next);
        self.low[id.0] = self.next;
        self.next += 1;
        self.stack.push(id);
        self.on_stack[id.0] = true;

        let graph = self.graph;
        let dependencies = &graph.group(id).dependencies;
        for &dependency in dependencies {
            match self.order[dependency.0] {
                None => {
                    self.visit(dependency);
                    self.low[id.0] = self.low[id.0].min(self.low[dependency.0]);
                }
                Some(order) if self.on_stack[dependency.0] => {
                    self.low[id.0] = self.low[id.0].min(order);
                }
                Some(_) => {}
            }
        }

        if Some(self.low[id.0]) != self.order[id.0] {
            return;
        }
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member.0] = false;
            component.push(member);
            if member == id {
                break;
            }
        }
        if component.len() > 1 || dependencies.contains(&id) {
            for member in component {
                self.recursive[member.0] = true;
            }
        }
    }
}

impl GraphOptions {
    fn arrange(&self, mut rules: Vec<String>) -> Vec<String> {
        if self.dedup_rules {
            rules.sort();
            rules.dedup();
        }
        rules
    }
}
