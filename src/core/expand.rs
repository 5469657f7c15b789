/// Expansion: turns a symbol into finished text by recursively replacing
/// placeholders with one rule of the group they name.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::grammar::GrammarError;
use crate::core::graph::{GrammarGraph, GroupId, Rule};
use crate::core::template::Segment;

/// Picks which rule of a group to expand.
pub trait ChoiceStrategy {
    /// Return an index below `alternatives`, which is never zero.
    fn choose(&mut self, alternatives: usize) -> usize;
}

/// Uniform random pick from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomChoice {
    rng: StdRng,
}

impl RandomChoice {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl ChoiceStrategy for RandomChoice {
    fn choose(&mut self, alternatives: usize) -> usize {
        self.rng.gen_range(0..alternatives)
    }
}

/// Always takes the first rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl ChoiceStrategy for FirstChoice {
    fn choose(&mut self, _alternatives: usize) -> usize {
        0
    }
}

/// Expands symbols of a validated graph.
///
/// Without a depth limit, a grammar whose recursion never bottoms out does
/// not terminate.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'g> {
    graph: &'g GrammarGraph,
    max_depth: Option<usize>,
}

impl<'g> Expander<'g> {
    pub fn new(graph: &'g GrammarGraph) -> Self {
        Self {
            graph,
            max_depth: None,
        }
    }

    /// Fail with `DepthLimit` instead of nesting deeper than `max_depth`.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expand `symbol` into a single string.
    pub fn expand<C: ChoiceStrategy + ?Sized>(
        &self,
        symbol: &str,
        strategy: &mut C,
    ) -> Result<String, GrammarError> {
        let id = self.lookup(symbol)?;
        self.expand_group(id, strategy, 0)
    }

    /// Every expansion of `symbol`, in rule order, stopping after `limit`
    /// results.
    pub fn enumerate(&self, symbol: &str, limit: usize) -> Result<Vec<String>, GrammarError> {
        let id = self.lookup(symbol)?;
        self.enumerate_group(id, limit, 0)
    }

    fn lookup(&self, symbol: &str) -> Result<GroupId, GrammarError> {
        self.graph
            .id_of(symbol)
            .ok_or_else(|| GrammarError::UnknownGroup(symbol.to_string()))
    }

    fn check_depth(&self, id: GroupId, depth: usize) -> Result<(), GrammarError> {
        match self.max_depth {
            Some(limit) if depth > limit => Err(GrammarError::DepthLimit {
                symbol: self.graph.group(id).name.clone(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    fn expand_group<C: ChoiceStrategy + ?Sized>(
        &self,
        id: GroupId,
        strategy: &mut C,
        depth: usize,
    ) -> Result<String, GrammarError> {
        self.check_depth(id, depth)?;
        let group = self.graph.group(id);
        if group.rules.is_empty() {
            return Err(GrammarError::EmptyGroup(group.name.clone()));
        }
        let index = strategy.choose(group.rules.len()) % group.rules.len();
        self.expand_rule(&group.rules[index], strategy, depth)
    }

    fn expand_rule<C: ChoiceStrategy + ?Sized>(
        &self,
        rule: &Rule,
        strategy: &mut C,
        depth: usize,
    ) -> Result<String, GrammarError> {
        let mut out = String::new();
        let mut references = rule.references.iter();
        for segment in &rule.template.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let Some(&id) = references.next() else {
                        return Err(GrammarError::UnresolvedGroup(placeholder.symbol.clone()));
                    };
                    let text = self.expand_group(id, strategy, depth + 1)?;
                    out.push_str(&placeholder.apply_modifiers(text));
                }
            }
        }
        Ok(out)
    }

    fn enumerate_group(&self, id: GroupId, limit: usize, depth: usize) -> Result<Vec<String>, GrammarError> {
        self.check_depth(id, depth)?;
        let mut out = Vec::new();
        for rule in &self.graph.group(id).rules {
            let remaining = limit - out.len();
            if remaining == 0 {
                break;
            }
            out.extend(self.enumerate_rule(rule, remaining, depth)?);
        }
        Ok(out)
    }

    fn enumerate_rule(&self, rule: &Rule, limit: usize, depth: usize) -> Result<Vec<String>, GrammarError> {
        let mut partials = vec![String::new()];
        let mut references = rule.references.iter();
        for segment in &rule.template.segments {
            match segment {
                Segment::Literal(text) => partials.iter_mut().for_each(|p| p.push_str(text)),
                Segment::Placeholder(placeholder) => {
                    let Some(&id) = references.next() else {
                        return Err(GrammarError::UnresolvedGroup(placeholder.symbol.clone()));
                    };
                    let options: Vec<String> = self
                        .enumerate_group(id, limit, depth + 1)?
                        .into_iter()
                        .map(|text| placeholder.apply_modifiers(text))
                        .collect();
                    partials = partials
                        .iter()
                        .flat_map(|prefix| options.iter().map(move |option| format!("{prefix}{option}")))
                        .take(limit)
                        .collect();
                }
            }
        }
        Ok(partials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grammar::Grammar;
    use std::collections::BTreeSet;

    fn graph(json: &str) -> GrammarGraph {
        GrammarGraph::build(&Grammar::parse_json(json).unwrap()).unwrap()
    }

    /// Replays a fixed list of choices.
    struct Scripted(Vec<usize>);

    impl ChoiceStrategy for Scripted {
        fn choose(&mut self, _alternatives: usize) -> usize {
            self.0.remove(0)
        }
    }

    #[test]
    fn random_expansion_matches_a_rule() {
        let g = graph(r##"{"origin": ["hello #name#"], "name": ["Ann", "Bo"]}"##);
        let expander = Expander::new(&g);
        for seed in 0..20 {
            let text = expander
                .expand("origin", &mut RandomChoice::from_seed(seed))
                .unwrap();
            assert!(text == "hello Ann" || text == "hello Bo", "got {text}");
        }
    }

    #[test]
    fn random_expansion_is_deterministic_per_seed() {
        let g = graph(r##"{"origin": ["#a##a##a#"], "a": ["1", "2", "3", "4"]}"##);
        let expander = Expander::new(&g);
        let first = expander.expand("origin", &mut RandomChoice::from_seed(7)).unwrap();
        let second = expander.expand("origin", &mut RandomChoice::from_seed(7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scripted_choices_select_rules() {
        let g = graph(r##"{"origin": ["#a#-#a#"], "a": ["x", "y"]}"##);
        let text = Expander::new(&g)
            .expand("origin", &mut Scripted(vec![0, 1, 0]))
            .unwrap();
        assert_eq!(text, "y-x");
    }

    #[test]
    fn capitalize_applies_to_expansion() {
        let g = graph(
            r##"{"origin": ["#pronomdef_animal_fem.capitalize# dort."], "animal": {"fem": ["souris"]}}"##,
        );
        let text = Expander::new(&g).expand("origin", &mut FirstChoice).unwrap();
        assert_eq!(text, "La souris dort.");
    }

    #[test]
    fn unknown_start_symbol() {
        let g = graph(r##"{"start": ["x"]}"##);
        let err = Expander::new(&g).expand("origin", &mut FirstChoice).unwrap_err();
        assert!(matches!(err, GrammarError::UnknownGroup(ref n) if n == "origin"));
    }

    #[test]
    fn empty_group_fails() {
        let g = graph(r##"{"origin": ["#nothing#"], "nothing": []}"##);
        let err = Expander::new(&g).expand("origin", &mut FirstChoice).unwrap_err();
        assert!(matches!(err, GrammarError::EmptyGroup(ref n) if n == "nothing"));
    }

    #[test]
    fn depth_limit_stops_runaway_recursion() {
        let g = graph(r##"{"origin": ["more #origin#"]}"##);
        let err = Expander::new(&g)
            .with_max_depth(Some(50))
            .expand("origin", &mut FirstChoice)
            .unwrap_err();
        assert!(matches!(err, GrammarError::DepthLimit { limit: 50, .. }));
    }

    #[test]
    fn enumerate_lists_every_derivation() {
        let g = graph(
            r##"{"origin": ["#a# #b#", "#a#!"], "a": ["1", "2"], "b": ["x", "#a#"]}"##,
        );
        let all = Expander::new(&g).enumerate("origin", 100).unwrap();
        assert_eq!(
            all,
            vec!["1 x", "1 1", "1 2", "2 x", "2 1", "2 2", "1!", "2!"]
        );
    }

    #[test]
    fn enumerate_respects_limit() {
        let g = graph(r##"{"origin": ["#a##a##a#"], "a": ["1", "2", "3"]}"##);
        let all = Expander::new(&g).enumerate("origin", 5).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn random_outputs_stay_within_enumeration() {
        let g = graph(
            r##"{"origin": ["#pronomindef_thing_masc# et #thing_fem#"], "thing": {"masc": ["arbre", "chat"], "fem": ["fleur"], "*": ["enfant"]}}"##,
        );
        let expander = Expander::new(&g);
        let all: BTreeSet<_> = expander.enumerate("origin", 100).unwrap().into_iter().collect();
        assert_eq!(all.len(), 6);
        for seed in 0..30 {
            let text = expander
                .expand("origin", &mut RandomChoice::from_seed(seed))
                .unwrap();
            assert!(all.contains(&text), "unexpected {text}");
        }
    }
}
