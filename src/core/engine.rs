/// The engine facade: grammar → graph → text, counts, DOT, prepared grammar.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::OnceCell;
use std::path::PathBuf;
use tracing::info;

use crate::core::cardinality::Cardinalities;
use crate::core::expand::{ChoiceStrategy, Expander, RandomChoice};
use crate::core::export::{DotGraph, DotStyle};
use crate::core::grammar::{Grammar, GrammarError, ORIGIN};
use crate::core::graph::{GrammarGraph, GraphOptions};
use crate::core::lint::{lint, LintReport};
use crate::core::prepare::prepare_from;

/// A loaded, validated grammar ready for generation. Built via
/// `TraceryEngine::builder()`.
pub struct TraceryEngine {
    grammar: Grammar,
    graph: GrammarGraph,
    cardinalities: OnceCell<Cardinalities>,
    max_depth: Option<usize>,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `TraceryEngine`.
#[derive(Debug, Default)]
pub struct TraceryEngineBuilder {
    grammar_path: Option<PathBuf>,
    /// Directly provided grammar (for testing without files).
    grammar: Option<Grammar>,
    seed: Option<u64>,
    max_depth: Option<usize>,
    dedup_rules: bool,
}

impl TraceryEngine {
    pub fn builder() -> TraceryEngineBuilder {
        TraceryEngineBuilder::default()
    }

    /// Expand the `origin` symbol.
    pub fn generate(&mut self) -> Result<String, GrammarError> {
        self.flatten(ORIGIN)
    }

    /// Expand `symbol` with the engine's seeded generator. Each call moves
    /// the generator on, so repeated calls give different text.
    pub fn flatten(&mut self, symbol: &str) -> Result<String, GrammarError> {
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));
        let text = self.expand_with(symbol, &mut RandomChoice::new(rng))?;
        self.generation_count += 1;
        Ok(text)
    }

    /// Generate `count` texts from `origin`.
    pub fn generate_variants(&mut self, count: usize) -> Result<Vec<String>, GrammarError> {
        (0..count).map(|_| self.generate()).collect()
    }

    /// Expand `symbol` with a caller-supplied strategy.
    pub fn expand_with<C: ChoiceStrategy + ?Sized>(
        &self,
        symbol: &str,
        strategy: &mut C,
    ) -> Result<String, GrammarError> {
        self.expander().expand(symbol, strategy)
    }

    /// Every expansion of `symbol`, at most `limit` of them.
    pub fn enumerate(&self, symbol: &str, limit: usize) -> Result<Vec<String>, GrammarError> {
        self.expander().enumerate(symbol, limit)
    }

    fn expander(&self) -> Expander<'_> {
        Expander::new(&self.graph).with_max_depth(self.max_depth)
    }

    /// Cardinalities of every group, computed on first use.
    pub fn cardinalities(&self) -> &Cardinalities {
        self.cardinalities
            .get_or_init(|| Cardinalities::compute(&self.graph))
    }

    pub fn cardinality(&self, symbol: &str) -> Result<&BigUint, GrammarError> {
        let id = self
            .graph
            .id_of(symbol)
            .ok_or_else(|| GrammarError::UnknownGroup(symbol.to_string()))?;
        Ok(self.cardinalities().group(id))
    }

    pub fn to_dot(&self, style: DotStyle) -> String {
        let counts = style.needs_cardinalities().then(|| self.cardinalities());
        DotGraph::new(&self.graph, style, counts).to_string()
    }

    /// The groups reachable from `origin`, flattened to literal rules.
    pub fn prepare(&self) -> Result<Grammar, GrammarError> {
        prepare_from(&self.grammar, ORIGIN)
    }

    pub fn lint(&self) -> LintReport {
        lint(&self.graph, ORIGIN)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn graph(&self) -> &GrammarGraph {
        &self.graph
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the generator sequence from the seed.
    pub fn reset(&mut self) {
        self.generation_count = 0;
    }
}

impl TraceryEngineBuilder {
    /// Load the grammar from a JSON or RON file, merging its includes.
    pub fn grammar_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.grammar_path = Some(path.into());
        self
    }

    /// Provide the grammar directly (for testing without files).
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = Some(grammar);
        self
    }

    /// Seed for random generation. Unset, a random seed is drawn.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fail expansions nesting deeper than `depth` instead of recursing
    /// without bound.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sort each group's rules and drop repeats while building the graph.
    pub fn dedup_rules(mut self, dedup: bool) -> Self {
        self.dedup_rules = dedup;
        self
    }

    pub fn build(self) -> Result<TraceryEngine, GrammarError> {
        let grammar = match (self.grammar, self.grammar_path) {
            (Some(grammar), _) => grammar,
            (None, Some(path)) => Grammar::load(&path)?,
            (None, None) => Grammar::default(),
        };

        let options = GraphOptions {
            dedup_rules: self.dedup_rules,
        };
        let graph = GrammarGraph::build_with(&grammar, options)?;
        info!(
            declared = grammar.len(),
            groups = graph.len(),
            "grammar graph built"
        );

        Ok(TraceryEngine {
            grammar,
            graph,
            cardinalities: OnceCell::new(),
            max_depth: self.max_depth,
            seed: self.seed.unwrap_or_else(rand::random),
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expand::FirstChoice;

    const GREETING: &str = r##"{"origin": ["hello #name#"], "name": ["Ann", "Bo"]}"##;

    fn engine(json: &str, seed: u64) -> TraceryEngine {
        TraceryEngine::builder()
            .with_grammar(Grammar::parse_json(json).unwrap())
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = engine(GREETING, 42);
        let mut b = engine(GREETING, 42);
        assert_eq!(a.generate_variants(5).unwrap(), b.generate_variants(5).unwrap());
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut e = engine(GREETING, 3);
        let first = e.generate_variants(4).unwrap();
        e.reset();
        assert_eq!(e.generate_variants(4).unwrap(), first);
    }

    #[test]
    fn variants_cover_both_names() {
        let mut e = engine(GREETING, 11);
        let all = e.generate_variants(40).unwrap();
        assert!(all.iter().any(|t| t == "hello Ann"));
        assert!(all.iter().any(|t| t == "hello Bo"));
    }

    #[test]
    fn expand_with_strategy() {
        let e = engine(GREETING, 0);
        assert_eq!(e.expand_with("origin", &mut FirstChoice).unwrap(), "hello Ann");
    }

    #[test]
    fn cardinality_matches_enumeration() {
        let e = engine(
            r##"{"origin": ["#a# #b#", "#b#"], "a": ["1", "2", "3"], "b": ["x", "y"]}"##,
            0,
        );
        let count = e.cardinality("origin").unwrap();
        let all = e.enumerate("origin", 1000).unwrap();
        assert_eq!(count, &BigUint::from(all.len()));
    }

    #[test]
    fn unknown_symbol_cardinality() {
        let e = engine(GREETING, 0);
        assert!(matches!(e.cardinality("nope"), Err(GrammarError::UnknownGroup(_))));
    }

    #[test]
    fn invalid_grammar_fails_build() {
        let result = TraceryEngine::builder()
            .with_grammar(Grammar::parse_json(r##"{"origin": ["#ghost#"]}"##).unwrap())
            .build();
        assert!(matches!(result, Err(GrammarError::UnresolvedGroup(_))));
    }

    #[test]
    fn max_depth_is_applied() {
        let mut e = TraceryEngine::builder()
            .with_grammar(Grammar::parse_json(r##"{"origin": ["#origin#"]}"##).unwrap())
            .max_depth(10)
            .seed(1)
            .build()
            .unwrap();
        assert!(matches!(e.generate(), Err(GrammarError::DepthLimit { limit: 10, .. })));
    }

    #[test]
    fn dedup_rules_shrinks_groups() {
        let e = TraceryEngine::builder()
            .with_grammar(Grammar::parse_json(r##"{"origin": ["b", "a", "b"]}"##).unwrap())
            .dedup_rules(true)
            .build()
            .unwrap();
        assert_eq!(e.cardinality("origin").unwrap(), &BigUint::from(2u32));
    }

    #[test]
    fn dot_uses_cached_counts() {
        let e = engine(GREETING, 0);
        assert!(e.to_dot(DotStyle::Short).contains("[label=\"origin 2\"]"));
        assert!(e.to_dot(DotStyle::Plain).contains("[label=\"origin\"]"));
    }
}
