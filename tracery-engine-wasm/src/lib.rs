//! WASM bindings for tracery-engine, powering the grammar playground.

use wasm_bindgen::prelude::*;

use tracery_engine::core::export::DotStyle;
use tracery_engine::core::grammar::ORIGIN;
use tracery_engine::core::cardinality::format_count;
use tracery_engine::{Grammar, TraceryEngine};

/// Grammar loaded when the playground opens.
const DEMO_GRAMMAR: &str = include_str!("../../grammars/bestiaire.json");

/// Nesting limit for grammars typed in the browser, which may never bottom out.
const MAX_DEPTH: usize = 64;

#[derive(serde::Serialize)]
struct GroupInfo {
    name: String,
    rules: usize,
    derived: bool,
    count: String,
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

#[wasm_bindgen]
pub struct TraceryDemo {
    engine: TraceryEngine,
    source: String,
}

#[wasm_bindgen]
impl TraceryDemo {
    /// Create a demo from a JSON grammar and a seed.
    #[wasm_bindgen(constructor)]
    pub fn new(grammar_json: &str, seed: u64) -> Result<TraceryDemo, JsError> {
        let grammar =
            Grammar::parse_json(grammar_json).map_err(|e| js_error("Grammar parse error", e))?;
        let engine = TraceryEngine::builder()
            .with_grammar(grammar)
            .seed(seed)
            .max_depth(MAX_DEPTH)
            .build()
            .map_err(|e| js_error("Engine build error", e))?;

        Ok(TraceryDemo {
            engine,
            source: grammar_json.to_string(),
        })
    }

    /// The bundled French bestiary grammar.
    pub fn demo(seed: u64) -> Result<TraceryDemo, JsError> {
        TraceryDemo::new(DEMO_GRAMMAR, seed)
    }

    pub fn demo_grammar() -> String {
        DEMO_GRAMMAR.to_string()
    }

    /// Expand `origin`.
    pub fn generate(&mut self) -> Result<String, JsError> {
        self.engine
            .generate()
            .map_err(|e| js_error("Expansion error", e))
    }

    /// Generate `count` texts. Returns a JSON array of strings.
    pub fn generate_variants(&mut self, count: usize) -> Result<String, JsError> {
        let variants = self
            .engine
            .generate_variants(count)
            .map_err(|e| js_error("Expansion error", e))?;
        serde_json::to_string(&variants).map_err(|e| js_error("Serialization error", e))
    }

    /// Expand any group by name.
    pub fn flatten(&mut self, symbol: &str) -> Result<String, JsError> {
        self.engine
            .flatten(symbol)
            .map_err(|e| js_error("Expansion error", e))
    }

    /// Number of distinct texts `symbol` can produce, formatted with `.`
    /// thousands separators.
    pub fn cardinality(&self, symbol: &str) -> Result<String, JsError> {
        self.engine
            .cardinality(symbol)
            .map(format_count)
            .map_err(|e| js_error("Unknown group", e))
    }

    /// DOT graph in the given style (`plain`, `short` or `long`).
    pub fn dot(&self, style: &str) -> Result<String, JsError> {
        let style = match style {
            "plain" => DotStyle::Plain,
            "short" => DotStyle::Short,
            "long" => DotStyle::Long,
            _ => return Err(JsError::new(&format!("Unknown style: {style}"))),
        };
        Ok(self.engine.to_dot(style))
    }

    /// The prepared grammar as pretty JSON.
    pub fn prepared(&self) -> Result<String, JsError> {
        self.engine
            .prepare()
            .and_then(|grammar| grammar.to_json_pretty())
            .map_err(|e| js_error("Preparation error", e))
    }

    /// Return a JSON array describing every group of the graph.
    pub fn groups(&self) -> Result<String, JsError> {
        let counts = self.engine.cardinalities();
        let groups: Vec<GroupInfo> = self
            .engine
            .graph()
            .groups()
            .iter()
            .map(|group| GroupInfo {
                name: group.name.clone(),
                rules: group.rules.len(),
                derived: group.derived,
                count: format_count(counts.group(group.id)),
            })
            .collect();
        serde_json::to_string(&groups).map_err(|e| js_error("Serialization error", e))
    }

    /// Return JSON `{errors, warnings}` from the linter.
    pub fn lint(&self) -> Result<String, JsError> {
        let report = self.engine.lint();
        serde_json::to_string(&serde_json::json!({
            "errors": report.errors,
            "warnings": report.warnings,
        }))
        .map_err(|e| js_error("Serialization error", e))
    }

    pub fn start_symbol() -> String {
        ORIGIN.to_string()
    }

    /// Reset the engine with a new seed (same grammar).
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let new_demo = TraceryDemo::new(&self.source.clone(), seed)?;
        self.engine = new_demo.engine;
        Ok(())
    }
}
