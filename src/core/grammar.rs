/// Grammar documents: the ordered group table, loading, and `#include` merging.

use rustc_hash::FxHashMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::resolver::Gender;

/// Key whose value lists sibling grammar files to merge in.
pub const INCLUDE_DIRECTIVE: &str = "#include";
/// Default start symbol.
pub const ORIGIN: &str = "origin";

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("[{template}] has unbalanced #")]
    UnbalancedDelimiters { template: String },
    #[error("unknown group [{0}]")]
    UnknownGroup(String),
    #[error("group [{group}] has an invalid shape: expected {expected}")]
    InvalidGroupShape { group: String, expected: String },
    #[error("unresolved group [{0}]")]
    UnresolvedGroup(String),
    #[error("unsupported modifier [{modifier}] in placeholder [{placeholder}]")]
    UnsupportedModifier { placeholder: String, modifier: String },
    #[error("group [{0}] is declared twice")]
    DuplicateGroup(String),
    #[error("existing key [{key}] found in [{}]", .source_file.display())]
    DuplicateKey { key: String, source_file: PathBuf },
    #[error("group [{0}] has no rules to expand")]
    EmptyGroup(String),
    #[error("expansion of [{symbol}] went deeper than {limit} levels")]
    DepthLimit { symbol: String, limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Per-gender rule lists of a gendered group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenderedRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masc: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fem: Option<Vec<String>>,
    /// Entries shared by every gender (`*`).
    #[serde(default, rename = "*", skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<String>>,
}

impl GenderedRules {
    pub fn for_gender(&self, gender: Gender) -> Option<&Vec<String>> {
        match gender {
            Gender::Masc => self.masc.as_ref(),
            Gender::Fem => self.fem.as_ref(),
        }
    }

    /// Candidates for one gender, with the shared entries appended.
    pub fn candidates(&self, gender: Gender) -> Option<Vec<String>> {
        let mut candidates = self.for_gender(gender)?.clone();
        candidates.extend(self.any.iter().flatten().cloned());
        Some(candidates)
    }
}

/// The rules of one group, either a flat list or split by gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRules {
    Flat(Vec<String>),
    Gendered(GenderedRules),
}

impl GroupRules {
    /// Every rule of the group: gendered groups list `masc`, `fem`, then `*`.
    pub fn all_rules(&self) -> Vec<String> {
        match self {
            Self::Flat(rules) => rules.clone(),
            Self::Gendered(gendered) => [&gendered.masc, &gendered.fem, &gendered.any]
                .into_iter()
                .flatten()
                .flatten()
                .cloned()
                .collect(),
        }
    }

    pub fn is_gendered(&self) -> bool {
        matches!(self, Self::Gendered(_))
    }
}

/// A grammar document: group names mapped to rules, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    groups: Vec<(String, GroupRules)>,
    index: FxHashMap<String, usize>,
    includes: Vec<String>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group. Names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, rules: GroupRules) -> Result<(), GrammarError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GrammarError::DuplicateGroup(name));
        }
        self.index.insert(name.clone(), self.groups.len());
        self.groups.push((name, rules));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GroupRules> {
        self.index.get(name).map(|&i| &self.groups[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Groups in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupRules)> {
        self.groups.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Paths listed under `#include` that have not been merged yet.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Parse a grammar from a JSON string.
    pub fn parse_json(input: &str) -> Result<Grammar, GrammarError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a grammar from a RON string.
    pub fn parse_ron(input: &str) -> Result<Grammar, GrammarError> {
        Ok(ron::from_str(input)?)
    }

    /// Load a grammar file and merge the files named by its `#include` key.
    ///
    /// Include paths are relative to the including file. Files ending in
    /// `.ron` are read as RON, everything else as JSON.
    pub fn load(path: &Path) -> Result<Grammar, GrammarError> {
        let mut grammar = Self::load_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        for include in std::mem::take(&mut grammar.includes) {
            let include_path = base_dir.join(include);
            let included = Self::load_file(&include_path)?;
            if !included.includes.is_empty() {
                warn!(
                    path = %include_path.display(),
                    "nested {INCLUDE_DIRECTIVE} directives are not followed"
                );
            }
            grammar.merge_included(included, &include_path)?;
        }

        Ok(grammar)
    }

    fn load_file(path: &Path) -> Result<Grammar, GrammarError> {
        info!("Reading [{}]", path.display());
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("ron") => Self::parse_ron(&contents),
            _ => Self::parse_json(&contents),
        }
    }

    /// Merge the groups of an included document. Keys may not collide.
    pub fn merge_included(&mut self, other: Grammar, source_file: &Path) -> Result<(), GrammarError> {
        for (name, rules) in other.groups {
            if self.contains(&name) {
                return Err(GrammarError::DuplicateKey {
                    key: name,
                    source_file: source_file.to_path_buf(),
                });
            }
            self.insert(name, rules)?;
        }
        Ok(())
    }

    /// Pretty-printed JSON, groups in declaration order.
    pub fn to_json_pretty(&self) -> Result<String, GrammarError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Grammar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let include_entry = usize::from(!self.includes.is_empty());
        let mut map = serializer.serialize_map(Some(self.groups.len() + include_entry))?;
        if !self.includes.is_empty() {
            map.serialize_entry(INCLUDE_DIRECTIVE, &self.includes)?;
        }
        for (name, rules) in &self.groups {
            map.serialize_entry(name, rules)?;
        }
        map.end()
    }
}

// Hand-written so declaration order survives whatever map type the
// format would otherwise deserialize into.
impl<'de> Deserialize<'de> for Grammar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GrammarVisitor;

        impl<'de> Visitor<'de> for GrammarVisitor {
            type Value = Grammar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from group names to rule lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Grammar, A::Error> {
                let mut grammar = Grammar::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == INCLUDE_DIRECTIVE {
                        grammar.includes.extend(map.next_value::<Vec<String>>()?);
                        continue;
                    }
                    let rules = map.next_value::<GroupRules>()?;
                    grammar.insert(key, rules).map_err(de::Error::custom)?;
                }
                Ok(grammar)
            }
        }

        deserializer.deserialize_map(GrammarVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_declaration_order() {
        let g = Grammar::parse_json(r##"{"zeta": ["z"], "alpha": ["a"], "origin": ["#zeta#"]}"##)
            .unwrap();
        assert_eq!(g.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "origin"]);
    }

    #[test]
    fn parse_gendered_group() {
        let g = Grammar::parse_json(
            r##"{"greeting": {"masc": ["boy"], "fem": ["girl"], "*": ["kid"]}}"##,
        )
        .unwrap();
        let GroupRules::Gendered(rules) = g.get("greeting").unwrap() else {
            panic!("expected a gendered group");
        };
        assert_eq!(rules.candidates(Gender::Masc).unwrap(), vec!["boy", "kid"]);
        assert_eq!(rules.candidates(Gender::Fem).unwrap(), vec!["girl", "kid"]);
        assert_eq!(
            g.get("greeting").unwrap().all_rules(),
            vec!["boy", "girl", "kid"]
        );
    }

    #[test]
    fn unknown_gender_tag_is_rejected() {
        assert!(Grammar::parse_json(r##"{"g": {"neutral": ["x"]}}"##).is_err());
    }

    #[test]
    fn duplicate_key_in_document_is_rejected() {
        let err = Grammar::parse_json(r##"{"a": ["x"], "a": ["y"]}"##).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn include_directive_is_kept_apart() {
        let g = Grammar::parse_json(r##"{"#include": ["nouns.json"], "origin": ["x"]}"##).unwrap();
        assert_eq!(g.includes(), &["nouns.json".to_string()]);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn merge_included_rejects_collisions() {
        let mut base = Grammar::parse_json(r##"{"origin": ["#a#"], "a": ["x"]}"##).unwrap();
        let other = Grammar::parse_json(r##"{"a": ["y"]}"##).unwrap();
        let err = base
            .merge_included(other, Path::new("other.json"))
            .unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateKey { ref key, .. } if key == "a"));
        assert_eq!(err.to_string(), "existing key [a] found in [other.json]");
    }

    #[test]
    fn parse_ron_document() {
        let g = Grammar::parse_ron(
            r##"{"origin": ["#animal_fem#"], "animal": {"fem": ["souris"], "*": ["ours"]}}"##,
        )
        .unwrap();
        assert_eq!(g.len(), 2);
        assert!(g.get("animal").unwrap().is_gendered());
    }

    #[test]
    fn json_output_preserves_order() {
        let source = r##"{"b": ["#a#"], "a": ["x"]}"##;
        let g = Grammar::parse_json(source).unwrap();
        let json = g.to_json_pretty().unwrap();
        assert!(json.find("\"b\"").unwrap() < json.find("\"a\"").unwrap());
        assert_eq!(Grammar::parse_json(&json).unwrap(), g);
    }
}
