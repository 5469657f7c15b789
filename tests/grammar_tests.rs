/// Grammar loading and include merging integration tests.

use std::path::Path;
use tracery_engine::core::grammar::{GroupRules, ORIGIN};
use tracery_engine::{Grammar, GrammarError};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new("tests/fixtures").join(name)
}

#[test]
fn simple_grammar_loads_in_order() {
    let grammar = Grammar::load(&fixture("simple.json")).unwrap();
    assert_eq!(grammar.names().collect::<Vec<_>>(), vec!["origin", "name"]);
    assert_eq!(
        grammar.get("name"),
        Some(&GroupRules::Flat(vec!["Ann".into(), "Bo".into()]))
    );
}

#[test]
fn ron_and_json_grammars_match() {
    let json = Grammar::load(&fixture("simple.json")).unwrap();
    let ron = Grammar::load(&fixture("simple.ron")).unwrap();
    assert_eq!(json, ron);
}

#[test]
fn includes_are_merged_after_own_groups() {
    let grammar = Grammar::load(&fixture("french.json")).unwrap();
    assert_eq!(
        grammar.names().collect::<Vec<_>>(),
        vec!["origin", "action", "unused", "animal", "food"]
    );
    assert!(grammar.includes().is_empty());
    assert!(grammar.get("animal").unwrap().is_gendered());
}

#[test]
fn colliding_include_key_fails() {
    let err = Grammar::load(&fixture("duplicate_include.json")).unwrap_err();
    match err {
        GrammarError::DuplicateKey { key, source_file } => {
            assert_eq!(key, "food");
            assert!(source_file.ends_with("french_nouns.json"));
        }
        other => panic!("expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn nested_includes_are_not_followed() {
    // nested_child.json includes a file that does not exist.
    let grammar = Grammar::load(&fixture("nested_include.json")).unwrap();
    assert_eq!(grammar.names().collect::<Vec<_>>(), vec!["origin", "child"]);
}

#[test]
fn missing_file_is_io_error() {
    let err = Grammar::load(&fixture("nowhere.json")).unwrap_err();
    assert!(matches!(err, GrammarError::Io(_)));
}

#[test]
fn json_output_reloads_identically() {
    let grammar = Grammar::load(&fixture("french.json")).unwrap();
    let reparsed = Grammar::parse_json(&grammar.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reparsed, grammar);
    assert!(reparsed.contains(ORIGIN));
}
