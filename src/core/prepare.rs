/// Preparation: flattens a grammar to the groups reachable from a root,
/// with gendered and pronoun-prefixed names resolved to literal rule lists.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::grammar::{Grammar, GrammarError, GroupRules, ORIGIN};
use crate::core::resolver::SymbolResolver;
use crate::core::template::Template;

/// Prepare `grammar` from [`ORIGIN`].
pub fn prepare(grammar: &Grammar) -> Result<Grammar, GrammarError> {
    prepare_from(grammar, ORIGIN)
}

/// Walk `grammar` from `root` and collect every group a placeholder can
/// reach. Groups appear in the order they are first processed.
pub fn prepare_from(grammar: &Grammar, root: &str) -> Result<Grammar, GrammarError> {
    let resolver = SymbolResolver::new(grammar);
    let mut prepared = Grammar::new();
    let mut to_process = vec![root.to_string()];

    while let Some(name) = to_process.pop() {
        if prepared.contains(&name) {
            continue;
        }
        debug!("Processing [{name}]");

        let rules = resolver.resolve(&name)?;
        for rule in &rules {
            let template = Template::parse(rule)?;
            to_process.extend(template.placeholders().map(|p| p.symbol.clone()));
        }
        prepared.insert(name, GroupRules::Flat(rules))?;
    }

    Ok(prepared)
}

/// `dir/name.json` becomes `dir/name_prepared.json`.
pub fn prepared_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_prepared.json"))
}

/// Write a prepared grammar as pretty JSON next to `source`, returning the
/// path written.
pub fn write_prepared(prepared: &Grammar, source: &Path) -> Result<PathBuf, GrammarError> {
    let target = prepared_path(source);
    std::fs::write(&target, prepared.to_json_pretty()?)?;
    info!("Wrote [{}]", target.display());
    Ok(target)
}
