/// Prepare: flatten a grammar to the groups reachable from `origin` and
/// write it next to the input as `<name>_prepared.json`.
///
/// Usage: prepare <grammar>

use clap::Parser;
use std::path::PathBuf;
use tracery_engine::cli::{init_logging, or_exit};
use tracery_engine::core::prepare::{prepare, write_prepared};
use tracery_engine::Grammar;

#[derive(Parser, Debug)]
#[command(name = "prepare")]
#[command(about = "Prepare a grammar for consumption by a Tracery runtime")]
struct Args {
    /// Grammar file (.json or .ron)
    grammar: PathBuf,
}

fn main() {
    init_logging();
    let args = Args::parse();

    // Works on the raw grammar: groups that fail to resolve but are never
    // reached from origin do not stop preparation.
    let grammar = or_exit(Grammar::load(&args.grammar));
    let prepared = or_exit(prepare(&grammar));
    or_exit(write_prepared(&prepared, &args.grammar));
}
