/// Dependencies Schema: print the group dependency graph as DOT.
///
/// Usage: dependencies_schema <grammar> [--style plain|short|long] [--dedup-rules]

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracery_engine::cli::{init_logging, or_exit};
use tracery_engine::core::export::DotStyle;
use tracery_engine::TraceryEngine;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Style {
    /// Group names only
    Plain,
    /// Group names with derivation counts
    Short,
    /// One node per rule, clustered by group
    Long,
}

impl From<Style> for DotStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Plain => DotStyle::Plain,
            Style::Short => DotStyle::Short,
            Style::Long => DotStyle::Long,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dependencies_schema")]
#[command(about = "Export the dependencies between grammar groups as a DOT graph")]
struct Args {
    /// Grammar file (.json or .ron)
    grammar: PathBuf,

    #[arg(long, value_enum, default_value = "plain")]
    style: Style,

    /// Sort rules and drop repeated ones before counting
    #[arg(long)]
    dedup_rules: bool,
}

fn main() {
    init_logging();
    let args = Args::parse();

    let engine = or_exit(
        TraceryEngine::builder()
            .grammar_path(&args.grammar)
            .dedup_rules(args.dedup_rules)
            .seed(0)
            .build(),
    );
    print!("{}", engine.to_dot(args.style.into()));
}
