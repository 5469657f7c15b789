/// Samples: expand a grammar's `origin` and print the results.
///
/// Usage: samples <grammar> [--count <n>] [--seed <n>]

use clap::Parser;
use std::path::PathBuf;
use tracery_engine::cli::{init_logging, or_exit};
use tracery_engine::TraceryEngine;

#[derive(Parser, Debug)]
#[command(name = "samples")]
#[command(about = "Generate text from a Tracery grammar")]
struct Args {
    /// Grammar file (.json or .ron)
    grammar: PathBuf,

    /// Number of texts to generate
    #[arg(long, short = 'n', default_value_t = 1)]
    count: usize,

    /// Seed for reproducible output
    #[arg(long, short = 's')]
    seed: Option<u64>,
}

fn main() {
    init_logging();
    let args = Args::parse();

    let mut builder = TraceryEngine::builder().grammar_path(&args.grammar);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut engine = or_exit(builder.build());

    for text in or_exit(engine.generate_variants(args.count)) {
        println!("{text}");
    }
}
