/// Grammar Linter: validates a grammar's structure.
///
/// Usage: grammar_linter <grammar>

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracery_engine::cli::init_logging;
use tracery_engine::TraceryEngine;

#[derive(Parser, Debug)]
#[command(name = "grammar_linter")]
#[command(about = "Check a grammar for unreachable, empty, and non-terminating groups")]
struct Args {
    /// Grammar file (.json or .ron)
    grammar: PathBuf,
}

fn main() {
    init_logging();
    let args = Args::parse();

    let engine = match TraceryEngine::builder()
        .grammar_path(&args.grammar)
        .seed(0)
        .build()
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: Failed to load grammar: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} groups ({} after name resolution)",
        engine.grammar().len(),
        engine.graph().len()
    );

    let report = engine.lint();

    println!("\n=== Grammar Lint Report ===\n");

    if report.is_clean() {
        println!("All checks passed!");
    }

    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }

    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    if !report.errors.is_empty() {
        process::exit(1);
    }
}
