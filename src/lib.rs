//! Tracery Engine: Tracery-style grammar expansion for French text.
//!
//! Loads a JSON or RON grammar of named rule groups, resolves gendered
//! groups and article prefixes, and expands `#symbol#` placeholders into
//! text. The same grammar graph drives derivation counting, DOT dependency
//! graphs, and a preparation pass that flattens a grammar to what its
//! `origin` can reach.

pub mod cli;
pub mod core;

pub use crate::core::engine::{TraceryEngine, TraceryEngineBuilder};
pub use crate::core::grammar::{Grammar, GrammarError};
