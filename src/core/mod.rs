pub mod cardinality;
pub mod engine;
pub mod expand;
pub mod export;
pub mod grammar;
pub mod graph;
pub mod lint;
pub mod prepare;
pub mod resolver;
pub mod template;
