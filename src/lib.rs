//! Umlizer - Generate UML class diagrams from Python codebases
//!
//! Resolves Python classes statically, normalizes dataclass and plain
//! class declarations into one structure, and renders them as a Graphviz
//! inheritance diagram.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{EntityStructure, Extraction, Extractor};
pub use config::Config;
pub use error::{Error, Result};
