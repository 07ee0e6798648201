// Parser module for resolving the entities a source file declares

pub mod ast;
mod python;
pub mod scope;

pub use ast::*;
pub use python::PythonResolver;
pub use scope::ResolutionContext;

use crate::error::Result;

/// Strategy that turns one source file into entity declarations.
///
/// One implementation exists per supported source language. A resolver
/// owns no state that outlives a single `resolve` call other than its
/// parser, so a failure on one file cannot affect the next.
pub trait EntityResolver {
    /// File extension (without the dot) this resolver understands
    fn extension(&self) -> &'static str;

    /// Resolve the classes `file` directly exposes
    fn resolve(&mut self, file: &SourceFile) -> Result<ParsedModule>;
}
