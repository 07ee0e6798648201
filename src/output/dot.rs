// Graphviz output
//
// Writes the class diagram as DOT source and renders images with the
// `dot` executable.

use crate::config::{DiagramConfig, OutputFormat};
use crate::error::{Error, Result};
use crate::output::diagram::ClassDiagram;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// DOT writer for class diagrams
pub struct DotWriter<'a> {
    config: &'a DiagramConfig,
}

impl<'a> DotWriter<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        Self { config }
    }

    /// Generate DOT source for a diagram
    pub fn generate(&self, diagram: &ClassDiagram) -> String {
        let mut lines = Vec::new();
        lines.push("digraph {".to_string());
        lines.push(format!("    // {}", self.config.comment.replace('\n', " ")));
        lines.push(format!("    rankdir={}", self.config.rank_direction.as_str()));
        lines.push("    node [shape=record]".to_string());

        for node in diagram.nodes() {
            if let Some(label) = &node.label {
                lines.push(format!("    {} [label={}]", quote(&node.name), quote(label)));
            }
        }

        for (base, derived) in diagram.edges() {
            lines.push(format!("    {} -> {}", quote(base), quote(derived)));
        }

        lines.push("}".to_string());
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Write DOT source to `path`
    pub fn write(&self, diagram: &ClassDiagram, path: &Path) -> Result<()> {
        std::fs::write(path, self.generate(diagram))?;
        debug!(path = %path.display(), "wrote DOT source");
        Ok(())
    }
}

/// Render `source` with Graphviz into `target`
pub fn render(source: &Path, format: OutputFormat, target: &Path) -> Result<()> {
    if !format.needs_graphviz() {
        return Err(Error::render(format!(
            "format '{}' is not rendered by Graphviz",
            format.extension()
        )));
    }

    let dot = which::which("dot")
        .map_err(|e| Error::render(format!("Graphviz 'dot' executable not found: {}", e)))?;

    debug!(dot = %dot.display(), source = %source.display(), target = %target.display(), "rendering");
    let output = Command::new(&dot)
        .arg(format!("-T{}", format.extension()))
        .arg(source)
        .arg("-o")
        .arg(target)
        .output()?;

    if !output.status.success() {
        return Err(Error::render(format!(
            "dot exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// Quote a DOT identifier or label
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\\\""))
}
