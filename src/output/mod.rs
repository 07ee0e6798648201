// Output generation module

pub mod diagram;
pub mod dot;
pub mod uml;

pub use diagram::*;
pub use dot::*;
pub use uml::*;

use crate::analysis::EntityStructure;
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Write entity structures as pretty JSON
pub fn write_json(structures: &[EntityStructure], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(structures)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), entities = structures.len(), "wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("classes.json");
        let mut entity = EntityStructure::new("m.A", "m");
        entity.insert_field("x", "builtins.int");

        write_json(&[entity.clone()], &path).unwrap();

        let parsed: Vec<EntityStructure> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![entity]);
    }
}
