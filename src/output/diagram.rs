// Class diagram assembly

use crate::analysis::EntityStructure;
use crate::output::uml::format_label;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, info};

/// A diagram node. Bases outside the analyzed set have no label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub name: String,
    pub label: Option<String>,
}

/// Inheritance diagram: one node per entity, edges from base to derived
#[derive(Debug, Default)]
pub struct ClassDiagram {
    graph: DiGraph<DiagramNode, ()>,
    node_map: HashMap<String, NodeIndex>,
    verbose: bool,
}

impl ClassDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an inclusion line for every entity added
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build a diagram from entities in order
    pub fn build<'a>(entities: impl IntoIterator<Item = &'a EntityStructure>, verbose: bool) -> Self {
        let mut diagram = Self::new().with_verbose(verbose);
        for entity in entities {
            diagram.add_entity(entity);
        }
        diagram
    }

    /// Add an entity node and an edge from each of its bases
    pub fn add_entity(&mut self, entity: &EntityStructure) {
        if self.verbose {
            info!("[II] {} - included.", entity.name);
        }

        let node = self.node(&entity.name);
        self.graph[node].label = Some(format_label(entity));

        for base in &entity.bases {
            let base_node = self.node(base);
            self.graph.update_edge(base_node, node, ());
        }
        debug!(entity = %entity.name, bases = entity.bases.len(), "added to diagram");
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            return index;
        }
        let index = self.graph.add_node(DiagramNode {
            name: name.to_string(),
            label: None,
        });
        self.node_map.insert(name.to_string(), index);
        index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn get(&self, name: &str) -> Option<&DiagramNode> {
        self.node_map.get(name).map(|&index| &self.graph[index])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    /// (base, derived) name pairs in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
            )
        })
    }
}
