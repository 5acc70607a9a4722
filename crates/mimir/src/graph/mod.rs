//! Long-term knowledge graph
//!
//! Facts pulled out of the conversation are stored as a directed graph of
//! entities. [`GraphMemory`] keeps the graph up to date and turns it back
//! into prompt context.

pub mod gml;
pub mod memory;
pub mod parse;

pub use memory::GraphMemory;
pub use parse::{KG_TRIPLE_DELIMITER, parse_entities, parse_triples};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A `(subject, predicate, object)` fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KnowledgeTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl KnowledgeTriple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for KnowledgeTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// Directed graph of entities; each edge carries the relation between them
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Insert a fact. Missing entities are created; an existing edge between
    /// the same subject and object has its relation replaced.
    pub fn add_triple(&mut self, triple: &KnowledgeTriple) {
        let subject = self.node(&triple.subject);
        let object = self.node(&triple.object);
        self.graph
            .update_edge(subject, object, triple.predicate.clone());
    }

    /// Facts whose subject is `entity`, rendered as `subject relation object`.
    /// Facts about an entity and itself are left out.
    pub fn entity_knowledge(&self, entity: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(entity) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges(idx)
            .filter(|e| e.target() != idx)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| format!("{} {} {}", entity, e.weight(), self.graph[e.target()]))
            .collect()
    }

    /// Whether `entity` has been seen
    pub fn contains(&self, entity: &str) -> bool {
        self.index.contains_key(entity)
    }

    /// Entity names in insertion order
    pub fn entities(&self) -> Vec<&str> {
        self.graph.node_weights().map(String::as_str).collect()
    }

    /// Every stored fact in insertion order
    pub fn triples(&self) -> Vec<KnowledgeTriple> {
        self.graph
            .edge_references()
            .map(|e| {
                KnowledgeTriple::new(
                    self.graph[e.source()].clone(),
                    e.weight().clone(),
                    self.graph[e.target()].clone(),
                )
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, String> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeGraph {
        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("Priestess", "is a member of", "the Guild"));
        kg.add_triple(&KnowledgeTriple::new("Priestess", "travels with", "Goblin Slayer"));
        kg.add_triple(&KnowledgeTriple::new("Goblin Slayer", "hunts", "goblins"));
        kg
    }

    #[test]
    fn test_triple_display() {
        let triple = KnowledgeTriple::new("Nim", "is", "a dwarf");
        assert_eq!(triple.to_string(), "(Nim, is, a dwarf)");
    }

    #[test]
    fn test_add_triple_creates_nodes_once() {
        let kg = sample();
        assert_eq!(kg.node_count(), 4);
        assert_eq!(kg.edge_count(), 3);
        assert_eq!(
            kg.entities(),
            vec!["Priestess", "the Guild", "Goblin Slayer", "goblins"]
        );
        assert!(kg.contains("goblins"));
        assert!(!kg.contains("dragons"));
    }

    #[test]
    fn test_entity_knowledge() {
        let kg = sample();
        assert_eq!(
            kg.entity_knowledge("Priestess"),
            vec![
                "Priestess is a member of the Guild",
                "Priestess travels with Goblin Slayer"
            ]
        );
        assert_eq!(
            kg.entity_knowledge("Goblin Slayer"),
            vec!["Goblin Slayer hunts goblins"]
        );
        assert!(kg.entity_knowledge("goblins").is_empty());
        assert!(kg.entity_knowledge("unknown").is_empty());
    }

    #[test]
    fn test_entity_knowledge_skips_self_loops() {
        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("Kit", "is", "Kit"));
        kg.add_triple(&KnowledgeTriple::new("Kit", "owns", "a longbow"));

        assert_eq!(kg.entity_knowledge("Kit"), vec!["Kit owns a longbow"]);
        assert_eq!(kg.edge_count(), 2);
    }

    #[test]
    fn test_same_edge_replaces_relation() {
        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("Kit", "likes", "ale"));
        kg.add_triple(&KnowledgeTriple::new("Kit", "hates", "ale"));

        assert_eq!(kg.edge_count(), 1);
        assert_eq!(kg.entity_knowledge("Kit"), vec!["Kit hates ale"]);
    }

    #[test]
    fn test_triples_roundtrip_order() {
        let kg = sample();
        let triples = kg.triples();
        assert_eq!(triples.len(), 3);
        assert_eq!(
            triples[2],
            KnowledgeTriple::new("Goblin Slayer", "hunts", "goblins")
        );
    }

    #[test]
    fn test_clear() {
        let mut kg = sample();
        kg.clear();
        assert!(kg.is_empty());
        assert!(kg.entity_knowledge("Priestess").is_empty());

        kg.add_triple(&KnowledgeTriple::new("a", "b", "c"));
        assert_eq!(kg.node_count(), 2);
    }
}
