//! GML serialization of the knowledge graph

use petgraph::visit::EdgeRef;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::graph::KnowledgeGraph;

/// Write `graph` in GML to any writer
pub fn write_gml<W: Write>(graph: &KnowledgeGraph, mut out: W) -> std::io::Result<()> {
    let inner = graph.inner();

    writeln!(out, "graph [")?;
    writeln!(out, "  directed 1")?;
    for idx in inner.node_indices() {
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", idx.index())?;
        writeln!(out, "    label \"{}\"", escape(&inner[idx]))?;
        writeln!(out, "  ]")?;
    }
    for edge in inner.edge_references() {
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", edge.source().index())?;
        writeln!(out, "    target {}", edge.target().index())?;
        writeln!(out, "    relation \"{}\"", escape(edge.weight()))?;
        writeln!(out, "  ]")?;
    }
    writeln!(out, "]")?;
    out.flush()
}

/// Write `graph` in GML to a file, replacing it if it exists
pub fn write_gml_file(graph: &KnowledgeGraph, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_gml(graph, BufWriter::new(file))?;
    tracing::debug!("Wrote {} nodes to {}", graph.node_count(), path.display());
    Ok(())
}

/// GML strings cannot contain a bare quote
fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::KnowledgeTriple;

    fn render(graph: &KnowledgeGraph) -> String {
        let mut buf = Vec::new();
        write_gml(graph, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(render(&KnowledgeGraph::new()), "graph [\n  directed 1\n]\n");
    }

    #[test]
    fn test_nodes_and_edges() {
        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("Kit", "is a", "ranger"));

        let expected = "graph [
  directed 1
  node [
    id 0
    label \"Kit\"
  ]
  node [
    id 1
    label \"ranger\"
  ]
  edge [
    source 0
    target 1
    relation \"is a\"
  ]
]
";
        assert_eq!(render(&kg), expected);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("the \"Hero\"", "drinks at", "Bread & Ale"));

        let out = render(&kg);
        assert!(out.contains("label \"the &quot;Hero&quot;\""));
        assert!(out.contains("label \"Bread &amp; Ale\""));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long_term_memory.gml");

        let mut kg = KnowledgeGraph::new();
        kg.add_triple(&KnowledgeTriple::new("a", "b", "c"));
        write_gml_file(&kg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render(&kg));
    }
}
