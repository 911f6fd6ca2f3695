use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::neighborhood::Neighborhood;
use crate::types::{NodeOrigin, PaperRecord};

/// Label used for neighborhood papers the provider gave no title for.
pub const NO_TITLE: &str = "no title";

/// Attributes shown for a node. Absent attributes are `None`, never defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttributes {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub reference_count: Option<u64>,
    pub citation_count: Option<u64>,
    pub venue: Option<String>,
}

impl NodeAttributes {
    /// `(name, value)` pairs for every present attribute, in display order.
    pub fn present(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(title) = &self.title {
            out.push(("title", title.clone()));
        }
        if let Some(year) = self.year {
            out.push(("year", year.to_string()));
        }
        if let Some(n) = self.reference_count {
            out.push(("refcount", n.to_string()));
        }
        if let Some(n) = self.citation_count {
            out.push(("citecount", n.to_string()));
        }
        if let Some(venue) = &self.venue {
            out.push(("venue", venue.clone()));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub origin: NodeOrigin,
    pub attributes: NodeAttributes,
}

/// Citation graph ready for layout. An edge runs from a citing paper to the
/// paper it references.
#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    graph: DiGraph<Node, ()>,
    id_to_node: HashMap<String, NodeIndex>,
}

impl CitationGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order: bibliography papers first, then neighbors.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.graph.node_indices().map(|i| (i, &self.graph[i]))
    }

    /// `(source, target)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.id_to_node.get(id).map(|&i| &self.graph[i])
    }

    #[cfg(test)]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.id_to_node.get(from), self.id_to_node.get(to)) {
            (Some(&s), Some(&t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    pub fn count(&self, origin: NodeOrigin) -> usize {
        self.weights().filter(|n| n.origin == origin).count()
    }

    fn weights(&self) -> impl Iterator<Item = &Node> {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    fn add_node(&mut self, id: &str, origin: NodeOrigin, attributes: NodeAttributes) -> NodeIndex {
        let idx = self.graph.add_node(Node {
            id: id.to_string(),
            origin,
            attributes,
        });
        self.id_to_node.insert(id.to_string(), idx);
        idx
    }
}

impl PartialEq for CitationGraph {
    fn eq(&self, other: &Self) -> bool {
        self.weights().eq(other.weights()) && self.edges().eq(other.edges())
    }
}

/// Build nodes for every bibliography paper and every selected neighborhood
/// paper, and an edge for each reference that lands on one of them.
///
/// A paper id seen twice yields one node; only its first record contributes
/// edges. References to anything else are dropped.
pub fn assemble(papers: &[PaperRecord], neighborhood: &Neighborhood) -> CitationGraph {
    let mut graph = CitationGraph::default();

    let mut sources = Vec::with_capacity(papers.len());
    for paper in papers {
        if graph.id_to_node.contains_key(&paper.id) {
            continue;
        }
        let attributes = NodeAttributes {
            title: paper.title.clone(),
            year: paper.year,
            reference_count: paper.reference_count,
            citation_count: paper.citation_count,
            venue: paper.venue.clone(),
        };
        let idx = graph.add_node(&paper.id, NodeOrigin::Primary, attributes);
        sources.push((idx, paper));
    }

    for candidate in neighborhood.iter() {
        if graph.id_to_node.contains_key(&candidate.id) {
            continue;
        }
        let attributes = NodeAttributes {
            title: Some(candidate.title.clone().unwrap_or_else(|| NO_TITLE.to_string())),
            ..NodeAttributes::default()
        };
        graph.add_node(&candidate.id, NodeOrigin::Neighborhood, attributes);
    }

    for (source, paper) in sources {
        for reference in &paper.references {
            if let Some(&target) = graph.id_to_node.get(&reference.id) {
                graph.graph.add_edge(source, target, ());
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighborhood;
    use crate::types::ReferenceStub;

    fn stub(id: &str) -> ReferenceStub {
        ReferenceStub {
            id: id.to_string(),
            title: Some(format!("T{id}")),
        }
    }

    fn paper(id: &str, refs: &[&str]) -> PaperRecord {
        let mut p = PaperRecord::bare(id);
        p.title = Some(format!("Paper {id}"));
        p.references = refs.iter().map(|r| stub(r)).collect();
        p
    }

    #[test]
    fn unknown_reference_creates_nothing() {
        let papers = vec![paper("A", &["Z1"]), paper("B", &[])];
        let g = assemble(&papers, &Neighborhood::default());
        assert_eq!(g.node_count(), 2);
        assert!(g.node("Z1").is_none());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn edges_between_primary_nodes() {
        let papers = vec![paper("A", &["B", "Z"]), paper("B", &["A"])];
        let g = assemble(&papers, &Neighborhood::default());
        assert!(g.has_edge("A", "B"));
        assert!(g.has_edge("B", "A"));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn primary_attributes_absent_not_defaulted() {
        let mut p = PaperRecord::bare("A");
        p.year = Some(2020);
        let g = assemble(&[p], &Neighborhood::default());
        let attrs = &g.node("A").unwrap().attributes;
        assert_eq!(attrs.year, Some(2020));
        assert_eq!(attrs.title, None);
        assert_eq!(attrs.venue, None);
        assert_eq!(attrs.present(), vec![("year", "2020".to_string())]);
    }

    #[test]
    fn neighborhood_nodes_and_edges() {
        let papers = vec![paper("A", &["X", "Y"]), paper("B", &["X"]), paper("C", &["X"])];
        let n = neighborhood::select(&papers, 2, 10);
        let g = assemble(&papers, &n);
        assert_eq!(g.count(NodeOrigin::Primary), 3);
        assert_eq!(g.count(NodeOrigin::Neighborhood), 1);
        let x = g.node("X").unwrap();
        assert_eq!(x.origin, NodeOrigin::Neighborhood);
        assert_eq!(x.attributes.title.as_deref(), Some("TX"));
        assert_eq!(x.attributes.year, None);
        assert!(g.has_edge("A", "X"));
        assert!(!g.has_edge("A", "Y"));
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn untitled_neighbor_gets_placeholder() {
        let mut a = PaperRecord::bare("A");
        a.references = vec![ReferenceStub {
            id: "X".into(),
            title: None,
        }];
        let n = neighborhood::select(&[a.clone()], 1, 10);
        let g = assemble(&[a], &n);
        assert_eq!(g.node("X").unwrap().attributes.title.as_deref(), Some(NO_TITLE));
    }

    #[test]
    fn duplicate_record_yields_one_node() {
        let papers = vec![paper("A", &["B"]), paper("B", &[]), paper("A", &["B"])];
        let g = assemble(&papers, &Neighborhood::default());
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn repeated_reference_keeps_both_edges() {
        let g = assemble(&[paper("A", &["B", "B"]), paper("B", &[])], &Neighborhood::default());
        assert_eq!(g.edge_count(), 2);
        let ids: Vec<_> = g.nodes().map(|(_, n)| n.id.as_str()).collect();
        let edges: Vec<_> = g.edges().map(|(s, t)| (ids[s.index()], ids[t.index()])).collect();
        assert_eq!(edges, [("A", "B"), ("A", "B")]);
    }

    #[test]
    fn self_citation_kept() {
        let g = assemble(&[paper("A", &["A"])], &Neighborhood::default());
        assert!(g.has_edge("A", "A"));
    }

    #[test]
    fn assembling_twice_is_identical() {
        let papers = vec![paper("A", &["B", "X"]), paper("B", &["X"])];
        let n = neighborhood::select(&papers, 1, 10);
        let first = assemble(&papers, &n);
        let second = assemble(&papers, &n);
        assert_eq!(first, second);
        assert_eq!(papers[0].references.len(), 2);
    }
}
