//! Visualization export: flat node and edge records.
//!
//! These types carry no aggregation logic beyond what the network already
//! maintains; they exist so external renderers (D3, Cytoscape) can consume
//! the graph as plain JSON.

use serde::Serialize;

use crate::network::CitationNetwork;

/// Exported source node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeExport {
    /// Source display name (node identity).
    pub id: String,
    /// Origin domain; empty if unknown.
    pub domain: String,
    /// Bias label.
    pub bias: String,
    /// Authority score at export time.
    pub authority: f64,
    /// Echo-chamber score at export time.
    pub echo_score: f64,
    /// Incoming citation count.
    pub citations_received: u64,
    /// Outgoing citation count.
    pub citations_made: u64,
}

/// Exported aggregate edge.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeExport {
    /// Citing source name.
    pub source: String,
    /// Cited source name.
    pub target: String,
    /// Aggregate citation count for the pair.
    pub weight: u64,
}

/// Complete node/edge bundle for external rendering.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

impl CitationNetwork {
    /// Export the network for visualization. Refreshes derived scores first.
    pub fn export_for_visualization(&mut self) -> NetworkExport {
        self.refresh_scores();

        let nodes = self
            .sources()
            .map(|s| NodeExport {
                id: s.name.clone(),
                domain: s.domain.clone(),
                bias: s.bias_label.clone(),
                authority: s.authority_score,
                echo_score: s.echo_chamber_score,
                citations_received: s.citations_received,
                citations_made: s.citations_made,
            })
            .collect();

        let edges = self
            .edges()
            .into_iter()
            .map(|(source, target, weight)| EdgeExport {
                source,
                target,
                weight,
            })
            .collect();

        NetworkExport { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Citation, CitationKind};

    #[test]
    fn export_mirrors_graph_shape() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "a.com", "left").unwrap();
        net.add_citation(Citation::new("A", "B", CitationKind::DirectLink))
            .unwrap();
        net.add_citation(Citation::new("A", "B", CitationKind::TextualMention))
            .unwrap();

        let export = net.export_for_visualization();
        assert_eq!(export.nodes.len(), 2);
        assert_eq!(export.edges.len(), 1);
        assert_eq!(export.edges[0].weight, 2);
        assert_eq!(export.nodes[0].id, "A");
        assert!(export.nodes.iter().all(|n| n.authority > 0.0));
    }

    #[test]
    fn export_serializes_to_plain_json() {
        let mut net = CitationNetwork::demo();
        let json = serde_json::to_value(net.export_for_visualization()).unwrap();
        assert!(json["nodes"].is_array());
        assert!(json["edges"].is_array());
        assert_eq!(json["nodes"].as_array().unwrap().len(), 8);
    }
}
