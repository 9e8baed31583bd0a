//! In-memory citation graph store.
//!
//! Uses `petgraph` for the directed graph structure with a name → node-index
//! map for O(1) lookups, mirrored by a map of per-source aggregate counters
//! and an insertion-ordered citation log.
//!
//! The store is an explicit owned value: one instance accumulates state for a
//! session under a single logical writer. Hosts that share an instance across
//! requests serialize mutations behind their own lock; the scorer and the
//! partitioner only ever read a snapshot.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::NetworkError;
use crate::network::{Citation, CitationKind, Source, DEFAULT_BIAS, truncate_context};

/// Directed weighted citation network with per-source aggregate statistics.
pub struct CitationNetwork {
    /// The directed graph: node weights are source names, edge weights are
    /// aggregate citation counts (weight ≥ 1 iff the edge exists).
    graph: DiGraph<String, u64>,
    /// Source name → NodeIndex.
    node_index: HashMap<String, NodeIndex>,
    /// Source name → aggregate stats.
    sources: HashMap<String, Source>,
    /// Registration order, for deterministic iteration.
    source_order: Vec<String>,
    /// Immutable citation log in insertion order.
    citations: Vec<Citation>,
    /// Set by mutations; cleared by `refresh_scores`.
    scores_stale: bool,
}

impl CitationNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            sources: HashMap::new(),
            source_order: Vec::new(),
            citations: Vec::new(),
            scores_stale: false,
        }
    }

    /// Register a source. Idempotent: the first registration wins and a
    /// repeat call changes nothing, including the bias label.
    pub fn add_source(
        &mut self,
        name: &str,
        domain: &str,
        bias_label: &str,
    ) -> Result<(), NetworkError> {
        if name.is_empty() {
            return Err(NetworkError::EmptyName);
        }
        if self.sources.contains_key(name) {
            return Ok(());
        }
        let bias = if bias_label.is_empty() {
            DEFAULT_BIAS
        } else {
            bias_label
        };
        self.insert_source(Source::new(name, domain, bias));
        Ok(())
    }

    fn insert_source(&mut self, source: Source) {
        let name = source.name.clone();
        let idx = self.graph.add_node(name.clone());
        self.node_index.insert(name.clone(), idx);
        self.source_order.push(name.clone());
        self.sources.insert(name, source);
        self.scores_stale = true;
    }

    /// Node index for a source, auto-registering with default attributes.
    fn ensure_source(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        self.insert_source(Source::new(name, "", DEFAULT_BIAS));
        self.node_index[name]
    }

    /// Record a citation.
    ///
    /// Ensures both endpoints exist (auto-registering with default
    /// attributes), stamps the endpoints' current bias labels onto the
    /// citation unless the record already carries them, appends it to the
    /// log, bumps the aggregate edge weight, and updates all per-source
    /// counters. Validation happens before any mutation.
    pub fn add_citation(&mut self, citation: Citation) -> Result<(), NetworkError> {
        if citation.from.is_empty() {
            return Err(NetworkError::EmptyEndpoint { role: "source" });
        }
        if citation.to.is_empty() {
            return Err(NetworkError::EmptyEndpoint { role: "target" });
        }

        let mut citation = citation;
        if let Some(context) = citation.context.take() {
            citation.context = Some(truncate_context(&context));
        }

        let from_idx = self.ensure_source(&citation.from);
        let to_idx = self.ensure_source(&citation.to);

        // Stamp bias labels at citation time for analytical stability.
        let from_bias = citation
            .from_bias
            .get_or_insert_with(|| self.sources[&citation.from].bias_label.clone())
            .clone();
        let to_bias = citation
            .to_bias
            .get_or_insert_with(|| self.sources[&citation.to].bias_label.clone())
            .clone();

        match self.graph.find_edge(from_idx, to_idx) {
            Some(edge) => {
                if let Some(weight) = self.graph.edge_weight_mut(edge) {
                    *weight += 1;
                }
            }
            None => {
                self.graph.add_edge(from_idx, to_idx, 1);
            }
        }

        {
            let from_stats = self
                .sources
                .get_mut(&citation.from)
                .expect("citing source just ensured");
            from_stats.citations_made += 1;
            if from_bias == to_bias {
                from_stats.same_bias_citations += 1;
            } else {
                from_stats.different_bias_citations += 1;
            }
            if !from_stats.cited_sources.contains(&citation.to) {
                from_stats.cited_sources.push(citation.to.clone());
            }
        }
        {
            let to_stats = self
                .sources
                .get_mut(&citation.to)
                .expect("cited source just ensured");
            to_stats.citations_received += 1;
            if !to_stats.citing_sources.contains(&citation.from) {
                to_stats.citing_sources.push(citation.from.clone());
            }
        }

        self.citations.push(citation);
        self.scores_stale = true;
        Ok(())
    }

    /// Clear all sources, citations, and the underlying graph atomically.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.sources.clear();
        self.source_order.clear();
        self.citations.clear();
        self.scores_stale = false;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    /// All sources in registration order.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.source_order.iter().map(|name| &self.sources[name])
    }

    /// The citation log, in insertion order.
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Number of registered sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of recorded citations.
    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    /// Number of aggregate edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Aggregate weight of the (from, to) edge, if present.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
        let from_idx = *self.node_index.get(from)?;
        let to_idx = *self.node_index.get(to)?;
        let edge = self.graph.find_edge(from_idx, to_idx)?;
        self.graph.edge_weight(edge).copied()
    }

    /// All aggregate edges as (from, to, weight) triples.
    pub fn edges(&self) -> Vec<(String, String, u64)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].clone(),
                    self.graph[e.target()].clone(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// Borrow the underlying graph (read-only, for the scorer).
    pub(crate) fn graph(&self) -> &DiGraph<String, u64> {
        &self.graph
    }

    /// Registration position of each source name (for the partitioner).
    pub(crate) fn source_positions(&self) -> HashMap<&str, usize> {
        self.source_order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect()
    }

    /// Source names in registration order.
    pub(crate) fn source_names(&self) -> &[String] {
        &self.source_order
    }

    /// Whether derived scores are out of date.
    pub(crate) fn scores_stale(&self) -> bool {
        self.scores_stale
    }

    /// Mutable access for the score-refresh pass.
    pub(crate) fn source_mut(&mut self, name: &str) -> Option<&mut Source> {
        self.sources.get_mut(name)
    }

    pub(crate) fn mark_scores_fresh(&mut self) {
        self.scores_stale = false;
    }

    // -----------------------------------------------------------------------
    // Demo data
    // -----------------------------------------------------------------------

    /// A small sample network with known biases, for demos and smoke tests.
    pub fn demo() -> Self {
        let mut net = Self::new();
        let sources = [
            ("CNN", "cnn.com", "left"),
            ("Fox News", "foxnews.com", "right"),
            ("New York Times", "nytimes.com", "left_leaning"),
            ("Wall Street Journal", "wsj.com", "right_leaning"),
            ("Reuters", "reuters.com", "center"),
            ("MSNBC", "msnbc.com", "left"),
            ("Breitbart", "breitbart.com", "right"),
            ("NPR", "npr.org", "center"),
        ];
        for (name, domain, bias) in sources {
            net.add_source(name, domain, bias)
                .expect("demo names are non-empty");
        }
        let citations = [
            ("CNN", "MSNBC", CitationKind::DirectLink),
            ("CNN", "New York Times", CitationKind::TextualMention),
            ("MSNBC", "CNN", CitationKind::DirectLink),
            ("New York Times", "CNN", CitationKind::TextualMention),
            ("New York Times", "NPR", CitationKind::InferredReference),
            ("Fox News", "Breitbart", CitationKind::DirectLink),
            ("Fox News", "Wall Street Journal", CitationKind::TextualMention),
            ("Breitbart", "Fox News", CitationKind::DirectLink),
            ("Wall Street Journal", "Fox News", CitationKind::InferredReference),
            ("Reuters", "CNN", CitationKind::TextualMention),
            ("Reuters", "Fox News", CitationKind::InferredReference),
            ("NPR", "New York Times", CitationKind::TextualMention),
            ("NPR", "Wall Street Journal", CitationKind::InferredReference),
        ];
        for (from, to, kind) in citations {
            net.add_citation(Citation::new(from, to, kind))
                .expect("demo endpoints are non-empty");
        }
        net
    }
}

impl Default for CitationNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CitationNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationNetwork")
            .field("sources", &self.source_count())
            .field("citations", &self.citation_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_source_is_idempotent() {
        let mut net = CitationNetwork::new();
        net.add_source("CNN", "cnn.com", "left").unwrap();
        net.add_source("CNN", "other.com", "right").unwrap();

        let source = net.source("CNN").unwrap();
        assert_eq!(source.domain, "cnn.com");
        assert_eq!(source.bias_label, "left");
        assert_eq!(net.source_count(), 1);
    }

    #[test]
    fn empty_source_name_rejected_without_mutation() {
        let mut net = CitationNetwork::new();
        let err = net.add_source("", "x.com", "left").unwrap_err();
        assert!(matches!(err, NetworkError::EmptyName));
        assert_eq!(net.source_count(), 0);
    }

    #[test]
    fn repeated_citations_accumulate_one_edge() {
        let mut net = CitationNetwork::new();
        for _ in 0..3 {
            net.add_citation(Citation::new("A", "B", CitationKind::DirectLink))
                .unwrap();
        }

        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.edge_weight("A", "B"), Some(3));
        assert_eq!(net.source("A").unwrap().citations_made, 3);
        assert_eq!(net.source("B").unwrap().citations_received, 3);
    }

    #[test]
    fn citation_auto_registers_endpoints_with_defaults() {
        let mut net = CitationNetwork::new();
        net.add_citation(Citation::new("A", "B", CitationKind::TextualMention))
            .unwrap();

        let a = net.source("A").unwrap();
        assert_eq!(a.domain, "");
        assert_eq!(a.bias_label, DEFAULT_BIAS);
        assert!(net.source("B").is_some());
    }

    #[test]
    fn bias_labels_stamped_at_insertion() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "right").unwrap();
        net.add_citation(Citation::new("A", "B", CitationKind::DirectLink))
            .unwrap();

        let citation = &net.citations()[0];
        assert_eq!(citation.from_bias.as_deref(), Some("left"));
        assert_eq!(citation.to_bias.as_deref(), Some("right"));
        let a = net.source("A").unwrap();
        assert_eq!(a.different_bias_citations, 1);
        assert_eq!(a.same_bias_citations, 0);
    }

    #[test]
    fn prestamped_biases_survive_over_current_labels() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "center").unwrap();
        net.add_source("B", "", "center").unwrap();
        net.add_citation(
            Citation::new("A", "B", CitationKind::DirectLink).with_biases("left", "right"),
        )
        .unwrap();

        let citation = &net.citations()[0];
        assert_eq!(citation.from_bias.as_deref(), Some("left"));
        // Counters follow the stamped labels, not the live ones.
        assert_eq!(net.source("A").unwrap().different_bias_citations, 1);
    }

    #[test]
    fn counter_invariant_holds_after_each_citation() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "left").unwrap();
        net.add_source("C", "", "right").unwrap();
        net.add_citation(Citation::new("A", "B", CitationKind::DirectLink))
            .unwrap();
        net.add_citation(Citation::new("A", "C", CitationKind::DirectLink))
            .unwrap();
        net.add_citation(Citation::new("A", "B", CitationKind::TextualMention))
            .unwrap();

        let a = net.source("A").unwrap();
        let from_a = net.citations().iter().filter(|c| c.from == "A").count() as u64;
        assert_eq!(a.citations_made, from_a);
        assert_eq!(a.same_bias_citations + a.different_bias_citations, a.citations_made);
        assert_eq!(a.cited_sources, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn empty_endpoint_rejected_without_mutation() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();

        let err = net
            .add_citation(Citation::new("A", "", CitationKind::DirectLink))
            .unwrap_err();
        assert!(matches!(err, NetworkError::EmptyEndpoint { role: "target" }));
        assert_eq!(net.citation_count(), 0);
        assert_eq!(net.source("A").unwrap().citations_made, 0);
        assert_eq!(net.source_count(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut net = CitationNetwork::demo();
        assert!(net.source_count() > 0);

        net.reset();
        assert_eq!(net.source_count(), 0);
        assert_eq!(net.citation_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.source("CNN").is_none());
    }

    #[test]
    fn demo_network_shape() {
        let net = CitationNetwork::demo();
        assert_eq!(net.source_count(), 8);
        assert_eq!(net.citation_count(), 13);
        assert_eq!(net.edge_weight("CNN", "MSNBC"), Some(1));
    }

    #[test]
    fn long_context_truncated_even_from_seed_records() {
        let mut net = CitationNetwork::new();
        let mut citation = Citation::new("A", "B", CitationKind::DirectLink);
        citation.context = Some("x".repeat(500));
        net.add_citation(citation).unwrap();
        assert_eq!(net.citations()[0].context.as_ref().unwrap().len(), 200);
    }
}
