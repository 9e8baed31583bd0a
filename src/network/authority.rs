//! Authority scoring: weighted power iteration over the citation graph.
//!
//! Each source distributes its current score across its outgoing edges in
//! proportion to their weights, blended with a uniform restart probability.
//! Sources with no outgoing edges are score sinks; their mass is
//! redistributed uniformly on every iteration so the scores keep summing
//! to 1.0. Non-convergence within the iteration budget degrades to a
//! uniform distribution rather than failing.

use std::collections::BTreeMap;

use petgraph::visit::EdgeRef;

use super::store::CitationNetwork;

/// Parameters for the authority scorer.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Damping factor: probability of following an edge vs. restarting.
    pub damping: f64,
    /// Hard bound on power iterations.
    pub max_iterations: usize,
    /// Per-node convergence tolerance on the L1 score change.
    pub tolerance: f64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Compute authority scores for every source. Scores are non-negative and
/// sum to 1.0 for any non-empty graph; an empty graph yields an empty map.
pub fn scores(net: &CitationNetwork, config: &AuthorityConfig) -> BTreeMap<String, f64> {
    let graph = net.graph();
    let n = graph.node_count();
    if n == 0 {
        return BTreeMap::new();
    }

    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];

    // Total outgoing weight per node; zero marks a dangling node.
    let mut out_weight = vec![0.0_f64; n];
    for edge in graph.edge_references() {
        out_weight[edge.source().index()] += *edge.weight() as f64;
    }

    let d = config.damping;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        let dangling_mass: f64 = ranks
            .iter()
            .zip(&out_weight)
            .filter(|&(_, &w)| w == 0.0)
            .map(|(&r, _)| r)
            .sum();

        let base = (1.0 - d) * uniform + d * dangling_mass * uniform;
        let mut next = vec![base; n];
        for edge in graph.edge_references() {
            let src = edge.source().index();
            let share = ranks[src] * *edge.weight() as f64 / out_weight[src];
            next[edge.target().index()] += d * share;
        }

        let delta: f64 = next
            .iter()
            .zip(&ranks)
            .map(|(a, b)| (a - b).abs())
            .sum();
        ranks = next;
        if delta < n as f64 * config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::warn!(
            max_iterations = config.max_iterations,
            "authority scoring did not converge, falling back to uniform scores"
        );
        ranks = vec![uniform; n];
    }

    graph
        .node_indices()
        .map(|idx| (graph[idx].clone(), ranks[idx.index()]))
        .collect()
}

impl CitationNetwork {
    /// Write fresh authority and echo-chamber scores into the source records.
    ///
    /// No-op when nothing changed since the last refresh. Analytics entry
    /// points call this before reading derived scores.
    pub fn refresh_scores(&mut self) {
        if !self.scores_stale() {
            return;
        }
        let authority = scores(self, &AuthorityConfig::default());
        let names: Vec<String> = self.source_names().to_vec();
        for name in names {
            let Some(source) = self.source_mut(&name) else {
                continue;
            };
            source.authority_score = authority.get(&name).copied().unwrap_or(0.0);
            let total = source.same_bias_citations + source.different_bias_citations;
            source.echo_chamber_score = if total > 0 {
                source.same_bias_citations as f64 / total as f64
            } else {
                0.0
            };
        }
        self.mark_scores_fresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Citation, CitationKind};

    fn cite(net: &mut CitationNetwork, from: &str, to: &str) {
        net.add_citation(Citation::new(from, to, CitationKind::DirectLink))
            .unwrap();
    }

    fn total(scores: &BTreeMap<String, f64>) -> f64 {
        scores.values().sum()
    }

    #[test]
    fn empty_graph_yields_empty_scores() {
        let net = CitationNetwork::new();
        assert!(scores(&net, &AuthorityConfig::default()).is_empty());
    }

    #[test]
    fn three_node_cycle_splits_evenly() {
        let mut net = CitationNetwork::new();
        cite(&mut net, "A", "B");
        cite(&mut net, "B", "C");
        cite(&mut net, "C", "A");

        let scores = scores(&net, &AuthorityConfig::default());
        for name in ["A", "B", "C"] {
            assert!(
                (scores[name] - 1.0 / 3.0).abs() < 1e-4,
                "{name} = {}",
                scores[name]
            );
        }
        assert!((total(&scores) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mass_conserved_with_dangling_nodes() {
        let mut net = CitationNetwork::new();
        // B and C have no outgoing edges.
        cite(&mut net, "A", "B");
        cite(&mut net, "A", "C");

        let scores = scores(&net, &AuthorityConfig::default());
        assert_eq!(scores.len(), 3);
        assert!((total(&scores) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mass_conserved_on_isolated_nodes() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "right").unwrap();

        let scores = scores(&net, &AuthorityConfig::default());
        assert!((total(&scores) - 1.0).abs() < 1e-6);
        assert!((scores["A"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn heavier_edges_attract_more_mass() {
        let mut net = CitationNetwork::new();
        for _ in 0..5 {
            cite(&mut net, "A", "B");
        }
        cite(&mut net, "A", "C");
        // Close the loop so nothing dangles.
        cite(&mut net, "B", "A");
        cite(&mut net, "C", "A");

        let scores = scores(&net, &AuthorityConfig::default());
        assert!(scores["B"] > scores["C"]);
        assert!((total(&scores) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exhausted_iteration_budget_degrades_to_uniform() {
        let mut net = CitationNetwork::new();
        cite(&mut net, "A", "B");
        cite(&mut net, "B", "C");
        cite(&mut net, "C", "A");

        let config = AuthorityConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let scores = scores(&net, &config);
        for value in scores.values() {
            assert!((value - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn refresh_scores_updates_source_records() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "left").unwrap();
        net.add_source("C", "", "right").unwrap();
        cite(&mut net, "A", "B");
        cite(&mut net, "A", "C");

        net.refresh_scores();
        let a = net.source("A").unwrap();
        assert!((a.echo_chamber_score - 0.5).abs() < 1e-12);
        assert!(net.source("B").unwrap().authority_score > 0.0);
    }
}
