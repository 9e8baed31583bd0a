//! Network analytics: read-only derived views over the citation graph.
//!
//! Every entry point refreshes stale authority/echo scores before reading
//! them and returns plain serde data, so nothing engine-internal leaks
//! across the presentation boundary.

use std::collections::BTreeMap;

use serde::Serialize;

use super::store::CitationNetwork;
use super::{Citation, DEFAULT_BIAS};

/// Sort keys recognized at the presentation boundary. Name sorts ascending;
/// numeric fields sort descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSort {
    Authority,
    CitationsReceived,
    CitationsMade,
    EchoChamberScore,
    Name,
}

/// One (name, count) row in a ranked listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSource {
    pub name: String,
    pub count: u64,
}

/// Flat per-source view for listings.
#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub name: String,
    pub domain: String,
    pub bias_label: String,
    pub citations_made: u64,
    pub citations_received: u64,
    pub authority_score: f64,
    pub echo_chamber_score: f64,
    pub same_bias_citations: u64,
    pub different_bias_citations: u64,
}

/// Whole-network summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub total_sources: usize,
    pub total_citations: usize,
    pub avg_citations_per_source: f64,
    pub most_cited: Vec<RankedSource>,
    pub most_citing: Vec<RankedSource>,
    pub avg_echo_chamber_score: f64,
    /// Edges over N·(N−1) for a directed simple graph; 0 below 2 nodes.
    pub network_density: f64,
}

/// Cross-bias citation matrix over the labels stamped on each citation.
///
/// Labels are interned into a fixed index set when the matrix is built, and
/// counts live in one flat row-major table, so every (from, to) cell exists
/// and reads are index lookups rather than nested map probes.
#[derive(Debug, Clone, Serialize)]
pub struct BiasMatrix {
    labels: Vec<String>,
    counts: Vec<u64>,
    total_same_bias: u64,
    total_cross_bias: u64,
}

impl BiasMatrix {
    fn from_citations(citations: &[Citation]) -> Self {
        // First pass fixes the label set so the table has stable dimensions.
        let mut labels: Vec<String> = Vec::new();
        for citation in citations {
            for label in [stamped(&citation.from_bias), stamped(&citation.to_bias)] {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
        }
        labels.sort();

        let n = labels.len();
        let mut counts = vec![0_u64; n * n];
        let mut total_same = 0;
        let mut total_cross = 0;
        for citation in citations {
            let from = stamped(&citation.from_bias);
            let to = stamped(&citation.to_bias);
            let row = labels.iter().position(|l| l == from).expect("interned");
            let col = labels.iter().position(|l| l == to).expect("interned");
            counts[row * n + col] += 1;
            if from == to {
                total_same += 1;
            } else {
                total_cross += 1;
            }
        }

        Self {
            labels,
            counts,
            total_same_bias: total_same,
            total_cross_bias: total_cross,
        }
    }

    /// The interned bias labels, sorted.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Citation count from one bias label to another; 0 for unknown labels.
    pub fn count(&self, from: &str, to: &str) -> u64 {
        let n = self.labels.len();
        let (Some(row), Some(col)) = (
            self.labels.iter().position(|l| l == from),
            self.labels.iter().position(|l| l == to),
        ) else {
            return 0;
        };
        self.counts[row * n + col]
    }

    /// Citations whose endpoints shared a bias label.
    pub fn total_same_bias(&self) -> u64 {
        self.total_same_bias
    }

    /// Citations whose endpoints differed.
    pub fn total_cross_bias(&self) -> u64 {
        self.total_cross_bias
    }

    /// Nested-map rendering for presentation collaborators.
    pub fn to_nested_map(&self) -> BTreeMap<String, BTreeMap<String, u64>> {
        let n = self.labels.len();
        let mut out = BTreeMap::new();
        for (row, from) in self.labels.iter().enumerate() {
            let mut inner = BTreeMap::new();
            for (col, to) in self.labels.iter().enumerate() {
                inner.insert(to.clone(), self.counts[row * n + col]);
            }
            out.insert(from.clone(), inner);
        }
        out
    }
}

fn stamped(bias: &Option<String>) -> &str {
    bias.as_deref().unwrap_or(DEFAULT_BIAS)
}

impl CitationNetwork {
    /// Top-`n` sources by citations received. Ties break by name ascending.
    pub fn most_cited(&self, n: usize) -> Vec<RankedSource> {
        self.ranked(n, |s| s.citations_received)
    }

    /// Top-`n` sources by citations made. Ties break by name ascending.
    pub fn most_citing(&self, n: usize) -> Vec<RankedSource> {
        self.ranked(n, |s| s.citations_made)
    }

    fn ranked(&self, n: usize, count: impl Fn(&super::Source) -> u64) -> Vec<RankedSource> {
        let mut rows: Vec<RankedSource> = self
            .sources()
            .map(|s| RankedSource {
                name: s.name.clone(),
                count: count(s),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        rows.truncate(n);
        rows
    }

    /// Cross-bias citation matrix over the stamped endpoint labels.
    pub fn cross_bias_matrix(&self) -> BiasMatrix {
        BiasMatrix::from_citations(self.citations())
    }

    /// Whole-network summary. Refreshes derived scores first.
    pub fn network_summary(&mut self) -> NetworkSummary {
        self.refresh_scores();

        let total_sources = self.source_count();
        let total_citations = self.citation_count();
        let avg_citations = if total_sources > 0 {
            total_citations as f64 / total_sources as f64
        } else {
            0.0
        };
        let avg_echo = if total_sources > 0 {
            self.sources().map(|s| s.echo_chamber_score).sum::<f64>() / total_sources as f64
        } else {
            0.0
        };
        let density = if total_sources > 1 {
            self.edge_count() as f64 / (total_sources * (total_sources - 1)) as f64
        } else {
            0.0
        };

        NetworkSummary {
            total_sources,
            total_citations,
            avg_citations_per_source: avg_citations,
            most_cited: self.most_cited(5),
            most_citing: self.most_citing(5),
            avg_echo_chamber_score: avg_echo,
            network_density: density,
        }
    }

    /// All sources as flat views, sorted by the requested key. Refreshes
    /// derived scores first.
    pub fn sources_list(&mut self, sort: SourceSort) -> Vec<SourceView> {
        self.refresh_scores();

        let mut rows: Vec<SourceView> = self
            .sources()
            .map(|s| SourceView {
                name: s.name.clone(),
                domain: s.domain.clone(),
                bias_label: s.bias_label.clone(),
                citations_made: s.citations_made,
                citations_received: s.citations_received,
                authority_score: s.authority_score,
                echo_chamber_score: s.echo_chamber_score,
                same_bias_citations: s.same_bias_citations,
                different_bias_citations: s.different_bias_citations,
            })
            .collect();

        match sort {
            SourceSort::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            SourceSort::CitationsReceived => rows.sort_by(|a, b| {
                b.citations_received
                    .cmp(&a.citations_received)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SourceSort::CitationsMade => rows.sort_by(|a, b| {
                b.citations_made
                    .cmp(&a.citations_made)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SourceSort::Authority => rows.sort_by(|a, b| {
                b.authority_score
                    .partial_cmp(&a.authority_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SourceSort::EchoChamberScore => rows.sort_by(|a, b| {
                b.echo_chamber_score
                    .partial_cmp(&a.echo_chamber_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(&b.name))
            }),
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::CitationKind;

    fn cite(net: &mut CitationNetwork, from: &str, to: &str) {
        net.add_citation(Citation::new(from, to, CitationKind::DirectLink))
            .unwrap();
    }

    #[test]
    fn cross_bias_matrix_counts_stamped_labels() {
        let mut net = CitationNetwork::new();
        net.add_source("CNN", "cnn.com", "left").unwrap();
        net.add_source("MSNBC", "msnbc.com", "left").unwrap();
        net.add_source("Fox News", "foxnews.com", "right").unwrap();
        cite(&mut net, "CNN", "MSNBC");
        cite(&mut net, "CNN", "Fox News");

        let matrix = net.cross_bias_matrix();
        assert_eq!(matrix.count("left", "left"), 1);
        assert_eq!(matrix.count("left", "right"), 1);
        assert_eq!(matrix.count("right", "left"), 0);
        assert_eq!(matrix.total_same_bias(), 1);
        assert_eq!(matrix.total_cross_bias(), 1);
    }

    #[test]
    fn matrix_reads_time_of_citation_labels() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "center").unwrap();
        net.add_source("B", "", "center").unwrap();
        // A persisted record stamped before both sources drifted to "center".
        net.add_citation(
            Citation::new("A", "B", CitationKind::DirectLink).with_biases("left", "right"),
        )
        .unwrap();

        let matrix = net.cross_bias_matrix();
        assert_eq!(matrix.count("left", "right"), 1);
        assert_eq!(matrix.count("center", "center"), 0);
        assert_eq!(matrix.total_cross_bias(), 1);
    }

    #[test]
    fn matrix_nested_map_covers_all_cells() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "right").unwrap();
        cite(&mut net, "A", "B");

        let nested = net.cross_bias_matrix().to_nested_map();
        assert_eq!(nested["left"]["right"], 1);
        assert_eq!(nested["right"]["left"], 0);
        assert_eq!(nested.len(), 2);
        assert!(nested.values().all(|row| row.len() == 2));
    }

    #[test]
    fn ranked_lists_break_ties_by_name() {
        let mut net = CitationNetwork::new();
        cite(&mut net, "Zed", "Target");
        cite(&mut net, "Alpha", "Target");

        let citing = net.most_citing(5);
        assert_eq!(citing[0].name, "Alpha");
        assert_eq!(citing[1].name, "Zed");
        assert_eq!(citing[0].count, 1);
    }

    #[test]
    fn summary_counts_and_density() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        net.add_source("B", "", "left").unwrap();
        net.add_source("C", "", "right").unwrap();
        cite(&mut net, "A", "B");
        cite(&mut net, "A", "B");
        cite(&mut net, "B", "C");

        let summary = net.network_summary();
        assert_eq!(summary.total_sources, 3);
        assert_eq!(summary.total_citations, 3);
        assert!((summary.avg_citations_per_source - 1.0).abs() < 1e-12);
        // 2 aggregate edges over 3·2 ordered pairs.
        assert!((summary.network_density - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(summary.most_cited[0].name, "B");
    }

    #[test]
    fn summary_of_empty_network_is_zeroed() {
        let mut net = CitationNetwork::new();
        let summary = net.network_summary();
        assert_eq!(summary.total_sources, 0);
        assert_eq!(summary.total_citations, 0);
        assert_eq!(summary.network_density, 0.0);
        assert!(summary.most_cited.is_empty());
    }

    #[test]
    fn sources_list_sorts_by_each_key() {
        let mut net = CitationNetwork::demo();

        let by_name = net.sources_list(SourceSort::Name);
        assert!(by_name.windows(2).all(|w| w[0].name <= w[1].name));

        let by_received = net.sources_list(SourceSort::CitationsReceived);
        assert!(by_received
            .windows(2)
            .all(|w| w[0].citations_received >= w[1].citations_received));

        let by_authority = net.sources_list(SourceSort::Authority);
        assert!(by_authority
            .windows(2)
            .all(|w| w[0].authority_score >= w[1].authority_score));

        let by_echo = net.sources_list(SourceSort::EchoChamberScore);
        assert!(by_echo
            .windows(2)
            .all(|w| w[0].echo_chamber_score >= w[1].echo_chamber_score));

        let by_made = net.sources_list(SourceSort::CitationsMade);
        assert!(by_made
            .windows(2)
            .all(|w| w[0].citations_made >= w[1].citations_made));
    }

    #[test]
    fn auto_registered_endpoints_count_as_unknown_bias() {
        let mut net = CitationNetwork::new();
        net.add_source("A", "", "left").unwrap();
        cite(&mut net, "A", "Mystery Outlet");

        let matrix = net.cross_bias_matrix();
        assert_eq!(matrix.count("left", DEFAULT_BIAS), 1);
    }
}
