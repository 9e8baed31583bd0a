//! Echo-chamber detection via community partitioning.
//!
//! The primary strategy is a seeded modularity optimizer (Louvain-style
//! local moving plus aggregation) over the undirected projection of the
//! citation graph, with directional weights combined by sum. The fallback
//! strategy groups sources by their existing bias label. The fallback is a
//! first-class, constructor-selected code path, not an exception branch:
//! it runs whenever it is chosen explicitly, and automatically whenever
//! the optimizer reports failure.
//!
//! Both strategies are deterministic — the optimizer for a fixed seed, the
//! bias grouping unconditionally.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PartitionError;
use super::store::CitationNetwork;
use super::EchoChamber;

/// Parameters for the modularity optimizer.
#[derive(Debug, Clone)]
pub struct ModularityConfig {
    /// Resolution parameter: larger values favor smaller communities.
    pub resolution: f64,
    /// Seed for the node-order shuffle; fixes the partition for tests.
    pub seed: u64,
    /// Bound on aggregation passes.
    pub max_passes: usize,
}

impl Default for ModularityConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            seed: 0,
            max_passes: 10,
        }
    }
}

/// Which partitioning method to run.
#[derive(Debug, Clone)]
pub enum PartitionStrategy {
    /// Modularity-maximizing clustering (seeded, deterministic).
    Modularity(ModularityConfig),
    /// One cluster per distinct bias label.
    BiasGroups,
}

impl Default for PartitionStrategy {
    fn default() -> Self {
        Self::Modularity(ModularityConfig::default())
    }
}

/// Parameters for echo-chamber detection.
#[derive(Debug, Clone)]
pub struct ChamberConfig {
    /// Partitioning method, selected at construction time.
    pub strategy: PartitionStrategy,
    /// Clusters smaller than this are discarded; single-member clusters
    /// are not echo chambers by definition.
    pub min_size: usize,
}

impl Default for ChamberConfig {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::default(),
            min_size: 2,
        }
    }
}

impl CitationNetwork {
    /// Detect echo chambers in the current graph.
    ///
    /// A graph with fewer than 2 sources yields no chambers. Results are
    /// ordered by descending insularity, ties by ascending chamber id.
    pub fn detect_echo_chambers(&mut self, config: &ChamberConfig) -> Vec<EchoChamber> {
        if self.source_count() < 2 {
            return Vec::new();
        }
        self.refresh_scores();

        let assignment = match &config.strategy {
            PartitionStrategy::Modularity(mcfg) => match modularity_partition(self, mcfg) {
                Ok(assignment) => assignment,
                Err(err) => {
                    tracing::warn!(%err, "modularity partitioning failed, grouping by bias label");
                    bias_partition(self)
                }
            },
            PartitionStrategy::BiasGroups => bias_partition(self),
        };

        self.build_chambers(&assignment, config.min_size)
    }

    /// Materialize clusters from a per-source community assignment.
    fn build_chambers(&self, assignment: &[usize], min_size: usize) -> Vec<EchoChamber> {
        let names = self.source_names();
        let mut clusters: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (pos, name) in names.iter().enumerate() {
            clusters
                .entry(assignment[pos])
                .or_default()
                .push(name.as_str());
        }

        let mut chambers = Vec::new();
        for (id, (_, members)) in clusters.into_iter().enumerate() {
            if members.len() < min_size {
                continue;
            }

            let dominant_bias = dominant_bias(self, &members);
            let member_set: HashSet<&str> = members.iter().copied().collect();
            let mut internal = 0_u64;
            let mut external = 0_u64;
            for citation in self.citations() {
                if !member_set.contains(citation.from.as_str()) {
                    continue;
                }
                if member_set.contains(citation.to.as_str()) {
                    internal += 1;
                } else {
                    external += 1;
                }
            }
            let traffic = internal + external;
            let insularity = if traffic > 0 {
                internal as f64 / traffic as f64
            } else {
                0.0
            };

            let authority_sum: f64 = members
                .iter()
                .filter_map(|name| self.source(name))
                .map(|s| s.authority_score)
                .sum();
            let avg_authority = authority_sum / members.len() as f64;

            chambers.push(EchoChamber {
                id,
                sources: members.iter().map(|s| s.to_string()).collect(),
                dominant_bias,
                internal_citations: internal,
                external_citations: external,
                insularity,
                avg_authority,
            });
        }

        chambers.sort_by(|a, b| {
            b.insularity
                .partial_cmp(&a.insularity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        chambers
    }
}

/// Most frequent bias label among members; ties go to the first encountered.
fn dominant_bias(net: &CitationNetwork, members: &[&str]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in members {
        let Some(source) = net.source(name) else {
            continue;
        };
        match counts.iter_mut().find(|(label, _)| *label == source.bias_label) {
            Some((_, count)) => *count += 1,
            None => counts.push((source.bias_label.as_str(), 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
        .unwrap_or_else(|| super::DEFAULT_BIAS.to_string())
}

/// Fallback partition: one community per distinct bias label, numbered in
/// first-encounter order over the source registration order.
fn bias_partition(net: &CitationNetwork) -> Vec<usize> {
    let mut label_ids: HashMap<String, usize> = HashMap::new();
    let mut assignment = Vec::with_capacity(net.source_count());
    for source in net.sources() {
        let next = label_ids.len();
        let id = *label_ids
            .entry(source.bias_label.clone())
            .or_insert(next);
        assignment.push(id);
    }
    assignment
}

/// Partition by modularity maximization over the undirected projection.
///
/// Returns one community id per source, indexed by registration order.
fn modularity_partition(
    net: &CitationNetwork,
    config: &ModularityConfig,
) -> Result<Vec<usize>, PartitionError> {
    let positions = net.source_positions();
    let n = positions.len();

    // Undirected projection: sum the two directional weights, drop self-loops.
    let mut pair_weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (from, to, weight) in net.edges() {
        let a = positions[from.as_str()];
        let b = positions[to.as_str()];
        if a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        *pair_weights.entry(key).or_insert(0.0) += weight as f64;
    }
    if pair_weights.is_empty() {
        return Err(PartitionError::NoEdges);
    }
    let edges: Vec<(usize, usize, f64)> = pair_weights
        .into_iter()
        .map(|((a, b), w)| (a, b, w))
        .collect();

    Ok(louvain(n, &edges, config))
}

/// Louvain-style modularity optimization: repeated local moving followed by
/// graph aggregation, until a pass stops improving or the bound is hit.
fn louvain(n: usize, edges: &[(usize, usize, f64)], config: &ModularityConfig) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    // membership[i]: community of original node i in the current level's graph.
    let mut membership: Vec<usize> = (0..n).collect();
    let mut level_n = n;
    let mut level_edges: Vec<(usize, usize, f64)> = edges.to_vec();

    for _ in 0..config.max_passes.max(1) {
        let (assignment, moved) = local_moving(level_n, &level_edges, config.resolution, &mut rng);

        // Renumber communities compactly, preserving first-appearance order.
        let mut relabel: HashMap<usize, usize> = HashMap::new();
        let mut compact = Vec::with_capacity(assignment.len());
        for &comm in &assignment {
            let next = relabel.len();
            compact.push(*relabel.entry(comm).or_insert(next));
        }
        let new_n = relabel.len();

        for slot in membership.iter_mut() {
            *slot = compact[*slot];
        }

        if !moved || new_n == level_n {
            break;
        }

        // Aggregate: communities become nodes, intra-community weight
        // becomes a self-loop.
        let mut merged: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(a, b, w) in &level_edges {
            let ca = compact[a];
            let cb = compact[b];
            let key = (ca.min(cb), ca.max(cb));
            *merged.entry(key).or_insert(0.0) += w;
        }
        level_edges = merged.into_iter().map(|((a, b), w)| (a, b, w)).collect();
        level_n = new_n;
    }

    membership
}

/// One level of greedy local moving. Returns the community per node and
/// whether any node moved.
fn local_moving(
    n: usize,
    edges: &[(usize, usize, f64)],
    resolution: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, bool) {
    // Adjacency excluding self-loops; self-loop weight tracked separately.
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut self_weight = vec![0.0_f64; n];
    for &(a, b, w) in edges {
        if a == b {
            self_weight[a] += w;
            continue;
        }
        adjacency[a].push((b, w));
        adjacency[b].push((a, w));
    }

    // Weighted degree; a self-loop counts twice.
    let mut degree = vec![0.0_f64; n];
    for node in 0..n {
        degree[node] = 2.0 * self_weight[node]
            + adjacency[node].iter().map(|&(_, w)| w).sum::<f64>();
    }
    let m2: f64 = degree.iter().sum();
    if m2 == 0.0 {
        return ((0..n).collect(), false);
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut community_degree = degree.clone();

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut moved_any = false;
    // Sweep until a full pass makes no moves; each sweep is O(E).
    const MAX_SWEEPS: usize = 100;
    for _ in 0..MAX_SWEEPS {
        let mut moved_this_sweep = false;
        for &node in &order {
            let current = community[node];
            community_degree[current] -= degree[node];

            // Weight from `node` into each neighboring community.
            let mut neighbor_weight: BTreeMap<usize, f64> = BTreeMap::new();
            neighbor_weight.insert(current, 0.0);
            for &(other, w) in &adjacency[node] {
                *neighbor_weight.entry(community[other]).or_insert(0.0) += w;
            }

            let mut best_comm = current;
            let mut best_gain = neighbor_weight[&current]
                - resolution * community_degree[current] * degree[node] / m2;
            for (&comm, &weight) in &neighbor_weight {
                if comm == current {
                    continue;
                }
                let gain = weight - resolution * community_degree[comm] * degree[node] / m2;
                if gain > best_gain {
                    best_gain = gain;
                    best_comm = comm;
                }
            }

            community_degree[best_comm] += degree[node];
            if best_comm != current {
                community[node] = best_comm;
                moved_this_sweep = true;
                moved_any = true;
            }
        }
        if !moved_this_sweep {
            break;
        }
    }

    (community, moved_any)
}
