use crate::config::RankConfig;
use crate::graph::LinkGraph;
use crate::model::PageId;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Score per node, indexed by `NodeIndex::index()`.
    pub scores: Vec<f64>,
    pub iterations: usize,
    /// False when the iteration cap was reached before the threshold.
    pub converged: bool,
    /// L1 change of the final iteration.
    pub delta: f64,
}

impl RankOutcome {
    pub fn empty() -> Self {
        Self {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
            delta: 0.0,
        }
    }

    pub fn score(&self, idx: NodeIndex) -> f64 {
        self.scores.get(idx.index()).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    pub fn by_page(&self, graph: &LinkGraph) -> HashMap<PageId, f64> {
        graph
            .inner()
            .node_indices()
            .map(|idx| (graph.node(idx).page_id, self.score(idx)))
            .collect()
    }
}

/// Power iteration with uniform teleportation.
///
/// Rank held by dangling nodes is spread evenly over all nodes each round, so
/// the scores always sum to 1.
pub fn rank(graph: &LinkGraph, config: &RankConfig) -> RankOutcome {
    let n = graph.node_count();
    if n == 0 {
        return RankOutcome::empty();
    }

    let inner = graph.inner();
    let damping = config.damping;
    let uniform = 1.0 / n as f64;

    let mut out_degree = vec![0usize; n];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in inner.edge_references() {
        let (source, target) = (edge.source().index(), edge.target().index());
        out_degree[source] += 1;
        incoming[target].push(source);
    }

    let mut ranks = vec![uniform; n];
    let mut next = vec![0.0; n];
    let mut iterations = 0;
    let mut delta = f64::INFINITY;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        let dangling: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0)
            .map(|i| ranks[i])
            .sum();
        let base = (1.0 - damping) * uniform + damping * dangling * uniform;

        for v in 0..n {
            let inflow: f64 = incoming[v]
                .iter()
                .map(|&u| ranks[u] / out_degree[u] as f64)
                .sum();
            next[v] = base + damping * inflow;
        }

        delta = ranks
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (new - old).abs())
            .sum();
        std::mem::swap(&mut ranks, &mut next);

        if delta < config.epsilon {
            converged = true;
            break;
        }
    }

    if converged {
        debug!("Rank converged after {} iterations (delta {:e})", iterations, delta);
    } else {
        warn!(
            "Rank did not converge within {} iterations (delta {:e}), returning best effort",
            config.max_iterations, delta
        );
    }

    RankOutcome {
        scores: ranks,
        iterations,
        converged,
        delta,
    }
}
