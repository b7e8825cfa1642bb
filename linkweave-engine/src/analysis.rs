// Hub, authority, orphan and under-linked classification, plus graph export

use crate::config::AnalysisConfig;
use crate::graph::LinkGraph;
use crate::model::{ExportEdge, ExportNode, GraphExport, GraphStats, PageSummary};
use crate::rank::RankOutcome;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;

const EXPORT_LABEL_CHARS: usize = 50;

struct Degrees {
    incoming: Vec<usize>,
    outgoing: Vec<usize>,
}

impl Degrees {
    fn of(graph: &LinkGraph) -> Self {
        let n = graph.node_count();
        let mut incoming = vec![0; n];
        let mut outgoing = vec![0; n];
        for edge in graph.inner().edge_references() {
            outgoing[edge.source().index()] += 1;
            incoming[edge.target().index()] += 1;
        }
        Self { incoming, outgoing }
    }
}

fn summarize(graph: &LinkGraph, rank: &RankOutcome, degrees: &Degrees, idx: NodeIndex) -> PageSummary {
    let node = graph.node(idx);
    PageSummary {
        page_id: node.page_id,
        url: node.url.clone(),
        title: node.display_title().to_string(),
        relevance_score: node.relevance_score.unwrap_or(0.0),
        depth: node.depth,
        rank: rank.score(idx),
        in_degree: degrees.incoming[idx.index()],
        out_degree: degrees.outgoing[idx.index()],
    }
}

/// Derive link statistics from a ranked graph.
pub fn analyze(graph: &LinkGraph, rank: &RankOutcome, config: &AnalysisConfig) -> GraphStats {
    let total_pages = graph.node_count();
    if total_pages == 0 {
        return GraphStats::empty(graph.total_available());
    }

    let degrees = Degrees::of(graph);
    let summaries: Vec<PageSummary> = graph
        .inner()
        .node_indices()
        .map(|idx| summarize(graph, rank, &degrees, idx))
        .collect();

    let orphan_pages: Vec<PageSummary> = summaries
        .iter()
        .filter(|s| s.in_degree == 0)
        .cloned()
        .collect();

    let underlinked_pages: Vec<PageSummary> = graph
        .inner()
        .node_indices()
        .filter(|&idx| {
            graph.node(idx).word_count > config.underlinked_min_words
                && degrees.incoming[idx.index()] < config.underlinked_max_in_degree
        })
        .map(|idx| summaries[idx.index()].clone())
        .collect();

    let mut hub_pages: Vec<PageSummary> = summaries
        .iter()
        .filter(|s| s.out_degree >= config.hub_min_out_degree)
        .cloned()
        .collect();
    hub_pages.sort_by(hub_order);
    hub_pages.truncate(config.top_k);

    let mut authority_pages = summaries.clone();
    authority_pages.sort_by(authority_order);
    authority_pages.truncate(config.top_k);

    let total_links = graph.edge_count();

    GraphStats {
        total_pages,
        total_links,
        avg_links_per_page: total_links as f64 / total_pages as f64,
        orphan_count: orphan_pages.len(),
        orphan_pages,
        hub_pages,
        authority_pages,
        underlinked_pages,
        pages_without_outgoing: degrees.outgoing.iter().filter(|&&d| d == 0).count(),
        max_incoming_links: degrees.incoming.iter().copied().max().unwrap_or(0),
        included_count: graph.included_count(),
        total_available: graph.total_available(),
        dropped_links: graph.dropped().clone(),
        rank_iterations: rank.iterations,
        rank_converged: rank.converged,
    }
}

fn hub_order(a: &PageSummary, b: &PageSummary) -> Ordering {
    b.out_degree
        .cmp(&a.out_degree)
        .then(b.rank.total_cmp(&a.rank))
        .then(a.page_id.cmp(&b.page_id))
}

fn authority_order(a: &PageSummary, b: &PageSummary) -> Ordering {
    b.rank
        .total_cmp(&a.rank)
        .then(b.in_degree.cmp(&a.in_degree))
        .then(a.page_id.cmp(&b.page_id))
}

/// Nodes and edges of a ranked graph, ready for visualization.
pub fn export(graph: &LinkGraph, rank: &RankOutcome) -> GraphExport {
    let degrees = Degrees::of(graph);
    let inner = graph.inner();

    let nodes = inner
        .node_indices()
        .map(|idx| {
            let node = graph.node(idx);
            ExportNode {
                id: node.page_id,
                label: node.display_title().chars().take(EXPORT_LABEL_CHARS).collect(),
                url: node.url.clone(),
                relevance_score: node.relevance_score.unwrap_or(0.0),
                depth: node.depth,
                rank: rank.score(idx),
                in_degree: degrees.incoming[idx.index()],
                out_degree: degrees.outgoing[idx.index()],
            }
        })
        .collect();

    let edges = inner
        .edge_references()
        .map(|edge| ExportEdge {
            source: graph.node(edge.source()).page_id,
            target: graph.node(edge.target()).page_id,
            anchor_text: edge.weight().anchor_text.clone(),
            relation: edge.weight().rel.clone(),
        })
        .collect();

    GraphExport {
        nodes,
        edges,
        included_count: graph.included_count(),
        total_available: graph.total_available(),
        converged: rank.converged,
    }
}
