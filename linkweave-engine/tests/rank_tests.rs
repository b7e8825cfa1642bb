// Tests for rank computation

use linkweave_engine::config::{BuildOptions, RankConfig};
use linkweave_engine::graph::LinkGraph;
use linkweave_engine::rank;
use linkweave_engine::{Link, Page};

fn pages(n: i64) -> Vec<Page> {
    (1..=n)
        .map(|i| Page::new(i, 1, format!("https://example.com/{}", i)).with_relevance(100.0 - i as f64))
        .collect()
}

fn graph(n: i64, links: Vec<Link>) -> LinkGraph {
    LinkGraph::from_parts(&pages(n), links, n as usize, &BuildOptions::default())
}

#[test]
fn test_scores_sum_to_one() {
    let g = graph(
        4,
        vec![
            Link::internal(1, 2),
            Link::internal(1, 3),
            Link::internal(2, 4),
            Link::internal(3, 4),
        ],
    );
    let outcome = rank::rank(&g, &RankConfig::default());

    assert!(outcome.converged);
    assert!((outcome.total() - 1.0).abs() < 1e-6);
}

#[test]
fn test_scores_sum_to_one_with_cycles_and_dangling_nodes() {
    let g = graph(
        6,
        vec![
            Link::internal(1, 2),
            Link::internal(2, 3),
            Link::internal(3, 1),
            Link::internal(3, 4),
            Link::internal(5, 4),
        ],
    );
    let outcome = rank::rank(&g, &RankConfig::default());

    assert!((outcome.total() - 1.0).abs() < 1e-6);
    assert!(outcome.scores.iter().all(|&s| s > 0.0));
}

#[test]
fn test_edgeless_graph_is_uniform() {
    let g = graph(5, vec![]);
    let outcome = rank::rank(&g, &RankConfig::default());

    assert!(outcome.converged);
    for score in &outcome.scores {
        assert!((score - 0.2).abs() < 1e-9);
    }
}

#[test]
fn test_target_of_many_links_ranks_highest() {
    let g = graph(
        4,
        vec![
            Link::internal(1, 4),
            Link::internal(2, 4),
            Link::internal(3, 4),
        ],
    );
    let outcome = rank::rank(&g, &RankConfig::default());
    let by_page = outcome.by_page(&g);

    assert!(by_page[&4] > by_page[&1]);
    assert!(by_page[&4] > by_page[&2]);
}

#[test]
fn test_iteration_cap_reports_non_convergence() {
    let g = graph(3, vec![Link::internal(1, 2), Link::internal(2, 3)]);
    let config = RankConfig {
        max_iterations: 1,
        ..RankConfig::default()
    };
    let outcome = rank::rank(&g, &config);

    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.scores.len(), 3);
    assert!((outcome.total() - 1.0).abs() < 1e-6);
}

#[test]
fn test_empty_graph_ranks_nothing() {
    let g = LinkGraph::empty(0);
    let outcome = rank::rank(&g, &RankConfig::default());

    assert!(outcome.scores.is_empty());
    assert!(outcome.converged);
    assert_eq!(outcome.iterations, 0);
}

#[test]
fn test_rank_is_deterministic() {
    let links = || {
        vec![
            Link::internal(1, 2),
            Link::internal(2, 1),
            Link::internal(2, 3),
        ]
    };
    let first = rank::rank(&graph(3, links()), &RankConfig::default());
    let second = rank::rank(&graph(3, links()), &RankConfig::default());

    assert_eq!(first, second);
}
