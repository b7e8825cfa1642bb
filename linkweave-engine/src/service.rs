use crate::analysis;
use crate::anchors::{self, AnchorReport};
use crate::config::{EngineConfig, validate_max_pages};
use crate::error::{EngineError, Result};
use crate::graph::{GraphBuilder, LinkGraph};
use crate::model::{GraphExport, GraphStats, PageId, ProjectId, RecommendationSet};
use crate::rank::{self, RankOutcome};
use crate::recommend::Recommender;
use crate::scoring::{RelevanceScorer, WeightedScorer};
use crate::store::PageStore;
use tracing::{debug, info};

fn ranked_graph<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    max_pages: usize,
    config: &EngineConfig,
) -> Result<(LinkGraph, RankOutcome)> {
    config.validate()?;
    validate_max_pages(max_pages)?;

    let graph = GraphBuilder::new(&config.graph).build(store, project_id, max_pages)?;
    let outcome = rank::rank(&graph, &config.rank);
    Ok((graph, outcome))
}

/// Link statistics for the `max_pages` most relevant pages of a project.
pub fn graph_stats<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    max_pages: usize,
    config: &EngineConfig,
) -> Result<GraphStats> {
    let (graph, outcome) = ranked_graph(store, project_id, max_pages, config)?;
    let stats = analysis::analyze(&graph, &outcome, &config.analysis);
    info!(
        "Graph stats for project {}: {} pages, {} links, {} orphans",
        project_id, stats.total_pages, stats.total_links, stats.orphan_count
    );
    Ok(stats)
}

pub fn export_graph<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    max_pages: usize,
    config: &EngineConfig,
) -> Result<GraphExport> {
    let (graph, outcome) = ranked_graph(store, project_id, max_pages, config)?;
    Ok(analysis::export(&graph, &outcome))
}

/// Link recommendations with the default [`WeightedScorer`].
///
/// With `page_id` set, recommends links to add to that page; otherwise
/// samples the top pages of the project. `limit` defaults to
/// `matching.default_limit`.
pub fn recommendations<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    page_id: Option<PageId>,
    limit: Option<usize>,
    config: &EngineConfig,
) -> Result<RecommendationSet> {
    let scorer = WeightedScorer::default();
    recommendations_with_scorer(store, project_id, page_id, limit, config, &scorer)
}

pub fn recommendations_with_scorer<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    page_id: Option<PageId>,
    limit: Option<usize>,
    config: &EngineConfig,
    scorer: &dyn RelevanceScorer,
) -> Result<RecommendationSet> {
    config.validate()?;
    let limit = limit.unwrap_or(config.matching.default_limit);
    if limit == 0 {
        return Err(EngineError::InvalidInput(
            "limit must be greater than 0".to_string(),
        ));
    }

    let mut recommender = Recommender::new(&config.matching, &config.keywords, scorer);
    if config.matching.rank_boost {
        let graph = GraphBuilder::new(&config.graph).build(
            store,
            project_id,
            config.matching.candidate_limit,
        )?;
        let outcome = rank::rank(&graph, &config.rank);
        debug!(
            "Rank boost over {} candidate pages ({} iterations)",
            graph.node_count(),
            outcome.iterations
        );
        recommender = recommender.with_ranks(outcome.by_page(&graph));
    }
    debug!("Scoring recommendations with the {} scorer", scorer.name());

    match page_id {
        Some(page_id) => recommender.focused(store, project_id, page_id, limit),
        None => {
            let mut set = recommender.bulk(store, project_id)?;
            set.recommendations.truncate(limit);
            Ok(set)
        }
    }
}

pub fn anchor_report<S: PageStore + ?Sized>(
    store: &S,
    project_id: ProjectId,
    max_pages: usize,
    config: &EngineConfig,
) -> Result<AnchorReport> {
    config.validate()?;
    validate_max_pages(max_pages)?;

    let graph = GraphBuilder::new(&config.graph).build(store, project_id, max_pages)?;
    Ok(anchors::audit(&graph, &config.anchors))
}
