// Bounded link graph construction

use crate::config::{BuildOptions, validate_max_pages};
use crate::error::Result;
use crate::model::{DroppedLinks, Link, Page, PageId, ProjectId};
use crate::store::{PageQuery, PageSelection, PageStore};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNodeData {
    pub page_id: PageId,
    pub url: String,
    pub title: Option<String>,
    pub relevance_score: Option<f64>,
    pub depth: u32,
    pub word_count: u32,
}

impl From<&Page> for GraphNodeData {
    fn from(page: &Page) -> Self {
        Self {
            page_id: page.id,
            url: page.url.clone(),
            title: page.title.clone(),
            relevance_score: page.relevance_score,
            depth: page.depth,
            word_count: page.word_count,
        }
    }
}

impl GraphNodeData {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdgeData {
    pub anchor_text: Option<String>,
    pub rel: Option<String>,
}

/// Directed graph of the selected pages of one project.
///
/// Node indices follow selection order, i.e. descending relevance.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    graph: DiGraph<GraphNodeData, GraphEdgeData>,
    index: HashMap<PageId, NodeIndex>,
    total_available: usize,
    dropped: DroppedLinks,
}

impl LinkGraph {
    pub fn empty(total_available: usize) -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            total_available,
            dropped: DroppedLinks::default(),
        }
    }

    pub fn inner(&self) -> &DiGraph<GraphNodeData, GraphEdgeData> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn included_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn total_available(&self) -> usize {
        self.total_available
    }

    pub fn dropped(&self) -> &DroppedLinks {
        &self.dropped
    }

    pub fn node_index(&self, page_id: PageId) -> Option<NodeIndex> {
        self.index.get(&page_id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNodeData {
        &self.graph[idx]
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.graph.node_weights().map(|n| n.page_id)
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    pub fn contains_edge(&self, source: PageId, target: PageId) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(s), Some(t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    /// Assemble a graph from already-selected pages and the links among them.
    pub fn from_parts(
        pages: &[Page],
        links: Vec<Link>,
        total_available: usize,
        options: &BuildOptions,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(pages.len(), links.len());
        let mut index = HashMap::with_capacity(pages.len());

        for page in pages {
            if index.contains_key(&page.id) {
                continue;
            }
            let idx = graph.add_node(GraphNodeData::from(page));
            index.insert(page.id, idx);
        }

        let mut dropped = DroppedLinks::default();
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

        for link in links {
            if !link.is_internal {
                dropped.external += 1;
                continue;
            }
            let Some(target_id) = link.target_page_id else {
                dropped.unresolved += 1;
                continue;
            };
            let (Some(&source), Some(&target)) =
                (index.get(&link.source_page_id), index.get(&target_id))
            else {
                dropped.outside_selection += 1;
                continue;
            };
            if source == target && !options.include_self_loops {
                dropped.self_loops += 1;
                continue;
            }
            if options.exclude_nofollow && link.is_nofollow() {
                dropped.nofollow += 1;
                continue;
            }
            if !seen.insert((source, target)) {
                dropped.duplicates += 1;
                continue;
            }

            graph.add_edge(
                source,
                target,
                GraphEdgeData {
                    anchor_text: link.anchor_text,
                    rel: link.rel,
                },
            );
        }

        Self {
            graph,
            index,
            total_available,
            dropped,
        }
    }
}

pub struct GraphBuilder<'a> {
    options: &'a BuildOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(options: &'a BuildOptions) -> Self {
        Self { options }
    }

    /// Select the `max_pages` most relevant pages of a project and the
    /// internal links between them.
    pub fn build<S: PageStore + ?Sized>(
        &self,
        store: &S,
        project_id: ProjectId,
        max_pages: usize,
    ) -> Result<LinkGraph> {
        validate_max_pages(max_pages)?;

        let PageSelection {
            pages,
            total_available,
        } = store.select_pages(&PageQuery::new(project_id, max_pages))?;
        debug!(
            "Selected {} of {} pages for project {}",
            pages.len(),
            total_available,
            project_id
        );

        if pages.is_empty() {
            return Ok(LinkGraph::empty(total_available));
        }

        let ids: Vec<PageId> = pages.iter().map(|p| p.id).collect();
        let links = store.list_internal_links(&ids, &ids)?;
        let link_count = links.len();

        let graph = LinkGraph::from_parts(&pages, links, total_available, self.options);
        info!(
            "Built link graph for project {}: {} nodes, {} edges ({} of {} links dropped)",
            project_id,
            graph.node_count(),
            graph.edge_count(),
            graph.dropped().total(),
            link_count
        );
        if graph.dropped().unresolved > 0 {
            debug!(
                "Dropped {} links with unresolved targets",
                graph.dropped().unresolved
            );
        }

        Ok(graph)
    }
}
