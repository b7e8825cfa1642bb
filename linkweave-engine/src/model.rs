use serde::{Deserialize, Serialize};

pub type PageId = i64;
pub type ProjectId = i64;

/// Text of a crawled page as handed over by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageContent {
    /// No text was extracted, or content was not requested.
    Missing,
    Text(String),
    /// The store holds text for this page but could not decode it.
    Unreadable(String),
}

impl PageContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            PageContent::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, PageContent::Unreadable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub project_id: ProjectId,
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Option<String>,
    pub content: PageContent,
    /// SEO score on a 0-100 scale, `None` when never computed.
    pub relevance_score: Option<f64>,
    pub depth: u32,
    pub word_count: u32,
    pub in_degree: u32,
    pub out_degree: u32,
}

impl Page {
    pub fn new(id: PageId, project_id: ProjectId, url: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            url: url.into(),
            title: None,
            meta_description: None,
            h1: None,
            content: PageContent::Missing,
            relevance_score: None,
            depth: 0,
            word_count: 0,
            in_degree: 0,
            out_degree: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.word_count = text.split_whitespace().count() as u32;
        self.content = PageContent::Text(text);
        self
    }

    pub fn with_relevance(mut self, score: f64) -> Self {
        self.relevance_score = Some(score);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Title for display, falling back to the URL.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source_page_id: PageId,
    /// `None` when the target URL was never successfully crawled.
    pub target_page_id: Option<PageId>,
    pub anchor_text: Option<String>,
    pub rel: Option<String>,
    pub is_internal: bool,
}

impl Link {
    pub fn internal(source: PageId, target: PageId) -> Self {
        Self {
            source_page_id: source,
            target_page_id: Some(target),
            anchor_text: None,
            rel: None,
            is_internal: true,
        }
    }

    pub fn unresolved(source: PageId) -> Self {
        Self {
            source_page_id: source,
            target_page_id: None,
            anchor_text: None,
            rel: None,
            is_internal: true,
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor_text = Some(anchor.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn is_nofollow(&self) -> bool {
        self.rel
            .as_deref()
            .map(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("nofollow"))
            })
            .unwrap_or(false)
    }
}

/// Page as reported in hub/authority/orphan listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub page_id: PageId,
    pub url: String,
    pub title: String,
    pub relevance_score: f64,
    pub depth: u32,
    pub rank: f64,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Counts of links discarded while building a graph, by reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DroppedLinks {
    pub unresolved: usize,
    pub outside_selection: usize,
    pub external: usize,
    pub self_loops: usize,
    pub duplicates: usize,
    pub nofollow: usize,
}

impl DroppedLinks {
    pub fn total(&self) -> usize {
        self.unresolved
            + self.outside_selection
            + self.external
            + self.self_loops
            + self.duplicates
            + self.nofollow
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_pages: usize,
    pub total_links: usize,
    pub avg_links_per_page: f64,
    pub orphan_count: usize,
    pub orphan_pages: Vec<PageSummary>,
    pub hub_pages: Vec<PageSummary>,
    pub authority_pages: Vec<PageSummary>,
    pub underlinked_pages: Vec<PageSummary>,
    pub pages_without_outgoing: usize,
    pub max_incoming_links: usize,
    pub included_count: usize,
    pub total_available: usize,
    pub dropped_links: DroppedLinks,
    pub rank_iterations: usize,
    pub rank_converged: bool,
}

impl GraphStats {
    pub fn empty(total_available: usize) -> Self {
        Self {
            total_pages: 0,
            total_links: 0,
            avg_links_per_page: 0.0,
            orphan_count: 0,
            orphan_pages: Vec::new(),
            hub_pages: Vec::new(),
            authority_pages: Vec::new(),
            underlinked_pages: Vec::new(),
            pages_without_outgoing: 0,
            max_incoming_links: 0,
            included_count: 0,
            total_available,
            dropped_links: DroppedLinks::default(),
            rank_iterations: 0,
            rank_converged: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    pub id: PageId,
    pub label: String,
    pub url: String,
    pub relevance_score: f64,
    pub depth: u32,
    pub rank: f64,
    pub in_degree: usize,
    pub out_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: PageId,
    pub target: PageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
    pub included_count: usize,
    pub total_available: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub target_page_id: PageId,
    pub target_url: String,
    pub target_title: String,
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_page_id: Option<PageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMode {
    Focused,
    Bulk,
}

impl RecommendationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationMode::Focused => "focused",
            RecommendationMode::Bulk => "bulk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub mode: RecommendationMode,
    pub recommendations: Vec<Recommendation>,
    pub sources_scanned: usize,
    pub sources_skipped: usize,
    pub candidates_considered: usize,
    /// Pages whose text could not be processed and were left out.
    pub skipped_pages: usize,
}

impl RecommendationSet {
    pub fn empty(mode: RecommendationMode) -> Self {
        Self {
            mode,
            recommendations: Vec::new(),
            sources_scanned: 0,
            sources_skipped: 0,
            candidates_considered: 0,
            skipped_pages: 0,
        }
    }
}
