// Read-only access to crawled pages and links

use crate::error::StoreError;
use crate::model::{Link, Page, PageContent, PageId, ProjectId};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

/// Parameters of an ordered, limited page listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub project_id: ProjectId,
    pub limit: usize,
    pub exclude: Vec<PageId>,
    pub with_content: bool,
}

impl PageQuery {
    pub fn new(project_id: ProjectId, limit: usize) -> Self {
        Self {
            project_id,
            limit,
            exclude: Vec::new(),
            with_content: false,
        }
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = PageId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    pub fn with_content(mut self) -> Self {
        self.with_content = true;
        self
    }
}

/// Pages picked by a listing plus the project total they were picked from.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSelection {
    pub pages: Vec<Page>,
    pub total_available: usize,
}

pub trait PageStore {
    /// Pages of a project ordered by relevance score descending, missing
    /// scores last, ties by id ascending, truncated to `query.limit`.
    fn list_pages(&self, query: &PageQuery) -> Result<Vec<Page>, StoreError>;

    fn count_pages(&self, project_id: ProjectId) -> Result<usize, StoreError>;

    /// `list_pages` together with the project's page count, both read from
    /// the same state of the store.
    ///
    /// Stores that can change between two calls must override this.
    fn select_pages(&self, query: &PageQuery) -> Result<PageSelection, StoreError> {
        let total_available = self.count_pages(query.project_id)?;
        let pages = self.list_pages(query)?;
        Ok(PageSelection {
            pages,
            total_available,
        })
    }

    /// Internal links whose source is in `source_ids` and whose target is in
    /// `target_ids` or unresolved.
    fn list_internal_links(
        &self,
        source_ids: &[PageId],
        target_ids: &[PageId],
    ) -> Result<Vec<Link>, StoreError>;

    /// A single page of the project, including its text.
    fn get_page(&self, project_id: ProjectId, page_id: PageId) -> Result<Option<Page>, StoreError>;
}

/// Ordering used by every page listing.
pub fn relevance_order(a: &Page, b: &Page) -> Ordering {
    match (a.relevance_score, b.relevance_score) {
        (Some(x), Some(y)) => y.total_cmp(&x).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

/// In-memory snapshot of pages and links.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Vec<Page>,
    links: Vec<Link>,
    queries: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(pages: Vec<Page>, links: Vec<Link>) -> Self {
        Self {
            pages,
            links,
            queries: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Number of store calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn begin_query(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl PageStore for MemoryStore {
    fn list_pages(&self, query: &PageQuery) -> Result<Vec<Page>, StoreError> {
        self.begin_query()?;
        let excluded: HashSet<PageId> = query.exclude.iter().copied().collect();

        let mut pages: Vec<&Page> = self
            .pages
            .iter()
            .filter(|p| p.project_id == query.project_id && !excluded.contains(&p.id))
            .collect();
        pages.sort_by(|a, b| relevance_order(a, b));

        Ok(pages
            .into_iter()
            .take(query.limit)
            .map(|p| {
                let mut page = p.clone();
                if !query.with_content {
                    page.content = PageContent::Missing;
                }
                page
            })
            .collect())
    }

    fn count_pages(&self, project_id: ProjectId) -> Result<usize, StoreError> {
        self.begin_query()?;
        Ok(self
            .pages
            .iter()
            .filter(|p| p.project_id == project_id)
            .count())
    }

    fn list_internal_links(
        &self,
        source_ids: &[PageId],
        target_ids: &[PageId],
    ) -> Result<Vec<Link>, StoreError> {
        self.begin_query()?;
        let sources: HashSet<PageId> = source_ids.iter().copied().collect();
        let targets: HashSet<PageId> = target_ids.iter().copied().collect();

        Ok(self
            .links
            .iter()
            .filter(|link| link.is_internal && sources.contains(&link.source_page_id))
            .filter(|link| match link.target_page_id {
                Some(target) => targets.contains(&target),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn get_page(
        &self,
        project_id: ProjectId,
        page_id: PageId,
    ) -> Result<Option<Page>, StoreError> {
        self.begin_query()?;
        Ok(self
            .pages
            .iter()
            .find(|p| p.project_id == project_id && p.id == page_id)
            .cloned())
    }
}
