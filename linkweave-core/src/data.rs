use chrono::Utc;
use linkweave_engine::error::StoreError;
use linkweave_engine::model::{Link, Page, PageContent, PageId, ProjectId};
use linkweave_engine::store::{PageQuery, PageSelection, PageStore};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result, Row, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub name: String,
    pub domain: String,
    pub created_at: i64,
    pub page_count: usize,
    pub link_count: usize,
}

const PAGE_COLUMNS: &str = "id, project_id, url, title, meta_description, h1, text_content, \
     relevance_score, depth, word_count, in_degree, out_degree";

const PAGE_COLUMNS_WITHOUT_TEXT: &str = "id, project_id, url, title, meta_description, h1, NULL, \
     relevance_score, depth, word_count, in_degree, out_degree";

fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    domain TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

-- Crawled pages
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    meta_description TEXT,
    h1 TEXT,
    text_content BLOB,        -- extracted body text, decoded on read
    relevance_score REAL,     -- SEO score 0-100, NULL when never computed
    depth INTEGER NOT NULL DEFAULT 0,
    word_count INTEGER NOT NULL DEFAULT 0,
    in_degree INTEGER NOT NULL DEFAULT 0,
    out_degree INTEGER NOT NULL DEFAULT 0,
    crawled_at INTEGER NOT NULL,

    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    UNIQUE(project_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_project ON pages(project_id);
CREATE INDEX IF NOT EXISTS idx_pages_relevance ON pages(project_id, relevance_score DESC, id);

-- Hyperlinks between pages
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_page_id INTEGER NOT NULL,
    target_page_id INTEGER,   -- NULL when the target was never crawled
    target_url TEXT NOT NULL,
    anchor_text TEXT,
    rel TEXT,
    is_internal BOOLEAN NOT NULL DEFAULT 1,

    FOREIGN KEY(source_page_id) REFERENCES pages(id) ON DELETE CASCADE,
    FOREIGN KEY(target_page_id) REFERENCES pages(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_links_source ON links(source_page_id);
CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_page_id);
            ",
        )?;
        Ok(())
    }

    pub fn create_project(&self, name: &str, domain: &str) -> Result<ProjectId> {
        self.conn.execute(
            "INSERT INTO projects (name, domain, created_at) VALUES (?1, ?2, ?3)",
            params![name, domain, current_timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_project(&self, project_id: ProjectId) -> Result<Option<ProjectInfo>> {
        self.conn
            .query_row(
                "SELECT p.id, p.name, p.domain, p.created_at,
                        (SELECT COUNT(*) FROM pages WHERE project_id = p.id),
                        (SELECT COUNT(*) FROM links l JOIN pages s ON l.source_page_id = s.id
                         WHERE s.project_id = p.id)
                 FROM projects p WHERE p.id = ?1",
                [project_id],
                project_from_row,
            )
            .optional()
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.domain, p.created_at,
                    (SELECT COUNT(*) FROM pages WHERE project_id = p.id),
                    (SELECT COUNT(*) FROM links l JOIN pages s ON l.source_page_id = s.id
                     WHERE s.project_id = p.id)
             FROM projects p ORDER BY p.id",
        )?;

        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>>>()?;

        Ok(projects)
    }

    /// Store a page under `project_id`; the page's own id is ignored.
    pub fn insert_page(&self, project_id: ProjectId, page: &Page) -> Result<PageId> {
        self.conn.execute(
            "INSERT INTO pages (
                project_id, url, title, meta_description, h1, text_content,
                relevance_score, depth, word_count, crawled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                project_id,
                page.url,
                page.title,
                page.meta_description,
                page.h1,
                page.content.text(),
                page.relevance_score,
                page.depth,
                page.word_count,
                current_timestamp(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_link(&self, link: &Link, target_url: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO links (source_page_id, target_page_id, target_url, anchor_text, rel, is_internal)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                link.source_page_id,
                link.target_page_id,
                target_url,
                link.anchor_text,
                link.rel,
                link.is_internal,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_page_by_url(&self, project_id: ProjectId, url: &str) -> Result<Option<PageId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM pages WHERE project_id = ?1 AND url = ?2")?;
        let id = stmt
            .query_row(params![project_id, url], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Recompute the stored in/out degree of every page of a project from its
    /// resolved internal links.
    pub fn refresh_link_counts(&self, project_id: ProjectId) -> Result<usize> {
        let updated = self.conn.execute(
            "UPDATE pages SET
                in_degree = (SELECT COUNT(*) FROM links
                             WHERE target_page_id = pages.id AND is_internal = 1
                               AND source_page_id != pages.id),
                out_degree = (SELECT COUNT(*) FROM links
                              WHERE source_page_id = pages.id AND is_internal = 1
                                AND target_page_id IS NOT NULL)
             WHERE project_id = ?1",
            [project_id],
        )?;
        debug!("Refreshed link counts for {} pages", updated);
        Ok(updated)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

fn project_from_row(row: &Row<'_>) -> Result<ProjectInfo> {
    Ok(ProjectInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        domain: row.get(2)?,
        created_at: row.get(3)?,
        page_count: row.get::<_, i64>(4)? as usize,
        link_count: row.get::<_, i64>(5)? as usize,
    })
}

/// Page text is stored as written by the crawler and may not be valid UTF-8.
fn content_from_value(value: ValueRef<'_>) -> PageContent {
    match value {
        ValueRef::Null => PageContent::Missing,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => PageContent::Text(text.to_string()),
            Err(e) => PageContent::Unreadable(format!("text is not valid UTF-8: {}", e)),
        },
        ValueRef::Integer(_) | ValueRef::Real(_) => {
            PageContent::Unreadable("text column holds a number".to_string())
        }
    }
}

fn page_from_row(row: &Row<'_>) -> Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        project_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        meta_description: row.get(4)?,
        h1: row.get(5)?,
        content: content_from_value(row.get_ref(6)?),
        relevance_score: row.get(7)?,
        depth: row.get(8)?,
        word_count: row.get(9)?,
        in_degree: row.get(10)?,
        out_degree: row.get(11)?,
    })
}

fn link_from_row(row: &Row<'_>) -> Result<Link> {
    Ok(Link {
        source_page_id: row.get(0)?,
        target_page_id: row.get(1)?,
        anchor_text: row.get(2)?,
        rel: row.get(3)?,
        is_internal: row.get(4)?,
    })
}

fn store_error(err: rusqlite::Error) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

fn id_array(ids: &[PageId]) -> std::result::Result<String, StoreError> {
    serde_json::to_string(ids).map_err(|e| StoreError::Query(e.to_string()))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl PageStore for Database {
    fn list_pages(&self, query: &PageQuery) -> std::result::Result<Vec<Page>, StoreError> {
        let columns = if query.with_content {
            PAGE_COLUMNS
        } else {
            PAGE_COLUMNS_WITHOUT_TEXT
        };
        let sql = format!(
            "SELECT {} FROM pages
             WHERE project_id = ?1
               AND id NOT IN (SELECT value FROM json_each(?2))
             ORDER BY relevance_score IS NULL, relevance_score DESC, id ASC
             LIMIT ?3",
            columns
        );
        let exclude = id_array(&query.exclude)?;

        let mut stmt = self.conn.prepare(&sql).map_err(store_error)?;
        let pages = stmt
            .query_map(
                params![query.project_id, exclude, sql_limit(query.limit)],
                page_from_row,
            )
            .map_err(store_error)?
            .collect::<Result<Vec<_>>>()
            .map_err(store_error)?;

        debug!(
            "Listed {} pages for project {} (limit {})",
            pages.len(),
            query.project_id,
            query.limit
        );
        Ok(pages)
    }

    fn count_pages(&self, project_id: ProjectId) -> std::result::Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM pages WHERE project_id = ?1",
                [project_id],
                |row| row.get(0),
            )
            .map_err(store_error)?;
        Ok(count as usize)
    }

    fn select_pages(&self, query: &PageQuery) -> std::result::Result<PageSelection, StoreError> {
        // Count and listing share one read snapshot.
        let tx = self.conn.unchecked_transaction().map_err(store_error)?;
        let total_available = self.count_pages(query.project_id)?;
        let pages = self.list_pages(query)?;
        tx.commit().map_err(store_error)?;

        Ok(PageSelection {
            pages,
            total_available,
        })
    }

    fn list_internal_links(
        &self,
        source_ids: &[PageId],
        target_ids: &[PageId],
    ) -> std::result::Result<Vec<Link>, StoreError> {
        if source_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sources = id_array(source_ids)?;
        let targets = id_array(target_ids)?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT source_page_id, target_page_id, anchor_text, rel, is_internal
                 FROM links
                 WHERE is_internal = 1
                   AND source_page_id IN (SELECT value FROM json_each(?1))
                   AND (target_page_id IS NULL
                        OR target_page_id IN (SELECT value FROM json_each(?2)))
                 ORDER BY id",
            )
            .map_err(store_error)?;
        let links = stmt
            .query_map(params![sources, targets], link_from_row)
            .map_err(store_error)?
            .collect::<Result<Vec<_>>>()
            .map_err(store_error)?;

        Ok(links)
    }

    fn get_page(
        &self,
        project_id: ProjectId,
        page_id: PageId,
    ) -> std::result::Result<Option<Page>, StoreError> {
        let sql = format!(
            "SELECT {} FROM pages WHERE project_id = ?1 AND id = ?2",
            PAGE_COLUMNS
        );
        self.conn
            .query_row(&sql, params![project_id, page_id], page_from_row)
            .optional()
            .map_err(store_error)
    }
}
