// Loading crawl snapshots into the database

use crate::data::Database;
use crate::error::{CoreError, Result};
use linkweave_engine::model::{Link, Page, PageId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub project: SnapshotProject,
    #[serde(default)]
    pub pages: Vec<SnapshotPage>,
    #[serde(default)]
    pub links: Vec<SnapshotLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotProject {
    pub name: String,
    /// Host the crawl started from, used to classify links as internal.
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPage {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub h1: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub source_url: String,
    /// Absolute, or relative to the source page.
    pub target_url: String,
    #[serde(default)]
    pub anchor_text: Option<String>,
    #[serde(default)]
    pub rel: Option<String>,
    /// Derived from the target host when absent.
    #[serde(default)]
    pub is_internal: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub project_id: ProjectId,
    pub pages: usize,
    pub links: usize,
    pub unresolved_links: usize,
    pub external_links: usize,
    /// Links whose source page is not part of the snapshot or whose target
    /// URL could not be parsed.
    pub skipped_links: usize,
}

/// Callback for reporting import progress
pub type ImportProgressCallback<'a> = &'a dyn Fn(String);

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    Ok(snapshot)
}

/// Absolute form of `raw` without its fragment, resolved against `base` when
/// relative.
pub fn normalize_url(raw: &str, base: Option<&Url>) -> Option<Url> {
    let raw = raw.trim();
    let mut url = match (Url::parse(raw), base) {
        (Ok(url), _) => url,
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base.join(raw).ok()?,
        _ => return None,
    };
    url.set_fragment(None);
    Some(url)
}

fn bare_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Whether `url` lives on `domain`, ignoring case and a leading `www.`.
pub fn is_internal_url(url: &Url, domain: &str) -> bool {
    let domain = domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    match url.host_str() {
        Some(host) => bare_host(host) == bare_host(domain),
        None => false,
    }
}

pub fn import_snapshot(
    db: &Database,
    snapshot: &Snapshot,
    progress: Option<ImportProgressCallback<'_>>,
) -> Result<ImportSummary> {
    let domain = snapshot.project.domain.trim();
    if domain.is_empty() {
        return Err(CoreError::Snapshot("project domain is empty".to_string()));
    }

    let mut page_urls = Vec::with_capacity(snapshot.pages.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, page) in snapshot.pages.iter().enumerate() {
        let url = normalize_url(&page.url, None).ok_or_else(|| {
            CoreError::Snapshot(format!("page {} has an invalid URL '{}'", idx, page.url))
        })?;
        if let Some(first) = seen.insert(url.to_string(), idx) {
            return Err(CoreError::Snapshot(format!(
                "pages {} and {} share the URL {}",
                first, idx, url
            )));
        }
        page_urls.push(url);
    }

    let tx = db.get_connection().unchecked_transaction()?;
    let project_id = db.create_project(&snapshot.project.name, domain)?;
    let mut summary = ImportSummary {
        project_id,
        ..ImportSummary::default()
    };

    let mut ids: HashMap<String, PageId> = HashMap::with_capacity(page_urls.len());
    for (page, url) in snapshot.pages.iter().zip(&page_urls) {
        let mut record = Page::new(0, project_id, url.as_str()).with_depth(page.depth);
        if let Some(text) = &page.text {
            record = record.with_text(text.as_str());
        }
        record.title = page.title.clone();
        record.meta_description = page.meta_description.clone();
        record.h1 = page.h1.clone();
        record.relevance_score = page.relevance_score;

        let id = db.insert_page(project_id, &record)?;
        ids.insert(url.to_string(), id);
        summary.pages += 1;
    }
    if let Some(report) = progress {
        report(format!("Stored {} pages", summary.pages));
    }

    for link in &snapshot.links {
        let Some(source_url) = normalize_url(&link.source_url, None) else {
            summary.skipped_links += 1;
            continue;
        };
        let Some(&source_id) = ids.get(source_url.as_str()) else {
            debug!("Skipping link from unknown page {}", link.source_url);
            summary.skipped_links += 1;
            continue;
        };
        let Some(target_url) = normalize_url(&link.target_url, Some(&source_url)) else {
            warn!("Skipping link with invalid target '{}'", link.target_url);
            summary.skipped_links += 1;
            continue;
        };

        let is_internal = link
            .is_internal
            .unwrap_or_else(|| is_internal_url(&target_url, domain));
        let target_page_id = ids.get(target_url.as_str()).copied();
        if !is_internal {
            summary.external_links += 1;
        } else if target_page_id.is_none() {
            summary.unresolved_links += 1;
        }

        let record = Link {
            source_page_id: source_id,
            target_page_id,
            anchor_text: link.anchor_text.clone(),
            rel: link.rel.clone(),
            is_internal,
        };
        db.insert_link(&record, target_url.as_str())?;
        summary.links += 1;
    }
    if let Some(report) = progress {
        report(format!("Stored {} links", summary.links));
    }

    db.refresh_link_counts(project_id)?;
    tx.commit()?;

    info!(
        "Imported project {} ({}): {} pages, {} links, {} unresolved",
        project_id, snapshot.project.name, summary.pages, summary.links, summary.unresolved_links
    );
    Ok(summary)
}
