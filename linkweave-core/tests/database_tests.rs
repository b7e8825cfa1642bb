// Tests for database functionality

use linkweave_core::data::Database;
use linkweave_engine::store::{PageQuery, PageStore};
use linkweave_engine::{EngineConfig, Link, Page, PageContent, graph_stats, recommendations};
use rusqlite::params;
use tempfile::TempDir;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn insert(db: &Database, project_id: i64, url: &str, relevance: Option<f64>) -> i64 {
    let mut page = Page::new(0, project_id, url)
        .with_title(format!("Title of {}", url))
        .with_text(format!("body text for {}", url));
    page.relevance_score = relevance;
    db.insert_page(project_id, &page).unwrap()
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists_and_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));
    {
        let _db = Database::new(&db_path).unwrap();
    }
    assert!(Database::exists(&db_path));

    Database::drop(&db_path).unwrap();
    assert!(!Database::exists(&db_path));
}

#[test]
fn test_schema_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let first = Database::new(&db_path).unwrap();
    first.create_project("site", "example.com").unwrap();
    drop(first);

    let second = Database::new(&db_path).unwrap();
    assert_eq!(second.list_projects().unwrap().len(), 1);
}

// ============================================================================
// Project and Page Tests
// ============================================================================

#[test]
fn test_create_and_get_project() {
    let (_dir, db) = create_test_db();
    let id = db.create_project("Example", "example.com").unwrap();
    insert(&db, id, "https://example.com/", Some(10.0));

    let project = db.get_project(id).unwrap().unwrap();
    assert_eq!(project.name, "Example");
    assert_eq!(project.domain, "example.com");
    assert_eq!(project.page_count, 1);
    assert_eq!(project.link_count, 0);

    assert!(db.get_project(id + 100).unwrap().is_none());
}

#[test]
fn test_get_page_by_url() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let id = insert(&db, project, "https://example.com/about", None);

    assert_eq!(
        db.get_page_by_url(project, "https://example.com/about").unwrap(),
        Some(id)
    );
    assert_eq!(
        db.get_page_by_url(project, "https://example.com/missing").unwrap(),
        None
    );
}

#[test]
fn test_duplicate_page_url_rejected() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    insert(&db, project, "https://example.com/", None);

    let page = Page::new(0, project, "https://example.com/");
    assert!(db.insert_page(project, &page).is_err());
}

// ============================================================================
// PageStore Tests
// ============================================================================

#[test]
fn test_list_pages_orders_by_relevance_nulls_last() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let low = insert(&db, project, "https://example.com/low", Some(10.0));
    let none = insert(&db, project, "https://example.com/none", None);
    let high = insert(&db, project, "https://example.com/high", Some(90.0));
    let tie = insert(&db, project, "https://example.com/tie", Some(10.0));

    let pages = db.list_pages(&PageQuery::new(project, 10)).unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![high, low, tie, none]);
    assert!(pages.iter().all(|p| p.content == PageContent::Missing));
}

#[test]
fn test_list_pages_applies_limit_and_exclusions() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let a = insert(&db, project, "https://example.com/a", Some(3.0));
    let b = insert(&db, project, "https://example.com/b", Some(2.0));
    let c = insert(&db, project, "https://example.com/c", Some(1.0));

    let pages = db
        .list_pages(&PageQuery::new(project, 2).excluding([a]).with_content())
        .unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![b, c]);
    assert!(pages[0].content.text().unwrap().contains("body text"));
}

#[test]
fn test_count_pages_per_project() {
    let (_dir, db) = create_test_db();
    let first = db.create_project("First", "first.example").unwrap();
    let second = db.create_project("Second", "second.example").unwrap();
    insert(&db, first, "https://first.example/", None);
    insert(&db, first, "https://first.example/a", None);
    insert(&db, second, "https://second.example/", None);

    assert_eq!(db.count_pages(first).unwrap(), 2);
    assert_eq!(db.count_pages(second).unwrap(), 1);
}

#[test]
fn test_select_pages_reads_one_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    let project = db.create_project("Example", "example.com").unwrap();
    insert(&db, project, "https://example.com/a", Some(3.0));
    insert(&db, project, "https://example.com/b", Some(2.0));

    let writer = Database::new(&db_path).unwrap();
    writer.get_connection().execute_batch("BEGIN IMMEDIATE").unwrap();
    insert(&writer, project, "https://example.com/c", Some(1.0));

    let selection = db.select_pages(&PageQuery::new(project, 10)).unwrap();
    assert_eq!(selection.total_available, 2);
    assert_eq!(selection.pages.len(), 2);

    writer.get_connection().execute_batch("COMMIT").unwrap();

    let selection = db.select_pages(&PageQuery::new(project, 2)).unwrap();
    assert_eq!(selection.total_available, 3);
    assert_eq!(selection.pages.len(), 2);
}

#[test]
fn test_list_internal_links_filters_and_keeps_unresolved() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let a = insert(&db, project, "https://example.com/a", Some(3.0));
    let b = insert(&db, project, "https://example.com/b", Some(2.0));
    let c = insert(&db, project, "https://example.com/c", Some(1.0));

    db.insert_link(&Link::internal(a, b), "https://example.com/b").unwrap();
    db.insert_link(&Link::internal(a, c), "https://example.com/c").unwrap();
    db.insert_link(&Link::unresolved(a), "https://example.com/gone").unwrap();
    let mut external = Link::unresolved(a);
    external.is_internal = false;
    db.insert_link(&external, "https://elsewhere.example/").unwrap();

    let links = db.list_internal_links(&[a], &[a, b]).unwrap();

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].target_page_id, Some(b));
    assert_eq!(links[1].target_page_id, None);
    assert!(db.list_internal_links(&[], &[a, b]).unwrap().is_empty());
}

#[test]
fn test_get_page_includes_text() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let id = insert(&db, project, "https://example.com/a", Some(3.0));

    let page = db.get_page(project, id).unwrap().unwrap();
    assert_eq!(page.url, "https://example.com/a");
    assert_eq!(page.content.text(), Some("body text for https://example.com/a"));
    assert_eq!(page.word_count, 4);

    assert!(db.get_page(project + 1, id).unwrap().is_none());
}

#[test]
fn test_invalid_utf8_text_is_unreadable() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let id = insert(&db, project, "https://example.com/a", Some(3.0));
    db.get_connection()
        .execute(
            "UPDATE pages SET text_content = ?1 WHERE id = ?2",
            params![vec![0x66u8, 0x6f, 0xff, 0xfe], id],
        )
        .unwrap();

    let page = db.get_page(project, id).unwrap().unwrap();
    assert!(page.content.is_unreadable());
}

#[test]
fn test_refresh_link_counts() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let a = insert(&db, project, "https://example.com/a", Some(3.0));
    let b = insert(&db, project, "https://example.com/b", Some(2.0));
    db.insert_link(&Link::internal(a, b), "https://example.com/b").unwrap();
    db.insert_link(&Link::unresolved(a), "https://example.com/gone").unwrap();

    db.refresh_link_counts(project).unwrap();

    let a_page = db.get_page(project, a).unwrap().unwrap();
    let b_page = db.get_page(project, b).unwrap().unwrap();
    assert_eq!(a_page.out_degree, 1);
    assert_eq!(b_page.in_degree, 1);
}

// ============================================================================
// Engine Integration Tests
// ============================================================================

#[test]
fn test_graph_stats_over_sqlite() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let a = insert(&db, project, "https://example.com/a", Some(4.0));
    let b = insert(&db, project, "https://example.com/b", Some(3.0));
    let c = insert(&db, project, "https://example.com/c", Some(2.0));
    let d = insert(&db, project, "https://example.com/d", Some(1.0));
    for (s, t) in [(a, b), (a, c), (b, d), (c, d)] {
        db.insert_link(&Link::internal(s, t), "unused").unwrap();
    }
    db.insert_link(&Link::unresolved(d), "https://example.com/gone")
        .unwrap();

    let stats = graph_stats(&db, project, 100, &EngineConfig::default()).unwrap();

    assert_eq!(stats.total_pages, 4);
    assert_eq!(stats.total_links, 4);
    assert_eq!(stats.dropped_links.unresolved, 1);
    assert_eq!(stats.authority_pages[0].page_id, d);
    assert_eq!(stats.orphan_pages[0].page_id, a);
}

#[test]
fn test_recommendations_over_sqlite() {
    let (_dir, db) = create_test_db();
    let project = db.create_project("Example", "example.com").unwrap();
    let source = db
        .insert_page(
            project,
            &Page::new(0, project, "https://example.com/blog")
                .with_title("Blog")
                .with_text("our sourdough bread recipe uses a slow sourdough starter")
                .with_relevance(80.0),
        )
        .unwrap();
    let target = db
        .insert_page(
            project,
            &Page::new(0, project, "https://example.com/sourdough")
                .with_title("Sourdough Starter Guide")
                .with_text("feeding schedule and hydration")
                .with_relevance(60.0),
        )
        .unwrap();

    let set = recommendations(&db, project, Some(source), Some(5), &EngineConfig::default())
        .unwrap();

    assert_eq!(set.recommendations.len(), 1);
    assert_eq!(set.recommendations[0].target_page_id, target);
}
