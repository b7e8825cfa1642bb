use linkweave::handlers::*;
use linkweave_core::config::{CONFIG_FILE, DATABASE_FILE, load_config};
use linkweave_core::data::Database;
use linkweave_core::import::{Snapshot, import_snapshot};
use linkweave_core::report::ReportFormat;
use linkweave_engine::EngineConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "project": { "name": "Bakery", "domain": "bakery.example" },
  "pages": [
    {
      "url": "https://bakery.example/",
      "title": "Home",
      "text": "Fresh sourdough bread baked daily. Our sourdough loaves and rye bread sell out early.",
      "relevance_score": 90.0
    },
    {
      "url": "https://bakery.example/sourdough",
      "title": "Sourdough Guide",
      "text": "How to feed a starter and shape a loaf.",
      "relevance_score": 60.0,
      "depth": 1
    },
    {
      "url": "https://bakery.example/rye",
      "title": "Rye Bread",
      "text": "Dense rye loaves with caraway.",
      "relevance_score": 50.0,
      "depth": 1
    }
  ],
  "links": [
    { "source_url": "https://bakery.example/", "target_url": "/rye", "anchor_text": "read more" },
    { "source_url": "https://bakery.example/rye", "target_url": "/", "anchor_text": "Home" }
  ]
}"#;

fn create_test_workspace() -> (TempDir, Database, i64) {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(temp_dir.path(), false).unwrap();
    let db = Database::new(&temp_dir.path().join(DATABASE_FILE)).unwrap();
    let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();
    let summary = import_snapshot(&db, &snapshot, None).unwrap();
    (temp_dir, db, summary.project_id)
}

// ============================================================================
// Path and Argument Helpers
// ============================================================================

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/linkweave");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("linkweave"));
}

#[test]
fn test_expand_path_absolute_unchanged() {
    assert_eq!(expand_path("/tmp/lw"), PathBuf::from("/tmp/lw"));
}

#[test]
fn test_workspace_resolve_defaults() {
    let workspace = Workspace::resolve(None, None);
    assert!(workspace.database.ends_with(DATABASE_FILE));
    assert!(workspace.config.ends_with(CONFIG_FILE));
    assert_eq!(workspace.database.parent(), workspace.config.parent());
}

#[test]
fn test_workspace_resolve_explicit() {
    let workspace = Workspace::resolve(Some(Path::new("/data/site.db")), None);
    assert_eq!(workspace.database, PathBuf::from("/data/site.db"));
    assert!(workspace.config.ends_with(CONFIG_FILE));
}

#[test]
fn test_open_database_requires_init() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missing.db");
    let workspace = Workspace::resolve(Some(&db_path), None);

    let err = workspace.open_database().unwrap_err();
    assert!(err.to_string().contains("linkweave init"));
    assert!(!db_path.exists());
}

#[test]
fn test_parse_format() {
    assert_eq!(parse_format("md").unwrap(), ReportFormat::Markdown);
    assert_eq!(parse_format("CSV").unwrap(), ReportFormat::Csv);
    assert!(parse_format("html").is_err());
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_workspace_creates_database_and_config() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("linkweave");

    let outcome = init_workspace(&dir, false).unwrap();

    assert!(outcome.database.exists());
    assert!(outcome.wrote_config);
    assert!(!outcome.replaced_database);
    assert_eq!(load_config(&outcome.config).unwrap(), EngineConfig::default());
}

#[test]
fn test_init_workspace_keeps_data_without_overwrite() {
    let (temp_dir, db, _) = create_test_workspace();
    drop(db);

    let outcome = init_workspace(temp_dir.path(), false).unwrap();
    assert!(!outcome.replaced_database);
    assert!(!outcome.wrote_config);

    let db = Database::new(&outcome.database).unwrap();
    assert_eq!(db.list_projects().unwrap().len(), 1);
}

#[test]
fn test_init_workspace_overwrite_replaces_database() {
    let (temp_dir, db, _) = create_test_workspace();
    drop(db);

    let outcome = init_workspace(temp_dir.path(), true).unwrap();
    assert!(outcome.replaced_database);

    let db = Database::new(&outcome.database).unwrap();
    assert!(db.list_projects().unwrap().is_empty());
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_render_stats_text() {
    let (_dir, db, project) = create_test_workspace();
    let report = render_stats(&db, project, None, &EngineConfig::default(), ReportFormat::Text)
        .unwrap();

    assert!(report.contains("LINKWEAVE LINK GRAPH REPORT"));
    assert!(report.contains("Bakery"));
    assert!(report.contains("3 of 3 analyzed"));
}

#[test]
fn test_render_stats_unknown_project() {
    let (_dir, db, project) = create_test_workspace();
    let err = render_stats(
        &db,
        project + 10,
        None,
        &EngineConfig::default(),
        ReportFormat::Text,
    )
    .unwrap_err();

    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_render_stats_rejects_zero_max_pages() {
    let (_dir, db, project) = create_test_workspace();
    let result = render_stats(
        &db,
        project,
        Some(0),
        &EngineConfig::default(),
        ReportFormat::Json,
    );

    assert!(result.is_err());
}

#[test]
fn test_render_export_csv() {
    let (_dir, db, project) = create_test_workspace();
    let csv = render_export(&db, project, None, &EngineConfig::default(), ReportFormat::Csv)
        .unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "source,target,anchor_text,rel");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_render_export_json() {
    let (_dir, db, project) = create_test_workspace();
    let json = render_export(&db, project, None, &EngineConfig::default(), ReportFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(value["edges"].as_array().unwrap().len(), 2);
}

#[test]
fn test_render_focused_recommendations() {
    let (_dir, db, project) = create_test_workspace();
    let home = db
        .get_page_by_url(project, "https://bakery.example/")
        .unwrap()
        .unwrap();

    let json = render_recommendations(
        &db,
        project,
        Some(home),
        Some(5),
        &EngineConfig::default(),
        ReportFormat::Json,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let recs = value["report"]["data"]["recommendations"].as_array().unwrap();

    assert_eq!(value["report"]["data"]["mode"], "focused");
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|r| r["target_url"] != "https://bakery.example/rye"));
    assert!(recs
        .iter()
        .any(|r| r["target_url"] == "https://bakery.example/sourdough"));
}

#[test]
fn test_render_recommendations_rejects_zero_limit() {
    let (_dir, db, project) = create_test_workspace();
    let result = render_recommendations(
        &db,
        project,
        None,
        Some(0),
        &EngineConfig::default(),
        ReportFormat::Text,
    );

    assert!(result.is_err());
}

#[test]
fn test_render_anchors_markdown() {
    let (_dir, db, project) = create_test_workspace();
    let report = render_anchors(
        &db,
        project,
        None,
        &EngineConfig::default(),
        ReportFormat::Markdown,
    )
    .unwrap();

    assert!(report.starts_with("# Anchor text audit: Bakery"));
    assert!(report.contains("read more"));
}

#[test]
fn test_emit_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.csv");

    emit("a,b\n", Some(&path)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
}
