// Tests for link recommendations

use linkweave_engine::config::{KeywordConfig, MatchConfig};
use linkweave_engine::recommend::Recommender;
use linkweave_engine::{
    EngineError, Link, MemoryStore, Page, PageContent, RecommendationMode, RecommendationSet,
    Result, WeightedScorer,
};

fn page(id: i64, title: &str, text: &str, relevance: f64) -> Page {
    Page::new(id, 1, format!("https://example.com/{}", id))
        .with_title(title)
        .with_text(text)
        .with_relevance(relevance)
        .with_depth(1)
}

/// Source page 1 about python and machine learning, two matching targets,
/// one unrelated page and one python page the source already links to.
fn learning_store() -> MemoryStore {
    MemoryStore::new(
        vec![
            page(
                1,
                "Tutorial",
                "python machine learning tutorial for python beginners",
                90.0,
            ),
            page(
                2,
                "Python Basics",
                "An introduction to basic programming concepts and syntax.",
                50.0,
            ),
            page(
                3,
                "Learn Machine Learning",
                "Neural networks and data models explained for newcomers.",
                40.0,
            ),
            page(4, "Cooking Pasta", "Boil water, add salt and pasta.", 30.0),
            page(5, "Python Advanced", "Decorators, generators and metaclasses.", 20.0),
        ],
        vec![Link::internal(1, 5)],
    )
}

fn recommend(store: &MemoryStore, page_id: i64, limit: usize) -> Result<RecommendationSet> {
    let config = MatchConfig::default();
    let keywords = KeywordConfig::default();
    let scorer = WeightedScorer::default();
    Recommender::new(&config, &keywords, &scorer).focused(store, 1, page_id, limit)
}

// ============================================================================
// Focused Recommendation Tests
// ============================================================================

#[test]
fn test_python_and_machine_learning_targets() {
    let store = learning_store();
    let set = recommend(&store, 1, 10).unwrap();

    assert_eq!(set.mode, RecommendationMode::Focused);
    assert_eq!(set.recommendations.len(), 2);

    let first = &set.recommendations[0];
    assert_eq!(first.target_page_id, 2);
    assert_eq!(first.keyword, "python");
    assert!(first.reason.contains("title match"));
    assert!(first.context.as_deref().unwrap().contains("python"));

    let second = &set.recommendations[1];
    assert_eq!(second.target_page_id, 3);
    assert_eq!(second.keyword, "machine learning");
}

#[test]
fn test_recommendations_exclude_self_and_existing_links() {
    let store = learning_store();
    let set = recommend(&store, 1, 10).unwrap();

    for rec in &set.recommendations {
        assert_ne!(rec.target_page_id, 1);
        assert_ne!(rec.target_page_id, 5);
        assert!((0.0..=1.0).contains(&rec.score));
    }
}

#[test]
fn test_limit_truncates() {
    let store = learning_store();
    let set = recommend(&store, 1, 1).unwrap();

    assert_eq!(set.recommendations.len(), 1);
    assert_eq!(set.recommendations[0].target_page_id, 2);
}

#[test]
fn test_zero_limit_rejected_before_store_access() {
    let store = learning_store();
    let result = recommend(&store, 1, 0);

    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    assert_eq!(store.query_count(), 0);
}

#[test]
fn test_unknown_page_not_found() {
    let store = learning_store();
    let result = recommend(&store, 99, 10);

    assert!(matches!(
        result,
        Err(EngineError::PageNotFound {
            project_id: 1,
            page_id: 99
        })
    ));
}

#[test]
fn test_short_source_text_yields_empty_set() {
    let store = MemoryStore::new(
        vec![
            page(1, "Stub", "tiny page", 10.0),
            page(2, "Tiny Things", "tiny tiny tiny", 5.0),
        ],
        vec![],
    );
    let set = recommend(&store, 1, 10).unwrap();

    assert!(set.recommendations.is_empty());
    assert_eq!(set.sources_skipped, 1);
}

#[test]
fn test_unreadable_source_is_skipped() {
    let mut source = page(1, "Broken", "", 10.0);
    source.content = PageContent::Unreadable("invalid UTF-8".to_string());
    let store = MemoryStore::new(vec![source, page(2, "Other", "other words here", 5.0)], vec![]);

    let set = recommend(&store, 1, 10).unwrap();

    assert!(set.recommendations.is_empty());
    assert_eq!(set.skipped_pages, 1);
}

#[test]
fn test_unreadable_candidate_is_skipped_and_counted() {
    let mut store = learning_store();
    let mut broken = page(6, "Python Broken", "", 45.0);
    broken.content = PageContent::Unreadable("invalid UTF-8".to_string());
    store.add_page(broken);

    let set = recommend(&store, 1, 10).unwrap();

    assert_eq!(set.skipped_pages, 1);
    assert!(set.recommendations.iter().all(|r| r.target_page_id != 6));
    assert_eq!(set.recommendations.len(), 2);
}

#[test]
fn test_unavailable_store_is_retryable() {
    let store = learning_store();
    store.set_unavailable(true);
    let err = recommend(&store, 1, 10).unwrap_err();

    assert!(err.is_retryable());
}

// ============================================================================
// Bulk Recommendation Tests
// ============================================================================

fn topic_store() -> MemoryStore {
    let text = "rust async runtime guide covering rust futures and async executors";
    let mut pages: Vec<Page> = (1..=8)
        .map(|i| {
            page(
                i,
                &format!("Rust Async Runtime part {}", i),
                text,
                100.0 - i as f64,
            )
        })
        .collect();
    pages[1].content = PageContent::Unreadable("invalid UTF-8".to_string());
    MemoryStore::new(pages, vec![Link::internal(1, 3)])
}

#[test]
fn test_bulk_respects_source_and_per_source_bounds() {
    let store = topic_store();
    let config = MatchConfig::default();
    let keywords = KeywordConfig::default();
    let scorer = WeightedScorer::default();
    let set = Recommender::new(&config, &keywords, &scorer)
        .bulk(&store, 1)
        .unwrap();

    assert_eq!(set.mode, RecommendationMode::Bulk);
    assert_eq!(set.sources_scanned + set.sources_skipped, config.bulk_sources);
    assert_eq!(set.sources_skipped, 1);
    assert!(set.skipped_pages >= 1);

    for source in 1..=8 {
        let count = set
            .recommendations
            .iter()
            .filter(|r| r.source_page_id == Some(source))
            .count();
        assert!(count <= config.bulk_per_source);
    }
    assert!(!set.recommendations.is_empty());
}

#[test]
fn test_bulk_never_recommends_self_or_existing_links() {
    let store = topic_store();
    let config = MatchConfig::default();
    let keywords = KeywordConfig::default();
    let scorer = WeightedScorer::default();
    let set = Recommender::new(&config, &keywords, &scorer)
        .bulk(&store, 1)
        .unwrap();

    for rec in &set.recommendations {
        assert_ne!(rec.source_page_id, Some(rec.target_page_id));
        assert_ne!(rec.target_page_id, 2);
        assert!(!(rec.source_page_id == Some(1) && rec.target_page_id == 3));
        assert!((0.0..=1.0).contains(&rec.score));
    }
}

#[test]
fn test_bulk_on_empty_project() {
    let store = MemoryStore::default();
    let config = MatchConfig::default();
    let keywords = KeywordConfig::default();
    let scorer = WeightedScorer::default();
    let set = Recommender::new(&config, &keywords, &scorer)
        .bulk(&store, 1)
        .unwrap();

    assert!(set.recommendations.is_empty());
    assert_eq!(set.sources_scanned, 0);
}
