// Tests for keyword extraction

use linkweave_engine::config::KeywordConfig;
use linkweave_engine::keywords::{self, KeywordExtractor};

// ============================================================================
// Keyword Extraction Tests
// ============================================================================

#[test]
fn test_most_frequent_keyword_first() {
    let found = keywords::extract("python machine learning tutorial for python beginners", 5);

    assert_eq!(found[0].phrase, "python");
    assert_eq!(found[0].count, 2);
    assert_eq!(found[0].score, 1.0);
}

#[test]
fn test_longer_phrases_win_frequency_ties() {
    let found = keywords::extract("rust memory safety rust memory safety", 3);

    assert_eq!(found[0].phrase, "rust memory safety");
    assert_eq!(found[0].count, 2);
    assert_eq!(found[0].ngram, 3);
}

#[test]
fn test_extraction_is_idempotent() {
    let text = "Graph databases store nodes and edges. Graph queries walk edges between nodes.";
    let first = keywords::extract(text, 10);
    let second = keywords::extract(text, 10);

    assert_eq!(first, second);
}

#[test]
fn test_short_input_yields_nothing() {
    assert!(keywords::extract("", 10).is_empty());
    assert!(keywords::extract("hello world", 10).is_empty());
    assert!(keywords::extract("the and of it", 10).is_empty());
}

#[test]
fn test_top_n_bounds_result() {
    let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
    assert_eq!(keywords::extract(text, 4).len(), 4);
    assert!(keywords::extract(text, 0).is_empty());
}

#[test]
fn test_extractor_respects_max_ngram() {
    let extractor = KeywordExtractor::new(KeywordConfig {
        max_ngram: 1,
        ..KeywordConfig::default()
    });
    let found = extractor.extract("static typing static typing static typing", 10);

    assert!(found.iter().all(|k| k.ngram == 1));
}
