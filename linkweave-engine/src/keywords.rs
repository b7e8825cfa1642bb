// Frequency-based keyword extraction

use crate::config::KeywordConfig;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during",
    "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "me", "might", "more", "most", "must", "my", "myself", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "s", "same", "she", "should", "so", "some", "such", "t",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub phrase: String,
    pub count: usize,
    /// Frequency relative to the most frequent phrase, in (0, 1].
    pub score: f64,
    /// Number of words in the phrase.
    pub ngram: usize,
    /// Index of the first occurrence in the filtered token stream.
    pub first_position: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    config: KeywordConfig,
}

impl KeywordExtractor {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    /// Most frequent phrases of `text`, best first.
    ///
    /// Ties prefer longer phrases, then earlier first occurrence. Inputs with
    /// fewer than `min_tokens` usable tokens yield an empty list.
    pub fn extract(&self, text: &str, top_n: usize) -> Vec<Keyword> {
        if top_n == 0 {
            return Vec::new();
        }

        let tokens = self.tokenize(text);
        if tokens.len() < self.config.min_tokens {
            return Vec::new();
        }

        let mut tallies: HashMap<String, Tally> = HashMap::new();
        for_each_ngram(&tokens, self.config.max_ngram, |phrase, ngram, position| {
            tallies
                .entry(phrase)
                .or_insert(Tally {
                    count: 0,
                    ngram,
                    first_position: position,
                })
                .count += 1;
        });

        let mut ranked: Vec<(String, Tally)> = tallies.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(b.ngram.cmp(&a.ngram))
                .then(a.first_position.cmp(&b.first_position))
        });
        ranked.truncate(top_n);

        let max_count = ranked.first().map(|(_, t)| t.count).unwrap_or(1) as f64;
        ranked
            .into_iter()
            .map(|(phrase, tally)| Keyword {
                phrase,
                count: tally.count,
                score: tally.count as f64 / max_count,
                ngram: tally.ngram,
                first_position: tally.first_position,
            })
            .collect()
    }

    /// Lowercased tokens with stop words, short tokens, URLs and e-mail
    /// addresses removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for word in text.split_whitespace() {
            if looks_like_address(word) {
                continue;
            }
            for piece in word.split(|c: char| !c.is_alphanumeric()) {
                if piece.is_empty() {
                    continue;
                }
                let token = piece.to_lowercase();
                if token.chars().count() < self.config.min_token_len || is_stop_word(&token) {
                    continue;
                }
                tokens.push(token);
            }
        }

        tokens
    }

    pub fn index(&self, text: &str) -> TermIndex {
        let tokens = self.tokenize(text);
        let mut counts = HashMap::new();
        for_each_ngram(&tokens, self.config.max_ngram, |phrase, _, _| {
            *counts.entry(phrase).or_insert(0) += 1;
        });
        TermIndex { counts }
    }
}

/// Convenience wrapper over [`KeywordExtractor::extract`] with default settings.
pub fn extract(text: &str, top_n: usize) -> Vec<Keyword> {
    KeywordExtractor::default().extract(text, top_n)
}

/// Occurrence counts of every phrase in a text, for constant-time lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermIndex {
    counts: HashMap<String, usize>,
}

impl TermIndex {
    pub fn count(&self, phrase: &str) -> usize {
        self.counts.get(phrase).copied().unwrap_or(0)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.counts.contains_key(phrase)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: usize,
    ngram: usize,
    first_position: usize,
}

fn for_each_ngram(tokens: &[String], max_ngram: usize, mut visit: impl FnMut(String, usize, usize)) {
    for n in 1..=max_ngram {
        for (position, window) in tokens.windows(n).enumerate() {
            visit(window.join(" "), n, position);
        }
    }
}

fn looks_like_address(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("www.") || word.contains('@')
}
