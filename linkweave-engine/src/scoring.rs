// Relevance scoring for link recommendations

use serde::{Deserialize, Serialize};

/// Everything known about one keyword occurring in one candidate target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSignals {
    /// Keyword frequency in the source relative to its top keyword.
    pub keyword_score: f64,
    pub ngram: usize,
    pub in_title: bool,
    pub in_h1: bool,
    pub in_meta_description: bool,
    pub body_occurrences: usize,
    /// Target SEO score on a 0-100 scale.
    pub target_relevance: Option<f64>,
    pub target_in_degree: u32,
    pub target_depth: u32,
    /// Target rank normalized to `[0, 1]` within the candidate set.
    pub target_rank: Option<f64>,
}

impl MatchSignals {
    pub fn has_presence(&self) -> bool {
        self.in_title || self.in_h1 || self.in_meta_description || self.body_occurrences > 0
    }
}

pub trait RelevanceScorer {
    fn name(&self) -> &str;

    /// Score in `[0, 1]`; zero means "do not recommend".
    fn score(&self, signals: &MatchSignals) -> f64;
}

/// Linear blend of keyword strength, prominence in the target, target
/// importance and under-linkedness, adjusted for crawl depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedScorer {
    pub keyword_weight: f64,
    pub prominence_weight: f64,
    pub relevance_weight: f64,
    pub underlinked_weight: f64,
    pub rank_weight: f64,
    /// Bonus per word beyond the first in a multi-word keyword.
    pub phrase_bonus: f64,
    pub max_phrase_bonus: f64,
    pub title_hit: f64,
    pub h1_hit: f64,
    pub meta_hit: f64,
    /// Body occurrences that saturate the body component.
    pub body_saturation: usize,
    pub body_cap: f64,
    pub preferred_depth: (u32, u32),
    pub preferred_depth_multiplier: f64,
    pub deep_page_depth: u32,
    pub deep_page_multiplier: f64,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self {
            keyword_weight: 0.4,
            prominence_weight: 0.35,
            relevance_weight: 0.15,
            underlinked_weight: 0.10,
            rank_weight: 0.10,
            phrase_bonus: 0.05,
            max_phrase_bonus: 0.10,
            title_hit: 0.5,
            h1_hit: 0.3,
            meta_hit: 0.2,
            body_saturation: 10,
            body_cap: 0.5,
            preferred_depth: (2, 3),
            preferred_depth_multiplier: 1.1,
            deep_page_depth: 5,
            deep_page_multiplier: 0.8,
        }
    }
}

impl WeightedScorer {
    /// Prominence of the keyword in the target, normalized to `[0, 1]`.
    pub fn prominence(&self, signals: &MatchSignals) -> f64 {
        let mut raw = 0.0;
        if signals.in_title {
            raw += self.title_hit;
        }
        if signals.in_h1 {
            raw += self.h1_hit;
        }
        if signals.in_meta_description {
            raw += self.meta_hit;
        }
        if signals.body_occurrences > 0 && self.body_saturation > 0 {
            let body = signals.body_occurrences as f64 / self.body_saturation as f64;
            raw += body.min(self.body_cap);
        }

        let max = self.title_hit + self.h1_hit + self.meta_hit + self.body_cap;
        if max <= 0.0 { 0.0 } else { (raw / max).min(1.0) }
    }

    fn depth_multiplier(&self, depth: u32) -> f64 {
        let (low, high) = self.preferred_depth;
        if (low..=high).contains(&depth) {
            self.preferred_depth_multiplier
        } else if depth > self.deep_page_depth {
            self.deep_page_multiplier
        } else {
            1.0
        }
    }
}

impl RelevanceScorer for WeightedScorer {
    fn name(&self) -> &str {
        "weighted"
    }

    fn score(&self, signals: &MatchSignals) -> f64 {
        if !signals.has_presence() {
            return 0.0;
        }

        let relevance = signals
            .target_relevance
            .map(|r| (r / 100.0).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let underlinked = 1.0 / (1.0 + signals.target_in_degree as f64);
        let phrase = (signals.ngram.saturating_sub(1) as f64 * self.phrase_bonus)
            .min(self.max_phrase_bonus);

        let mut score = self.keyword_weight * signals.keyword_score.clamp(0.0, 1.0)
            + self.prominence_weight * self.prominence(signals)
            + self.relevance_weight * relevance
            + self.underlinked_weight * underlinked
            + phrase;
        if let Some(rank) = signals.target_rank {
            score += self.rank_weight * rank.clamp(0.0, 1.0);
        }

        (score * self.depth_multiplier(signals.target_depth)).clamp(0.0, 1.0)
    }
}
