use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of pages a single graph may select.
pub const MAX_PAGES_CEILING: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Keep links from a page to itself as edges.
    pub include_self_loops: bool,
    /// Drop links whose rel attribute carries `nofollow`.
    pub exclude_nofollow: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_self_loops: false,
            exclude_nofollow: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub damping: f64,
    /// Convergence threshold on the L1 delta between iterations.
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            epsilon: 1e-6,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Length of the hub and authority listings.
    pub top_k: usize,
    /// Pages with fewer outgoing links never count as hubs.
    pub hub_min_out_degree: usize,
    pub underlinked_min_words: u32,
    pub underlinked_max_in_degree: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            hub_min_out_degree: 0,
            underlinked_min_words: 300,
            underlinked_max_in_degree: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Inputs with fewer filtered tokens yield no keywords.
    pub min_tokens: usize,
    pub min_token_len: usize,
    pub max_ngram: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            min_tokens: 3,
            min_token_len: 3,
            max_ngram: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub candidate_limit: usize,
    pub keywords_per_source: usize,
    pub default_limit: usize,
    pub bulk_sources: usize,
    pub bulk_per_source: usize,
    /// Characters of source text kept on each side of a keyword.
    pub context_chars: usize,
    /// Rank the candidate set and feed scores into relevance scoring.
    pub rank_boost: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 200,
            keywords_per_source: 15,
            default_limit: 20,
            bulk_sources: 5,
            bulk_per_source: 3,
            context_chars: 150,
            rank_boost: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub top_anchors: usize,
    /// Share of anchored links (percent) above which an anchor is over-optimized.
    pub over_optimized_pct: f64,
    pub high_severity_pct: f64,
    pub generic_warning_pct: f64,
    pub short_anchor_chars: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            top_anchors: 20,
            over_optimized_pct: 5.0,
            high_severity_pct: 10.0,
            generic_warning_pct: 20.0,
            short_anchor_chars: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_max_pages: usize,
    pub graph: BuildOptions,
    pub rank: RankConfig,
    pub analysis: AnalysisConfig,
    pub keywords: KeywordConfig,
    pub matching: MatchConfig,
    pub anchors: AnchorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_pages: 1000,
            graph: BuildOptions::default(),
            rank: RankConfig::default(),
            analysis: AnalysisConfig::default(),
            keywords: KeywordConfig::default(),
            matching: MatchConfig::default(),
            anchors: AnchorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_max_pages(self.default_max_pages)?;

        let rank = &self.rank;
        if !(rank.damping > 0.0 && rank.damping < 1.0) {
            return Err(invalid(format!(
                "damping must lie in (0, 1), got {}",
                rank.damping
            )));
        }
        if !(rank.epsilon > 0.0) {
            return Err(invalid(format!(
                "epsilon must be positive, got {}",
                rank.epsilon
            )));
        }
        require_positive("rank.max_iterations", rank.max_iterations)?;
        require_positive("analysis.top_k", self.analysis.top_k)?;
        require_positive("keywords.min_tokens", self.keywords.min_tokens)?;
        require_positive("keywords.max_ngram", self.keywords.max_ngram)?;

        let matching = &self.matching;
        require_positive("matching.candidate_limit", matching.candidate_limit)?;
        if matching.candidate_limit > MAX_PAGES_CEILING {
            return Err(invalid(format!(
                "matching.candidate_limit must not exceed {}",
                MAX_PAGES_CEILING
            )));
        }
        require_positive("matching.keywords_per_source", matching.keywords_per_source)?;
        require_positive("matching.default_limit", matching.default_limit)?;
        require_positive("matching.bulk_sources", matching.bulk_sources)?;
        require_positive("matching.bulk_per_source", matching.bulk_per_source)?;

        Ok(())
    }
}

/// Reject page bounds that are zero or beyond [`MAX_PAGES_CEILING`].
pub fn validate_max_pages(max_pages: usize) -> Result<()> {
    if max_pages == 0 {
        return Err(invalid("max_pages must be greater than 0".to_string()));
    }
    if max_pages > MAX_PAGES_CEILING {
        return Err(invalid(format!(
            "max_pages must not exceed {}, got {}",
            MAX_PAGES_CEILING, max_pages
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(invalid(format!("{} must be greater than 0", name)));
    }
    Ok(())
}

fn invalid(msg: String) -> EngineError {
    EngineError::InvalidInput(msg)
}
