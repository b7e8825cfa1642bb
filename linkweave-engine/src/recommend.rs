// Internal link recommendations

use crate::config::{KeywordConfig, MatchConfig};
use crate::error::{EngineError, Result};
use crate::keywords::{Keyword, KeywordExtractor, TermIndex};
use crate::model::{
    Page, PageContent, PageId, ProjectId, Recommendation, RecommendationMode, RecommendationSet,
};
use crate::scoring::{MatchSignals, RelevanceScorer};
use crate::snippet;
use crate::store::{PageQuery, PageStore};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// A target page with its searchable fields pre-indexed.
struct Candidate {
    page: Page,
    title: TermIndex,
    h1: TermIndex,
    meta: TermIndex,
    body: TermIndex,
}

enum SourceOutcome {
    Matched(Vec<Recommendation>),
    NoKeywords,
    Unreadable,
    NoText,
}

pub struct Recommender<'a> {
    config: &'a MatchConfig,
    extractor: KeywordExtractor,
    scorer: &'a dyn RelevanceScorer,
    ranks: Option<HashMap<PageId, f64>>,
}

impl<'a> Recommender<'a> {
    pub fn new(
        config: &'a MatchConfig,
        keywords: &KeywordConfig,
        scorer: &'a dyn RelevanceScorer,
    ) -> Self {
        Self {
            config,
            extractor: KeywordExtractor::new(keywords.clone()),
            scorer,
            ranks: None,
        }
    }

    /// Feed rank scores of candidate pages into scoring, normalized so the
    /// best-ranked page gets 1.
    pub fn with_ranks(mut self, ranks: HashMap<PageId, f64>) -> Self {
        let max = ranks.values().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            self.ranks = Some(ranks.into_iter().map(|(id, r)| (id, r / max)).collect());
        }
        self
    }

    /// Recommendations for links to add to one source page.
    pub fn focused<S: PageStore + ?Sized>(
        &self,
        store: &S,
        project_id: ProjectId,
        page_id: PageId,
        limit: usize,
    ) -> Result<RecommendationSet> {
        if limit == 0 {
            return Err(EngineError::InvalidInput(
                "limit must be greater than 0".to_string(),
            ));
        }

        let source = store
            .get_page(project_id, page_id)?
            .ok_or(EngineError::PageNotFound {
                project_id,
                page_id,
            })?;

        let mut set = RecommendationSet::empty(RecommendationMode::Focused);
        let text = match &source.content {
            PageContent::Text(text) => text.as_str(),
            PageContent::Unreadable(reason) => {
                warn!("Skipping source page {}: {}", page_id, reason);
                set.sources_skipped = 1;
                set.skipped_pages = 1;
                return Ok(set);
            }
            PageContent::Missing => {
                debug!("Source page {} has no text", page_id);
                set.sources_skipped = 1;
                return Ok(set);
            }
        };

        let keywords = self
            .extractor
            .extract(text, self.config.keywords_per_source);
        if keywords.is_empty() {
            debug!("Source page {} yielded no keywords", page_id);
            set.sources_skipped = 1;
            return Ok(set);
        }
        debug!(
            "Extracted {} keywords from page {} ({} chars)",
            keywords.len(),
            page_id,
            text.len()
        );

        let query = PageQuery::new(project_id, self.config.candidate_limit)
            .excluding([page_id])
            .with_content();
        let pages = store.list_pages(&query)?;
        let candidate_ids: Vec<PageId> = pages.iter().map(|p| p.id).collect();
        let linked: HashSet<PageId> = store
            .list_internal_links(&[page_id], &candidate_ids)?
            .into_iter()
            .filter_map(|link| link.target_page_id)
            .collect();

        let candidates = self.prepare_candidates(pages, &mut set.skipped_pages);
        set.candidates_considered = candidates
            .iter()
            .filter(|c| c.page.id != page_id && !linked.contains(&c.page.id))
            .count();
        set.sources_scanned = 1;

        let mut recommendations =
            self.match_keywords(&source, text, &keywords, &candidates, &linked);
        recommendations.truncate(limit);
        info!(
            "Generated {} recommendations for page {} from {} candidates",
            recommendations.len(),
            page_id,
            set.candidates_considered
        );
        set.recommendations = recommendations;

        Ok(set)
    }

    /// Recommendations across a small sample of the most relevant pages.
    pub fn bulk<S: PageStore + ?Sized>(
        &self,
        store: &S,
        project_id: ProjectId,
    ) -> Result<RecommendationSet> {
        let mut set = RecommendationSet::empty(RecommendationMode::Bulk);

        let sources =
            store.list_pages(&PageQuery::new(project_id, self.config.bulk_sources).with_content())?;
        if sources.is_empty() {
            return Ok(set);
        }

        let pages = store
            .list_pages(&PageQuery::new(project_id, self.config.candidate_limit).with_content())?;
        let source_ids: Vec<PageId> = sources.iter().map(|p| p.id).collect();
        let candidate_ids: Vec<PageId> = pages.iter().map(|p| p.id).collect();

        let mut linked: HashMap<PageId, HashSet<PageId>> = HashMap::new();
        for link in store.list_internal_links(&source_ids, &candidate_ids)? {
            if let Some(target) = link.target_page_id {
                linked.entry(link.source_page_id).or_default().insert(target);
            }
        }

        let candidates = self.prepare_candidates(pages, &mut set.skipped_pages);
        set.candidates_considered = candidates.len();
        let no_links = HashSet::new();

        for source in &sources {
            let source_linked = linked.get(&source.id).unwrap_or(&no_links);
            match self.recommend_for_source(source, &candidates, source_linked) {
                SourceOutcome::Matched(mut recommendations) => {
                    recommendations.truncate(self.config.bulk_per_source);
                    set.sources_scanned += 1;
                    set.recommendations.extend(recommendations);
                }
                SourceOutcome::Unreadable => {
                    set.sources_skipped += 1;
                    set.skipped_pages += 1;
                }
                SourceOutcome::NoKeywords | SourceOutcome::NoText => {
                    set.sources_skipped += 1;
                }
            }
        }

        set.recommendations.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.source_page_id.cmp(&b.source_page_id))
                .then(a.target_page_id.cmp(&b.target_page_id))
        });
        info!(
            "Bulk recommendations for project {}: {} from {} sources ({} skipped)",
            project_id,
            set.recommendations.len(),
            set.sources_scanned,
            set.sources_skipped
        );

        Ok(set)
    }

    fn recommend_for_source(
        &self,
        source: &Page,
        candidates: &[Candidate],
        linked: &HashSet<PageId>,
    ) -> SourceOutcome {
        let text = match &source.content {
            PageContent::Text(text) => text.as_str(),
            PageContent::Unreadable(reason) => {
                warn!("Skipping source page {}: {}", source.id, reason);
                return SourceOutcome::Unreadable;
            }
            PageContent::Missing => return SourceOutcome::NoText,
        };

        let keywords = self
            .extractor
            .extract(text, self.config.keywords_per_source);
        if keywords.is_empty() {
            debug!("Source page {} yielded no keywords, skipping", source.id);
            return SourceOutcome::NoKeywords;
        }

        SourceOutcome::Matched(self.match_keywords(source, text, &keywords, candidates, linked))
    }

    fn prepare_candidates(&self, pages: Vec<Page>, skipped: &mut usize) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(pages.len());
        for page in pages {
            if let PageContent::Unreadable(reason) = &page.content {
                warn!("Skipping candidate page {}: {}", page.id, reason);
                *skipped += 1;
                continue;
            }
            candidates.push(Candidate {
                title: self.index_field(page.title.as_deref()),
                h1: self.index_field(page.h1.as_deref()),
                meta: self.index_field(page.meta_description.as_deref()),
                body: self.index_field(page.content.text()),
                page,
            });
        }
        candidates
    }

    fn index_field(&self, field: Option<&str>) -> TermIndex {
        field
            .map(|text| self.extractor.index(text))
            .unwrap_or_default()
    }

    /// Best keyword per eligible candidate, sorted by score.
    fn match_keywords(
        &self,
        source: &Page,
        text: &str,
        keywords: &[Keyword],
        candidates: &[Candidate],
        linked: &HashSet<PageId>,
    ) -> Vec<Recommendation> {
        let mut matches: Vec<(f64, &Candidate, &Keyword, MatchSignals)> = Vec::new();

        for candidate in candidates {
            let target = &candidate.page;
            if target.id == source.id || linked.contains(&target.id) {
                continue;
            }

            let mut best: Option<(f64, &Keyword, MatchSignals)> = None;
            for keyword in keywords {
                let signals = self.signals(keyword, candidate);
                let score = self.scorer.score(&signals);
                if !score.is_finite() || score <= 0.0 {
                    continue;
                }
                let score = score.min(1.0);
                let better = match &best {
                    None => true,
                    Some((best_score, best_keyword, _)) => {
                        match score.total_cmp(best_score) {
                            Ordering::Greater => true,
                            Ordering::Less => false,
                            Ordering::Equal => keyword.ngram > best_keyword.ngram,
                        }
                    }
                };
                if better {
                    best = Some((score, keyword, signals));
                }
            }

            if let Some((score, keyword, signals)) = best {
                matches.push((score, candidate, keyword, signals));
            }
        }

        matches.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.page.id.cmp(&b.1.page.id)));

        matches
            .into_iter()
            .map(|(score, candidate, keyword, signals)| Recommendation {
                target_page_id: candidate.page.id,
                target_url: candidate.page.url.clone(),
                target_title: candidate.page.display_title().to_string(),
                keyword: keyword.phrase.clone(),
                source_page_id: Some(source.id),
                source_url: Some(source.url.clone()),
                context: snippet::snippet_for(text, &keyword.phrase, self.config.context_chars),
                score,
                reason: reason(&keyword.phrase, &signals),
            })
            .collect()
    }

    fn signals(&self, keyword: &Keyword, candidate: &Candidate) -> MatchSignals {
        let phrase = keyword.phrase.as_str();
        let target = &candidate.page;
        MatchSignals {
            keyword_score: keyword.score,
            ngram: keyword.ngram,
            in_title: candidate.title.contains(phrase),
            in_h1: candidate.h1.contains(phrase),
            in_meta_description: candidate.meta.contains(phrase),
            body_occurrences: candidate.body.count(phrase),
            target_relevance: target.relevance_score,
            target_in_degree: target.in_degree,
            target_depth: target.depth,
            target_rank: self
                .ranks
                .as_ref()
                .and_then(|ranks| ranks.get(&target.id).copied()),
        }
    }
}

fn reason(keyword: &str, signals: &MatchSignals) -> String {
    let location = if signals.in_title {
        "title match".to_string()
    } else if signals.in_h1 {
        "heading match".to_string()
    } else if signals.in_meta_description {
        "description match".to_string()
    } else {
        format!("mentioned {} times in body", signals.body_occurrences)
    };

    if signals.target_in_degree == 0 {
        format!(
            "Content similarity on '{}' ({}, target has no incoming links)",
            keyword, location
        )
    } else {
        format!("Content similarity on '{}' ({})", keyword, location)
    }
}
