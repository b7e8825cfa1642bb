// Anchor-text audit of internal links

use crate::config::AnchorConfig;
use crate::graph::LinkGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

const GENERIC_ANCHORS: &[&str] = &[
    // English
    "click here",
    "here",
    "read more",
    "learn more",
    "more",
    "continue reading",
    "click",
    "link",
    "this page",
    "this link",
    "this article",
    "view more",
    "see more",
    "more info",
    "more information",
    "details",
    "info",
    // French
    "cliquez ici",
    "ici",
    "lire la suite",
    "en savoir plus",
    "plus",
    "suite",
    "cliquer",
    "lien",
    "cette page",
    "ce lien",
    "cet article",
    "voir plus",
    "plus d'info",
    "plus d'informations",
    "détails",
    "continuer",
];

static GENERIC_ANCHOR_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| GENERIC_ANCHORS.iter().copied().collect());

const LISTED_ANCHORS: usize = 10;
const EMPTY_ANCHOR_RATIO: f64 = 0.3;
const HIGH_GENERIC_PCT: f64 = 30.0;
const HEALTHY_GENERIC_PCT: f64 = 10.0;

pub fn is_generic_anchor(anchor: &str) -> bool {
    GENERIC_ANCHOR_SET.contains(anchor.trim().to_lowercase().as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    GenericAnchors,
    OverOptimization,
    EmptyAnchors,
    ShortAnchors,
    Healthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorCount {
    pub anchor_text: String,
    pub count: usize,
    /// Share of links that carry anchor text, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverOptimizedAnchor {
    pub anchor_text: String,
    pub count: usize,
    pub percentage: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReport {
    pub total_links: usize,
    pub links_with_anchor_text: usize,
    pub links_without_anchor_text: usize,
    pub unique_anchor_texts: usize,
    /// Distinct generic anchors in use.
    pub generic_anchor_count: usize,
    pub generic_percentage: f64,
    pub top_anchors: Vec<AnchorCount>,
    pub generic_anchors: Vec<AnchorCount>,
    pub over_optimized: Vec<OverOptimizedAnchor>,
    pub average_anchor_length: f64,
    pub advisories: Vec<Advisory>,
    pub included_count: usize,
    pub total_available: usize,
}

impl AnchorReport {
    pub fn empty(included_count: usize, total_available: usize) -> Self {
        Self {
            total_links: 0,
            links_with_anchor_text: 0,
            links_without_anchor_text: 0,
            unique_anchor_texts: 0,
            generic_anchor_count: 0,
            generic_percentage: 0.0,
            top_anchors: Vec::new(),
            generic_anchors: Vec::new(),
            over_optimized: Vec::new(),
            average_anchor_length: 0.0,
            advisories: Vec::new(),
            included_count,
            total_available,
        }
    }
}

/// Audit the anchor texts of every edge in `graph`.
pub fn audit(graph: &LinkGraph, config: &AnchorConfig) -> AnchorReport {
    let mut report = AnchorReport::empty(graph.included_count(), graph.total_available());
    report.total_links = graph.edge_count();
    if report.total_links == 0 {
        return report;
    }

    // Normalized anchor -> (count, first seen), so ties keep edge order.
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut total_chars = 0usize;
    for edge in graph.inner().edge_weights() {
        let Some(anchor) = edge.anchor_text.as_deref() else {
            continue;
        };
        let anchor = anchor.trim().to_lowercase();
        if anchor.is_empty() {
            continue;
        }
        total_chars += anchor.chars().count();
        report.links_with_anchor_text += 1;
        let seen = counts.len();
        counts.entry(anchor).or_insert((0, seen)).0 += 1;
    }
    report.links_without_anchor_text = report.total_links - report.links_with_anchor_text;
    report.unique_anchor_texts = counts.len();

    let anchored = report.links_with_anchor_text;
    if anchored > 0 {
        let pct = |count: usize| round2(count as f64 * 100.0 / anchored as f64);

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(anchor, (count, seen))| (anchor, count, seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let mut generic_links = 0;
        for (anchor, count, _) in &ranked {
            let entry = AnchorCount {
                anchor_text: anchor.clone(),
                count: *count,
                percentage: pct(*count),
            };
            if GENERIC_ANCHOR_SET.contains(anchor.as_str()) {
                generic_links += count;
                report.generic_anchor_count += 1;
                if report.generic_anchors.len() < LISTED_ANCHORS {
                    report.generic_anchors.push(entry.clone());
                }
            } else if entry.percentage > config.over_optimized_pct
                && report.over_optimized.len() < LISTED_ANCHORS
            {
                report.over_optimized.push(OverOptimizedAnchor {
                    anchor_text: entry.anchor_text.clone(),
                    count: entry.count,
                    percentage: entry.percentage,
                    severity: if entry.percentage > config.high_severity_pct {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                });
            }
            if report.top_anchors.len() < config.top_anchors {
                report.top_anchors.push(entry);
            }
        }

        report.generic_percentage = pct(generic_links);
        report.average_anchor_length = round1(total_chars as f64 / anchored as f64);
    }

    report.advisories = advise(&report, config);
    debug!(
        "Anchor audit: {} links, {} anchored, {} unique, {} advisories",
        report.total_links,
        anchored,
        report.unique_anchor_texts,
        report.advisories.len()
    );
    report
}

fn advise(report: &AnchorReport, config: &AnchorConfig) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if report.generic_percentage > config.generic_warning_pct {
        advisories.push(Advisory {
            kind: AdvisoryKind::GenericAnchors,
            severity: if report.generic_percentage > HIGH_GENERIC_PCT {
                Severity::High
            } else {
                Severity::Medium
            },
            title: "Too many generic anchor texts".to_string(),
            message: format!(
                "{}% of anchored links use generic text such as 'click here' or 'read more'. Describe the target page instead.",
                report.generic_percentage
            ),
            examples: report
                .generic_anchors
                .iter()
                .take(3)
                .map(|a| a.anchor_text.clone())
                .collect(),
        });
    }

    let high: Vec<&OverOptimizedAnchor> = report
        .over_optimized
        .iter()
        .filter(|a| a.severity == Severity::High)
        .collect();
    if !high.is_empty() {
        advisories.push(Advisory {
            kind: AdvisoryKind::OverOptimization,
            severity: Severity::High,
            title: "Over-optimized anchor texts".to_string(),
            message: format!(
                "{} anchor text(s) account for more than {}% of anchored links. Vary the wording.",
                high.len(),
                config.high_severity_pct
            ),
            examples: high.iter().take(3).map(|a| a.anchor_text.clone()).collect(),
        });
    }

    if report.links_without_anchor_text as f64
        > report.links_with_anchor_text as f64 * EMPTY_ANCHOR_RATIO
    {
        let share = report.links_without_anchor_text as f64 * 100.0 / report.total_links as f64;
        advisories.push(Advisory {
            kind: AdvisoryKind::EmptyAnchors,
            severity: Severity::Medium,
            title: "Many links without anchor text".to_string(),
            message: format!(
                "{} links ({:.1}%) have no anchor text.",
                report.links_without_anchor_text, share
            ),
            examples: Vec::new(),
        });
    }

    if report.links_with_anchor_text > 0
        && report.average_anchor_length < config.short_anchor_chars
    {
        advisories.push(Advisory {
            kind: AdvisoryKind::ShortAnchors,
            severity: Severity::Low,
            title: "Anchor texts are short".to_string(),
            message: format!(
                "Average anchor text length is {} characters. Two to five descriptive words work best.",
                report.average_anchor_length
            ),
            examples: Vec::new(),
        });
    }

    if report.links_with_anchor_text > 0
        && report.generic_percentage < HEALTHY_GENERIC_PCT
        && report.over_optimized.is_empty()
    {
        advisories.push(Advisory {
            kind: AdvisoryKind::Healthy,
            severity: Severity::Success,
            title: "Healthy anchor text distribution".to_string(),
            message: "Anchor texts are varied and descriptive.".to_string(),
            examples: Vec::new(),
        });
    }

    advisories
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
