// Report generation for graph stats, recommendations and anchor audits

use crate::data::ProjectInfo;
use linkweave_engine::anchors::AnchorReport;
use linkweave_engine::model::{GraphExport, GraphStats, PageSummary, RecommendationSet};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";
const MAX_LISTED_PAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "markdown",
        }
    }
}

/// Project details printed at the top of every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub project_id: i64,
    pub project_name: String,
    pub domain: String,
}

impl From<&ProjectInfo> for ReportHeader {
    fn from(project: &ProjectInfo) -> Self {
        Self {
            project_id: project.id,
            project_name: project.name.clone(),
            domain: project.domain.clone(),
        }
    }
}

// ============================================================================
// Graph stats
// ============================================================================

pub fn generate_stats_report(
    stats: &GraphStats,
    header: &ReportHeader,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(stats_text(stats, header)),
        ReportFormat::Markdown => Ok(stats_markdown(stats, header)),
        ReportFormat::Csv => Ok(stats_csv(stats)),
        ReportFormat::Json => json_report("graph_stats", header, serde_json::to_value(stats)?),
    }
}

fn stats_text(stats: &GraphStats, header: &ReportHeader) -> String {
    let mut report = String::new();
    push_banner(&mut report, "LINKWEAVE LINK GRAPH REPORT");
    push_header(&mut report, header);
    report.push_str(&format!(
        "Pages:        {} of {} analyzed\n\n",
        stats.included_count, stats.total_available
    ));

    push_section(&mut report, "SUMMARY");
    report.push_str(&format!("Total Links:           {}\n", stats.total_links));
    report.push_str(&format!(
        "Avg Links per Page:    {:.2}\n",
        stats.avg_links_per_page
    ));
    report.push_str(&format!("Orphan Pages:          {}\n", stats.orphan_count));
    report.push_str(&format!(
        "Without Outgoing:      {}\n",
        stats.pages_without_outgoing
    ));
    report.push_str(&format!(
        "Max Incoming Links:    {}\n",
        stats.max_incoming_links
    ));
    report.push_str(&format!("Rank:                  {}\n", rank_status(stats)));
    if stats.dropped_links.total() > 0 {
        let dropped = &stats.dropped_links;
        report.push_str(&format!(
            "Dropped Links:         {} (unresolved {}, self {}, duplicate {}, nofollow {}, external {})\n",
            dropped.total(),
            dropped.unresolved,
            dropped.self_loops,
            dropped.duplicates,
            dropped.nofollow,
            dropped.external
        ));
    }
    report.push('\n');

    push_page_section(&mut report, "HUB PAGES", &stats.hub_pages, |p| {
        format!("out: {}  rank: {:.4}", p.out_degree, p.rank)
    });
    push_page_section(&mut report, "AUTHORITY PAGES", &stats.authority_pages, |p| {
        format!("rank: {:.4}  in: {}", p.rank, p.in_degree)
    });
    push_page_section(&mut report, "ORPHAN PAGES", &stats.orphan_pages, |p| {
        format!("relevance: {:.1}", p.relevance_score)
    });
    push_page_section(
        &mut report,
        "UNDER-LINKED PAGES",
        &stats.underlinked_pages,
        |p| format!("in: {}  depth: {}", p.in_degree, p.depth),
    );

    push_footer(&mut report);
    report
}

fn push_page_section(
    report: &mut String,
    title: &str,
    pages: &[PageSummary],
    detail: impl Fn(&PageSummary) -> String,
) {
    push_section(report, title);
    if pages.is_empty() {
        report.push_str("  (none)\n\n");
        return;
    }
    for (idx, page) in pages.iter().take(MAX_LISTED_PAGES).enumerate() {
        report.push_str(&format!("{:>3}. {}\n", idx + 1, page.title));
        report.push_str(&format!("     {}  [{}]\n", page.url, detail(page)));
    }
    if pages.len() > MAX_LISTED_PAGES {
        report.push_str(&format!(
            "     ... and {} more\n",
            pages.len() - MAX_LISTED_PAGES
        ));
    }
    report.push('\n');
}

fn rank_status(stats: &GraphStats) -> String {
    if stats.rank_converged {
        format!("converged after {} iterations", stats.rank_iterations)
    } else {
        format!(
            "did not converge within {} iterations (best effort)",
            stats.rank_iterations
        )
    }
}

fn stats_markdown(stats: &GraphStats, header: &ReportHeader) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Link graph: {}\n\n", header.project_name));
    md.push_str(&format!(
        "- **Project:** {} (`{}`)\n- **Domain:** {}\n- **Pages analyzed:** {} of {}\n- **Rank:** {}\n\n",
        header.project_name,
        header.project_id,
        header.domain,
        stats.included_count,
        stats.total_available,
        rank_status(stats)
    ));

    md.push_str("## Summary\n\n| Metric | Value |\n|---|---|\n");
    md.push_str(&format!("| Total links | {} |\n", stats.total_links));
    md.push_str(&format!(
        "| Avg links per page | {:.2} |\n",
        stats.avg_links_per_page
    ));
    md.push_str(&format!("| Orphan pages | {} |\n", stats.orphan_count));
    md.push_str(&format!(
        "| Pages without outgoing links | {} |\n",
        stats.pages_without_outgoing
    ));
    md.push_str(&format!(
        "| Max incoming links | {} |\n",
        stats.max_incoming_links
    ));
    md.push_str(&format!(
        "| Dropped links | {} |\n\n",
        stats.dropped_links.total()
    ));

    for (title, pages) in [
        ("Hub pages", &stats.hub_pages),
        ("Authority pages", &stats.authority_pages),
        ("Orphan pages", &stats.orphan_pages),
        ("Under-linked pages", &stats.underlinked_pages),
    ] {
        md.push_str(&format!("## {}\n\n", title));
        if pages.is_empty() {
            md.push_str("_None._\n\n");
            continue;
        }
        md.push_str("| # | Page | Rank | In | Out |\n|---|---|---|---|---|\n");
        for (idx, page) in pages.iter().take(MAX_LISTED_PAGES).enumerate() {
            md.push_str(&format!(
                "| {} | [{}]({}) | {:.4} | {} | {} |\n",
                idx + 1,
                markdown_escape(&page.title),
                page.url,
                page.rank,
                page.in_degree,
                page.out_degree
            ));
        }
        md.push('\n');
    }

    md
}

fn stats_csv(stats: &GraphStats) -> String {
    let mut csv = String::from("category,page_id,url,title,rank,in_degree,out_degree,relevance_score\n");
    for (category, pages) in [
        ("hub", &stats.hub_pages),
        ("authority", &stats.authority_pages),
        ("orphan", &stats.orphan_pages),
        ("underlinked", &stats.underlinked_pages),
    ] {
        for page in pages {
            csv.push_str(&format!(
                "{},{},{},{},{:.6},{},{},{}\n",
                category,
                page.page_id,
                csv_field(&page.url),
                csv_field(&page.title),
                page.rank,
                page.in_degree,
                page.out_degree,
                page.relevance_score
            ));
        }
    }
    csv
}

// ============================================================================
// Recommendations
// ============================================================================

pub fn generate_recommendations_report(
    set: &RecommendationSet,
    header: &ReportHeader,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(recommendations_text(set, header)),
        ReportFormat::Markdown => Ok(recommendations_markdown(set, header)),
        ReportFormat::Csv => Ok(recommendations_csv(set)),
        ReportFormat::Json => json_report("recommendations", header, serde_json::to_value(set)?),
    }
}

fn recommendations_text(set: &RecommendationSet, header: &ReportHeader) -> String {
    let mut report = String::new();
    push_banner(&mut report, "LINKWEAVE LINK RECOMMENDATIONS");
    push_header(&mut report, header);
    report.push_str(&format!("Mode:         {}\n", set.mode.as_str()));
    report.push_str(&format!(
        "Sources:      {} scanned, {} skipped\n",
        set.sources_scanned, set.sources_skipped
    ));
    report.push_str(&format!(
        "Candidates:   {}\n",
        set.candidates_considered
    ));
    if set.skipped_pages > 0 {
        report.push_str(&format!(
            "Unreadable:   {} pages skipped\n",
            set.skipped_pages
        ));
    }
    report.push('\n');

    push_section(&mut report, "RECOMMENDATIONS");
    if set.recommendations.is_empty() {
        report.push_str("  No new internal links to suggest.\n\n");
    }
    for (idx, rec) in set.recommendations.iter().enumerate() {
        report.push_str(&format!("[{}] Link to: {}\n", idx + 1, rec.target_title));
        report.push_str(&format!("Score:        {:.3}\n", rec.score));
        report.push_str(&format!("Keyword:      {}\n", rec.keyword));
        if let Some(source) = &rec.source_url {
            report.push_str(&format!("From:         {}\n", source));
        }
        report.push_str(&format!("To:           {}\n", rec.target_url));
        report.push_str("\nReason:\n");
        report.push_str(&wrap_text(&rec.reason, 80, "  "));
        if let Some(context) = &rec.context {
            report.push_str("\nContext:\n");
            report.push_str(&wrap_text(context, 80, "  "));
        }
        report.push('\n');
        report.push_str(LIGHT_RULE);
        report.push('\n');
    }

    push_footer(&mut report);
    report
}

fn recommendations_markdown(set: &RecommendationSet, header: &ReportHeader) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Link recommendations: {}\n\n", header.project_name));
    md.push_str(&format!(
        "- **Mode:** {}\n- **Sources scanned:** {}\n- **Candidates:** {}\n\n",
        set.mode.as_str(),
        set.sources_scanned,
        set.candidates_considered
    ));
    if set.recommendations.is_empty() {
        md.push_str("_No new internal links to suggest._\n");
        return md;
    }

    md.push_str("| # | From | To | Keyword | Score |\n|---|---|---|---|---|\n");
    for (idx, rec) in set.recommendations.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | [{}]({}) | {} | {:.3} |\n",
            idx + 1,
            rec.source_url.as_deref().unwrap_or("-"),
            markdown_escape(&rec.target_title),
            rec.target_url,
            markdown_escape(&rec.keyword),
            rec.score
        ));
    }
    md
}

fn recommendations_csv(set: &RecommendationSet) -> String {
    let mut csv =
        String::from("source_page_id,source_url,target_page_id,target_url,keyword,score,reason\n");
    for rec in &set.recommendations {
        csv.push_str(&format!(
            "{},{},{},{},{},{:.6},{}\n",
            rec.source_page_id.map(|id| id.to_string()).unwrap_or_default(),
            csv_field(rec.source_url.as_deref().unwrap_or("")),
            rec.target_page_id,
            csv_field(&rec.target_url),
            csv_field(&rec.keyword),
            rec.score,
            csv_field(&rec.reason)
        ));
    }
    csv
}

// ============================================================================
// Anchor audit
// ============================================================================

pub fn generate_anchor_report(
    report: &AnchorReport,
    header: &ReportHeader,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(anchors_text(report, header)),
        ReportFormat::Markdown => Ok(anchors_markdown(report, header)),
        ReportFormat::Csv => Ok(anchors_csv(report)),
        ReportFormat::Json => json_report("anchor_audit", header, serde_json::to_value(report)?),
    }
}

fn anchors_text(audit: &AnchorReport, header: &ReportHeader) -> String {
    let mut report = String::new();
    push_banner(&mut report, "LINKWEAVE ANCHOR TEXT AUDIT");
    push_header(&mut report, header);
    report.push_str(&format!(
        "Pages:        {} of {} analyzed\n\n",
        audit.included_count, audit.total_available
    ));

    push_section(&mut report, "SUMMARY");
    report.push_str(&format!("Internal Links:        {}\n", audit.total_links));
    report.push_str(&format!(
        "With Anchor Text:      {}\n",
        audit.links_with_anchor_text
    ));
    report.push_str(&format!(
        "Without Anchor Text:   {}\n",
        audit.links_without_anchor_text
    ));
    report.push_str(&format!(
        "Unique Anchors:        {}\n",
        audit.unique_anchor_texts
    ));
    report.push_str(&format!(
        "Generic Anchors:       {}%\n",
        audit.generic_percentage
    ));
    report.push_str(&format!(
        "Avg Anchor Length:     {} chars\n\n",
        audit.average_anchor_length
    ));

    push_section(&mut report, "TOP ANCHORS");
    if audit.top_anchors.is_empty() {
        report.push_str("  (none)\n");
    }
    for anchor in &audit.top_anchors {
        report.push_str(&format!(
            "  {:>5}  {:>6.2}%  {}\n",
            anchor.count, anchor.percentage, anchor.anchor_text
        ));
    }
    report.push('\n');

    if !audit.over_optimized.is_empty() {
        push_section(&mut report, "OVER-OPTIMIZED ANCHORS");
        for anchor in &audit.over_optimized {
            report.push_str(&format!(
                "  [{}] {} ({} links, {}%)\n",
                anchor.severity.as_str().to_uppercase(),
                anchor.anchor_text,
                anchor.count,
                anchor.percentage
            ));
        }
        report.push('\n');
    }

    push_section(&mut report, "ADVICE");
    if audit.advisories.is_empty() {
        report.push_str("  No internal links with anchors to assess.\n");
    }
    for advisory in &audit.advisories {
        report.push_str(&format!(
            "[{}] {}\n",
            advisory.severity.as_str().to_uppercase(),
            advisory.title
        ));
        report.push_str(&wrap_text(&advisory.message, 80, "  "));
        if !advisory.examples.is_empty() {
            report.push_str(&format!("  e.g. {}\n", advisory.examples.join(", ")));
        }
        report.push('\n');
    }

    push_footer(&mut report);
    report
}

fn anchors_markdown(audit: &AnchorReport, header: &ReportHeader) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Anchor text audit: {}\n\n", header.project_name));
    md.push_str(&format!(
        "- **Internal links:** {}\n- **With anchor text:** {}\n- **Generic anchors:** {}%\n- **Average length:** {} chars\n\n",
        audit.total_links,
        audit.links_with_anchor_text,
        audit.generic_percentage,
        audit.average_anchor_length
    ));

    md.push_str("## Top anchors\n\n| Anchor | Count | Share |\n|---|---|---|\n");
    for anchor in &audit.top_anchors {
        md.push_str(&format!(
            "| {} | {} | {}% |\n",
            markdown_escape(&anchor.anchor_text),
            anchor.count,
            anchor.percentage
        ));
    }
    md.push('\n');

    md.push_str("## Advice\n\n");
    for advisory in &audit.advisories {
        md.push_str(&format!(
            "- **{}** ({}): {}\n",
            advisory.title,
            advisory.severity.as_str(),
            advisory.message
        ));
    }
    md
}

fn anchors_csv(audit: &AnchorReport) -> String {
    let mut csv = String::from("anchor_text,count,percentage,generic\n");
    for anchor in &audit.top_anchors {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&anchor.anchor_text),
            anchor.count,
            anchor.percentage,
            linkweave_engine::anchors::is_generic_anchor(&anchor.anchor_text)
        ));
    }
    csv
}

// ============================================================================
// Graph export
// ============================================================================

/// Serialize a graph export. CSV carries the edge list only.
pub fn generate_export(
    export: &GraphExport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Csv => {
            let mut csv = String::from("source,target,anchor_text,rel\n");
            for edge in &export.edges {
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    edge.source,
                    edge.target,
                    csv_field(edge.anchor_text.as_deref().unwrap_or("")),
                    csv_field(edge.relation.as_deref().unwrap_or(""))
                ));
            }
            Ok(csv)
        }
        _ => serde_json::to_string_pretty(export),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper functions

fn json_report(
    kind: &str,
    header: &ReportHeader,
    body: serde_json::Value,
) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "linkweave",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "kind": kind
            },
            "project": header,
            "data": body
        }
    });

    serde_json::to_string_pretty(&json_report)
}

fn push_banner(report: &mut String, title: &str) {
    report.push_str(HEAVY_RULE);
    report.push_str(&format!("{:^80}\n", title));
    report.push_str(HEAVY_RULE);
    report.push('\n');
}

fn push_header(report: &mut String, header: &ReportHeader) {
    report.push_str(&format!(
        "Project:      {} (id {})\n",
        header.project_name, header.project_id
    ));
    report.push_str(&format!("Domain:       {}\n", header.domain));
    report.push_str(&format!(
        "Generated:    {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
}

fn push_section(report: &mut String, title: &str) {
    report.push_str(HEAVY_RULE);
    report.push_str(title);
    report.push('\n');
    report.push_str(HEAVY_RULE);
    report.push('\n');
}

fn push_footer(report: &mut String) {
    report.push_str(HEAVY_RULE);
    report.push_str(&format!("{:^80}\n", "End of Report"));
    report.push_str(HEAVY_RULE);
    report.push_str("\nGenerated by linkweave\n\n");
}

pub fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();
    let available = width.saturating_sub(indent.len());

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > available {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn markdown_escape(value: &str) -> String {
    value.replace('|', "\\|")
}
