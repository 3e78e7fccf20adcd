//! Markdown rendering of bulk reports
//!
//! A human-readable companion to the JSON report: run information, overall
//! counters, a per-target table and the failure breakdown.

use crate::analysis::{AnalysisOutcome, AnalysisPayload};
use crate::output::report::{BulkReport, OutputResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the Markdown rendering of `report` to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to write it
pub fn write_markdown_report(report: &BulkReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a bulk report as Markdown
pub fn format_markdown_report(report: &BulkReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Onion-Sift Bulk Analysis: {}\n\n", report.query));

    // Run metadata
    let meta = &report.metadata;
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", meta.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", meta.finished_at.to_rfc3339()));
    md.push_str(&format!("- **Duration**: {:.1} seconds\n", meta.elapsed_secs));
    md.push_str(&format!("- **Status**: {}\n", report.status.as_str()));
    md.push_str(&format!("- **Crawl Depth**: {}\n", meta.config.depth));
    md.push_str(&format!("- **Model**: {}\n", meta.config.model));
    if let Some(hash) = &meta.config.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    if let Some(error) = &report.error {
        md.push_str(&format!("> **Error**: {}\n\n", error));
    }

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Search Results**: {}\n", report.search_results_count));
    md.push_str(&format!("- **With Address**: {}\n", report.resolvable_count));
    md.push_str(&format!("- **Skipped**: {}\n", report.skipped));
    md.push_str(&format!("- **Successful**: {}\n", report.successful_analyses));
    md.push_str(&format!("- **Failed**: {}\n", report.failed_analyses));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", report.success_rate()));
    md.push_str(&format!("- **Tokens Used**: {}\n\n", report.total_tokens()));

    // Per-target table
    if !report.results.is_empty() {
        md.push_str("## Targets\n\n");
        md.push_str("| # | Name | Address | Result | Pages |\n");
        md.push_str("|---|------|---------|--------|-------|\n");

        for (i, item) in report.results.iter().enumerate() {
            let result = if item.success {
                "ok".to_string()
            } else {
                item.category
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_else(|| "failed".to_string())
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                escape_cell(&item.target.name),
                item.target.resolvable_url().unwrap_or("-"),
                result,
                item.retrieval.crawl_urls.len()
            ));
        }
        md.push('\n');
    }

    // Summaries of successful analyses
    let summaries: Vec<_> = report
        .results
        .iter()
        .filter_map(|item| summary_line(item.analysis.as_ref()).map(|s| (item, s)))
        .collect();
    if !summaries.is_empty() {
        md.push_str("## Summaries\n\n");
        for (item, summary) in summaries {
            md.push_str(&format!("### {}\n\n{}\n\n", item.target.name, summary));
        }
    }

    // Failure breakdown
    let mut failures: BTreeMap<&str, u64> = BTreeMap::new();
    for item in report.results.iter().filter(|i| !i.success) {
        let key = item.category.map(|c| c.as_str()).unwrap_or("unknown");
        *failures.entry(key).or_insert(0) += 1;
    }
    if !failures.is_empty() {
        md.push_str("## Failure Summary\n\n");
        md.push_str("| Category | Count |\n");
        md.push_str("|----------|-------|\n");
        for (category, count) in failures {
            md.push_str(&format!("| {} | {} |\n", category, count));
        }
        md.push('\n');
    }

    md
}

/// First line worth showing from a successful analysis
fn summary_line(outcome: Option<&AnalysisOutcome>) -> Option<String> {
    match outcome?.payload()? {
        AnalysisPayload::Structured(value) => value
            .get("content_summary")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        AnalysisPayload::Text(text) => text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| l.to_string()),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
