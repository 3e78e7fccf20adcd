//! Console summaries of finished runs

use crate::analysis::AnalysisOutcome;
use crate::output::report::{AnalysisReport, BulkReport};
use crate::storage::StoredRun;

/// Prints a bulk report summary to stdout
pub fn print_bulk_summary(report: &BulkReport) {
    println!("=== Bulk Analysis: {} ===\n", report.query);

    println!("Overview:");
    println!("  Status: {}", report.status.as_str());
    println!("  Search results: {}", report.search_results_count);
    println!("  With address: {}", report.resolvable_count);
    println!("  Skipped: {}", report.skipped);
    println!("  Successful: {}", report.successful_analyses);
    println!("  Failed: {}", report.failed_analyses);
    println!("  Tokens used: {}", report.total_tokens());
    println!("  Duration: {:.1}s", report.metadata.elapsed_secs);
    println!();

    if !report.results.is_empty() {
        println!("Targets:");
        for item in &report.results {
            let url = item.target.resolvable_url().unwrap_or("-");
            match (&item.error, &item.category) {
                (None, _) => println!("  [ok] {} ({})", item.target.name, url),
                (Some(error), Some(category)) => {
                    println!("  [{}] {} ({}): {}", category, item.target.name, url, error)
                }
                (Some(error), None) => println!("  [failed] {} ({}): {}", item.target.name, url, error),
            }
        }
        println!();
    }

    if let Some(error) = &report.error {
        println!("Error: {}", error);
    }

    println!(
        "Success Rate: {:.1}% ({} / {} targets analyzed)",
        report.success_rate(),
        report.successful_analyses,
        report.resolvable_count
    );
}

/// Prints a single-target report summary to stdout
pub fn print_analysis_summary(report: &AnalysisReport) {
    println!("=== Analysis: {} ===\n", report.url);
    println!("  Depth: {}", report.depth);
    println!("  Pages discovered: {}", report.retrieval.crawl_urls.len());
    if report.retrieval.text_chars > 0 {
        println!("  Visible text: {} chars", report.retrieval.text_chars);
    }
    if let Some(probe) = &report.retrieval.probe {
        println!("  Probe: HTTP {} in {} ms", probe.status_code, probe.latency_ms);
    }
    if let Some(warning) = &report.retrieval.connectivity_warning {
        println!("  Warning: {}", warning);
    }

    match &report.analysis {
        Some(AnalysisOutcome::Success {
            model,
            tokens_used,
            method,
            fallback_used,
            attempts,
            ..
        }) => {
            println!("  Model: {} ({:?}{})", model, method, if *fallback_used { ", fallback" } else { "" });
            println!("  Tokens used: {}", tokens_used);
            println!("  Attempts: {}", attempts);
        }
        Some(AnalysisOutcome::Failure { attempts, .. }) => println!("  Attempts: {}", attempts),
        None => {}
    }

    println!();
    match (&report.error, &report.category) {
        (None, _) => println!("Result: success"),
        (Some(error), Some(category)) => println!("Result: failed [{}] {}", category, error),
        (Some(error), None) => println!("Result: failed {}", error),
    }
    if let Some(details) = &report.details {
        println!("Details: {}", details);
    }
}

/// Prints archived bulk runs as a table
pub fn print_run_history(runs: &[StoredRun]) {
    if runs.is_empty() {
        println!("No archived bulk runs");
        return;
    }

    println!(
        "{:>5}  {:<25}  {:<14}  {:>4}  {:>4}  {:>4}  query",
        "id", "started", "status", "ok", "fail", "skip"
    );
    for run in runs {
        println!(
            "{:>5}  {:<25}  {:<14}  {:>4}  {:>4}  {:>4}  {}",
            run.id,
            run.started_at,
            run.status,
            run.successful,
            run.failed,
            run.skipped,
            run.query
        );
    }
}
