//! Output module for run reports
//!
//! This module handles:
//! - The report types returned by single and bulk runs
//! - Saving reports as JSON
//! - Rendering bulk reports as Markdown
//! - Printing console summaries

mod json;
mod markdown;
mod report;
pub mod stats;

pub use json::{default_report_name, save_report_json};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{
    AnalysisReport, BulkReport, BulkResultItem, BulkStatus, ConfigEcho, OutputError,
    OutputResult, RunMetadata,
};
pub use stats::{print_analysis_summary, print_bulk_summary, print_run_history};
