use crate::output::report::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes any report as pretty-printed JSON, creating parent directories
pub fn save_report_json<T: Serialize>(report: &T, path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(report)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    tracing::info!(path = %path.display(), "Report saved");
    Ok(())
}

/// Default file name of a saved bulk report
///
/// Characters outside `[A-Za-z0-9_-]` in the query become `_`.
pub fn default_report_name(query: &str, at: DateTime<Utc>) -> String {
    let slug: String = query
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    format!(
        "ahmia_bulk_analysis_{}_{}.json",
        slug,
        at.format("%Y%m%d_%H%M%S")
    )
}
