//! Bulk orchestration
//!
//! Runs a list of search results through the retrieval pipeline and the
//! analysis dispatcher, one target at a time, and aggregates the outcomes
//! into a [`BulkReport`](crate::output::BulkReport).

mod orchestrator;

pub use orchestrator::BulkOrchestrator;

/// Settings shared by every target of a bulk run
#[derive(Debug, Clone, Default)]
pub struct BulkOptions {
    /// Crawl depth per target
    pub depth: u32,

    /// Upper bound on the number of targets taken from the list
    pub max_sites: Option<usize>,

    /// Model override; the dispatcher default is used when `None`
    pub model: Option<String>,

    /// Custom analysis instructions
    pub prompt: Option<String>,

    pub use_structured: bool,

    /// Hash of the configuration file, echoed into the report
    pub config_hash: Option<String>,
}

/// Settings of a single-target run
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub depth: u32,
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub use_structured: bool,
    pub config_hash: Option<String>,
}

impl From<&BulkOptions> for AnalyzeOptions {
    fn from(options: &BulkOptions) -> Self {
        Self {
            depth: options.depth,
            model: options.model.clone(),
            prompt: options.prompt.clone(),
            use_structured: options.use_structured,
            config_hash: options.config_hash.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_options_carry_over_per_target() {
        let bulk = BulkOptions {
            depth: 2,
            max_sites: Some(5),
            model: Some("custom/model".into()),
            prompt: Some("List vendors".into()),
            use_structured: true,
            config_hash: Some("abc".into()),
        };
        let single = AnalyzeOptions::from(&bulk);

        assert_eq!(single.depth, 2);
        assert_eq!(single.model.as_deref(), Some("custom/model"));
        assert_eq!(single.prompt.as_deref(), Some("List vendors"));
        assert!(single.use_structured);
        assert_eq!(single.config_hash.as_deref(), Some("abc"));
    }
}
