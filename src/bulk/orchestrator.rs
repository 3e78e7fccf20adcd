//! Sequential driver for single-target and bulk runs
//!
//! Each target goes through the retrieval pipeline and, when that yields
//! content, the analysis dispatcher. Outcomes are merged into report items.

use crate::analysis::{AnalysisDispatcher, AnalysisOutcome};
use crate::bulk::{AnalyzeOptions, BulkOptions};
use crate::config::Config;
use crate::failure::Failure;
use crate::output::{AnalysisReport, BulkReport, BulkResultItem, BulkStatus, ConfigEcho, RunMetadata};
use crate::retrieval::{RetrievalPipeline, RetrievalReport};
use crate::search::Target;
use crate::SiftError;
use chrono::Utc;
use std::time::Duration;

/// Drives single-target and bulk runs
///
/// Targets are processed strictly one after another. A failing target never
/// aborts the run; its failure is recorded in the corresponding result item.
pub struct BulkOrchestrator {
    pipeline: RetrievalPipeline,
    dispatcher: AnalysisDispatcher,
    pacing: Duration,
    proxy: String,
}

impl BulkOrchestrator {
    /// Builds the pipeline and dispatcher from `config`
    pub fn new(config: &Config) -> Result<Self, SiftError> {
        let pipeline = RetrievalPipeline::new(config)?;
        let dispatcher = AnalysisDispatcher::new(&config.analysis)?;
        Ok(Self::with_parts(config, pipeline, dispatcher))
    }

    /// Assembles an orchestrator from prebuilt parts
    pub fn with_parts(
        config: &Config,
        pipeline: RetrievalPipeline,
        dispatcher: AnalysisDispatcher,
    ) -> Self {
        Self {
            pipeline,
            dispatcher,
            pacing: config.bulk.pacing(),
            proxy: format!("{}:{}", config.transport.proxy_host, config.transport.proxy_port),
        }
    }

    fn config_echo(&self, options: &AnalyzeOptions) -> ConfigEcho {
        ConfigEcho {
            config_hash: options.config_hash.clone(),
            depth: options.depth,
            use_structured: options.use_structured,
            model: options
                .model
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.dispatcher.default_model(options.use_structured))
                .to_string(),
            proxy: self.proxy.clone(),
            pacing_secs: self.pacing.as_secs_f64(),
        }
    }

    /// Retrieval followed by analysis; analysis is skipped when retrieval fails
    async fn process(
        &self,
        url: &str,
        options: &AnalyzeOptions,
    ) -> (RetrievalReport, Option<Failure>, Option<AnalysisOutcome>) {
        let retrieval = self.pipeline.retrieve(url, options.depth).await;

        match retrieval.result {
            Ok(content) => {
                let outcome = self
                    .dispatcher
                    .analyze(
                        &content,
                        options.model.as_deref(),
                        options.prompt.as_deref(),
                        options.use_structured,
                    )
                    .await;
                (retrieval.report, None, Some(outcome))
            }
            Err(failure) => {
                tracing::warn!(url, %failure, "Retrieval failed");
                (retrieval.report, Some(failure), None)
            }
        }
    }

    /// Runs a single target through retrieval and analysis
    pub async fn analyze_single(&self, url: &str, options: &AnalyzeOptions) -> AnalysisReport {
        let started_at = Utc::now();
        tracing::info!(url, depth = options.depth, "[bulk] Starting single analysis");

        let (retrieval, failure, analysis) = self.process(url, options).await;
        let metadata = RunMetadata::finish(started_at, self.config_echo(options));

        AnalysisReport::new(url, options.depth, retrieval, failure, analysis, metadata)
    }

    /// Runs every resolvable target of `targets` and aggregates the results
    ///
    /// Targets without a URL are counted in `skipped` and produce no result
    /// item, so `successful_analyses + failed_analyses == resolvable_count`.
    pub async fn run(&self, query: &str, targets: Vec<Target>, options: &BulkOptions) -> BulkReport {
        let started_at = Utc::now();

        let per_target = AnalyzeOptions::from(options);

        let mut targets = targets;
        if let Some(max) = options.max_sites {
            targets.truncate(max);
        }

        let search_results_count = targets.len();
        let (resolvable, unresolvable): (Vec<Target>, Vec<Target>) = targets
            .into_iter()
            .partition(|t| t.resolvable_url().is_some());

        for target in &unresolvable {
            tracing::warn!(name = %target.name, "[bulk] Skipping target without URL");
        }

        let resolvable_count = resolvable.len();
        if resolvable_count > 0 && !self.dispatcher.has_credentials() {
            tracing::warn!("[bulk] No analysis API key configured; retrieved targets will not be analyzed");
        }
        tracing::info!(
            query,
            total = search_results_count,
            resolvable = resolvable_count,
            "[bulk] Starting bulk analysis"
        );

        let mut results = Vec::with_capacity(resolvable_count);
        let mut successful = 0;
        let mut failed = 0;

        for (index, target) in resolvable.into_iter().enumerate() {
            let Some(url) = target.resolvable_url().map(str::to_string) else {
                continue;
            };

            tracing::info!(
                position = index + 1,
                of = resolvable_count,
                url = %url,
                "[bulk] Processing target"
            );

            let (retrieval, failure, analysis) = self.process(&url, &per_target).await;

            let item = BulkResultItem::new(target, retrieval, failure, analysis);
            if item.success {
                successful += 1;
            } else {
                failed += 1;
            }
            results.push(item);

            if index + 1 < resolvable_count && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        let status = BulkStatus::from_counts(successful, failed);
        let error = if search_results_count == 0 {
            Some(format!("No search results for '{}'", query))
        } else if resolvable_count == 0 {
            Some("No search result carried a resolvable URL".to_string())
        } else {
            None
        };

        let metadata = RunMetadata::finish(started_at, self.config_echo(&per_target));

        tracing::info!(
            successful,
            failed,
            skipped = unresolvable.len(),
            status = status.as_str(),
            "[bulk] Bulk analysis finished"
        );

        BulkReport {
            success: status != BulkStatus::Failed,
            status,
            query: query.to_string(),
            search_results_count,
            resolvable_count,
            successful_analyses: successful,
            failed_analyses: failed,
            skipped: unresolvable.len(),
            results,
            metadata,
            error,
        }
    }
}
