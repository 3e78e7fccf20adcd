//! Onion-Sift main entry point
//!
//! This is the command-line interface for crawling onion services and
//! extracting intelligence from them.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use onion_sift::bulk::{AnalyzeOptions, BulkOptions};
use onion_sift::config::{load_optional_config, Config};
use onion_sift::output::{
    default_report_name, print_analysis_summary, print_bulk_summary, print_run_history,
    save_report_json, write_markdown_report,
};
use onion_sift::retrieval::check_transport;
use onion_sift::search::{RecencyWindow, SearchClient};
use onion_sift::storage::{open_store, ReportStore};
use onion_sift::BulkOrchestrator;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Onion-Sift: crawl onion services and extract intelligence
///
/// Every network request to a target goes through the configured SOCKS
/// proxy. Search queries and analysis requests use the clearnet.
#[derive(Parser, Debug)]
#[command(name = "onion-sift")]
#[command(version)]
#[command(about = "Crawl onion services and extract intelligence", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the SOCKS proxy is listening
    Check,

    /// Query the search index and print the targets found
    Search {
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        max: usize,

        /// Only results seen within this many days
        #[arg(long, value_parser = parse_days)]
        days: Option<RecencyWindow>,
    },

    /// Crawl and analyze a single onion site
    Analyze {
        url: String,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Write the JSON report to this file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Search, then crawl and analyze every result
    Bulk {
        query: String,

        /// Number of search results to analyze
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=20))]
        max_sites: Option<u64>,

        /// Only results seen within this many days
        #[arg(long, value_parser = parse_days)]
        days: Option<RecencyWindow>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Write the JSON report to this file instead of the default name
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Also render the report as Markdown
        #[arg(long, value_name = "FILE")]
        markdown: Option<PathBuf>,
    },

    /// List archived bulk runs
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(clap::Args, Debug)]
struct AnalysisArgs {
    /// Crawl depth
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=3))]
    depth: u32,

    /// Custom analysis instructions
    #[arg(long)]
    prompt: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Use schema-guided structured extraction
    #[arg(long)]
    structured: bool,
}

fn parse_days(s: &str) -> Result<RecencyWindow, String> {
    let days: u32 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    RecencyWindow::from_days(days).ok_or_else(|| "days must be 1, 7 or 30".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let (config, config_hash) =
        load_optional_config(cli.config.as_deref()).context("Failed to load configuration")?;
    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => {
            tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash)
        }
        _ => tracing::info!("Using default configuration"),
    }

    match cli.command {
        Command::Check => handle_check(&config).await,
        Command::Search { query, max, days } => handle_search(&config, &query, max, days).await,
        Command::Analyze {
            url,
            analysis,
            save,
        } => handle_analyze(&config, config_hash, &url, analysis, save.as_deref()).await,
        Command::Bulk {
            query,
            max_sites,
            days,
            analysis,
            save,
            markdown,
        } => {
            let max_sites = max_sites
                .map(|m| m as usize)
                .unwrap_or(config.bulk.default_max_sites);
            handle_bulk(
                &config,
                config_hash,
                &query,
                max_sites,
                days,
                analysis,
                save,
                markdown.as_deref(),
            )
            .await
        }
        Command::History { limit } => handle_history(&config, limit),
    }
}

/// Sets up logging based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("onion_sift=info,warn"),
            1 => EnvFilter::new("onion_sift=debug,info"),
            2 => EnvFilter::new("onion_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn handle_check(config: &Config) -> anyhow::Result<ExitCode> {
    match check_transport(&config.transport).await {
        Ok(()) => {
            println!("Transport reachable at {}", config.transport.proxy_url());
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("{}", failure);
            if let Some(details) = &failure.details {
                eprintln!("  {}", details);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_search(
    config: &Config,
    query: &str,
    max: usize,
    days: Option<RecencyWindow>,
) -> anyhow::Result<ExitCode> {
    let client = SearchClient::new(&config.search, &config.transport.user_agent)?;
    let targets = client.search(query, max, days).await?;

    if targets.is_empty() {
        println!("No results for '{}'", query);
        return Ok(ExitCode::SUCCESS);
    }

    for (i, target) in targets.iter().enumerate() {
        println!("{:>2}. {}", i + 1, target.name);
        println!("    URL:       {}", target.url.as_deref().unwrap_or("-"));
        println!("    Last seen: {}", target.last_seen);
        if !target.description.is_empty() {
            println!("    {}", target.description);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_analyze(
    config: &Config,
    config_hash: Option<String>,
    url: &str,
    args: AnalysisArgs,
    save: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let orchestrator = BulkOrchestrator::new(config)?;
    let options = AnalyzeOptions {
        depth: args.depth,
        model: args.model,
        prompt: args.prompt,
        use_structured: args.structured,
        config_hash,
    };

    let report = orchestrator.analyze_single(url, &options).await;
    print_analysis_summary(&report);

    if let Some(path) = save {
        save_report_json(&report, path)?;
        println!("Report saved to {}", path.display());
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[allow(clippy::too_many_arguments)]
async fn handle_bulk(
    config: &Config,
    config_hash: Option<String>,
    query: &str,
    max_sites: usize,
    days: Option<RecencyWindow>,
    args: AnalysisArgs,
    save: Option<PathBuf>,
    markdown: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let search = SearchClient::new(&config.search, &config.transport.user_agent)?;
    let targets = search.search_with_fallback(query, max_sites, days).await;

    let orchestrator = BulkOrchestrator::new(config)?;
    let options = BulkOptions {
        depth: args.depth,
        max_sites: Some(max_sites),
        model: args.model,
        prompt: args.prompt,
        use_structured: args.structured,
        config_hash,
    };

    let report = orchestrator.run(query, targets, &options).await;
    print_bulk_summary(&report);

    let path = save.unwrap_or_else(|| {
        Path::new(&config.output.output_dir).join(default_report_name(query, Utc::now()))
    });
    save_report_json(&report, &path)?;
    println!("Report saved to {}", path.display());

    if let Some(markdown) = markdown {
        write_markdown_report(&report, markdown)?;
        println!("Markdown report written to {}", markdown.display());
    }

    match open_store(Path::new(&config.output.database_path)) {
        Ok(mut store) => {
            let run_id = store.record_bulk_report(&report)?;
            tracing::info!(run_id, "Bulk run archived");
        }
        Err(e) => tracing::warn!("Could not open report archive: {}", e),
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_history(config: &Config, limit: usize) -> anyhow::Result<ExitCode> {
    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open report archive")?;

    let runs = store.list_runs(limit)?;
    println!(
        "Showing {} of {} archived run(s)\n",
        runs.len(),
        store.count_runs()?
    );
    print_run_history(&runs);

    Ok(ExitCode::SUCCESS)
}
