use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Onion-Sift
///
/// Every section has documented defaults, so an empty TOML file (or no file
/// at all) yields a usable configuration. Values are then overridden from
/// the environment by [`Config::apply_env`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transport: TransportConfig,
    pub crawler: CrawlerConfig,
    pub analysis: AnalysisConfig,
    pub search: SearchConfig,
    pub bulk: BulkConfig,
    pub output: OutputConfig,
}

/// Anonymizing transport (SOCKS proxy) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportConfig {
    /// SOCKS proxy host
    pub proxy_host: String,

    /// SOCKS proxy port
    pub proxy_port: u16,

    /// Timeout of the raw preflight connect (milliseconds)
    pub connect_timeout_ms: u64,

    /// Timeout of the reachability probe (seconds)
    pub probe_timeout_secs: u64,

    /// Per-request timeout for page fetches (seconds)
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent with every fetch
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 9050,
            connect_timeout_ms: 1500,
            probe_timeout_secs: 40,
            fetch_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
        }
    }
}

impl TransportConfig {
    /// Returns the proxy URL used by the HTTP client (remote DNS resolution)
    pub fn proxy_url(&self) -> String {
        format!("socks5h://{}:{}", self.proxy_host, self.proxy_port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Delay between two fetches of the same crawl level (seconds)
    pub pause_secs: f64,

    /// Wall-clock budget for one whole crawl, terminal fetch included (seconds)
    pub crawl_timeout_secs: u64,

    /// Whether the per-domain crawler.log is written
    pub write_logs: bool,

    /// File name of the persisted terminal page inside the domain folder
    pub result_file_name: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pause_secs: 1.0,
            crawl_timeout_secs: 180,
            write_logs: true,
            result_file_name: "result.htm".to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_secs_f64(self.pause_secs.max(0.0))
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }
}

/// Chat-completion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,

    /// Bearer token; usually supplied through `OPENROUTER_API_KEY`
    pub api_key: Option<String>,

    /// Model used by direct completion when no hint is given
    pub model: String,

    /// Model used by schema-constrained extraction when no hint is given
    pub structured_model: String,

    pub temperature: f32,

    /// Maximum output tokens requested from the model
    pub max_tokens: u32,

    /// Content is truncated to this many characters before submission
    pub max_content_chars: usize,

    /// Timeout of one completion request (seconds)
    pub request_timeout_secs: u64,

    /// Total attempts for direct completion on transient errors
    pub max_attempts: u32,

    /// First backoff delay; doubles on every further attempt (milliseconds)
    pub backoff_base_ms: u64,

    /// Optional `HTTP-Referer` header
    pub referer: Option<String>,

    /// Optional `X-Title` header
    pub app_title: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            model: "deepseek/deepseek-r1:free".to_string(),
            structured_model: "deepseek/deepseek-r1-0528:free".to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            max_content_chars: 4000,
            request_timeout_secs: 90,
            max_attempts: 3,
            backoff_base_ms: 1000,
            referer: None,
            app_title: Some("onion-sift".to_string()),
        }
    }
}

impl AnalysisConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Onion search index configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Base URL of the search index (clearnet)
    pub base_url: String,

    /// Attempts before falling back to placeholder targets
    pub max_attempts: u32,

    /// Timeout of the first attempt; doubles per attempt (seconds)
    pub base_timeout_secs: u64,

    /// Wait before the second attempt; doubles per attempt (milliseconds)
    pub retry_wait_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ahmia.fi".to_string(),
            max_attempts: 3,
            base_timeout_secs: 15,
            retry_wait_ms: 1000,
        }
    }
}

/// Bulk run configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BulkConfig {
    /// Pause between two targets (seconds)
    pub pacing_secs: f64,

    /// Number of search results analyzed when the caller gives no limit
    pub default_max_sites: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            pacing_secs: 2.0,
            default_max_sites: 5,
        }
    }
}

impl BulkConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_secs_f64(self.pacing_secs.max(0.0))
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory of the per-domain side outputs
    pub output_dir: String,

    /// Path to the SQLite report archive
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            database_path: "onion-sift.db".to_string(),
        }
    }
}
