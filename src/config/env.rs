//! Environment overrides for the configuration
//!
//! Only the settings that deployments customarily inject through the
//! environment are overridable: proxy endpoint, API credentials and
//! endpoint, and the output directory.

use crate::config::types::Config;
use crate::ConfigError;

pub const ENV_PROXY_HOST: &str = "TOR_SOCKS_HOST";
pub const ENV_PROXY_PORT: &str = "TOR_SOCKS_PORT";
pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_API_BASE_URL: &str = "OPENROUTER_BASE_URL";
pub const ENV_OUTPUT_DIR: &str = "ONION_SIFT_OUTPUT_DIR";

impl Config {
    /// Applies overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup
    ///
    /// Empty values are ignored so that `VAR=` does not wipe a setting.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_PROXY_HOST) {
            self.transport.proxy_host = host;
        }

        if let Some(port) = get(ENV_PROXY_PORT) {
            self.transport.proxy_port = port.trim().parse().map_err(|e| ConfigError::Env {
                name: ENV_PROXY_PORT.to_string(),
                message: format!("'{}' is not a valid port: {}", port, e),
            })?;
        }

        if let Some(key) = get(ENV_API_KEY) {
            self.analysis.api_key = Some(key);
        }

        if let Some(base_url) = get(ENV_API_BASE_URL) {
            self.analysis.base_url = base_url;
        }

        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output.output_dir = dir;
        }

        Ok(())
    }
}
