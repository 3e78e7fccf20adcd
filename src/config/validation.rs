use crate::config::types::{
    AnalysisConfig, BulkConfig, Config, CrawlerConfig, OutputConfig, SearchConfig,
    TransportConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_transport_config(&config.transport)?;
    validate_crawler_config(&config.crawler)?;
    validate_analysis_config(&config.analysis)?;
    validate_search_config(&config.search)?;
    validate_bulk_config(&config.bulk)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates transport configuration
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.proxy_host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "proxy-host cannot be empty".to_string(),
        ));
    }

    if config.proxy_port == 0 {
        return Err(ConfigError::Validation(
            "proxy-port must be between 1 and 65535".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.fetch_timeout_secs == 0 || config.probe_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs and probe-timeout-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.pause_secs.is_finite() || config.pause_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "pause-secs must be a non-negative number, got {}",
            config.pause_secs
        )));
    }

    if config.crawl_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "crawl-timeout-secs must be > 0".to_string(),
        ));
    }

    let name = &config.result_file_name;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(ConfigError::Validation(format!(
            "result-file-name must be a plain file name, got '{}'",
            name
        )));
    }

    Ok(())
}

/// Validates analysis configuration
fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid analysis base-url: {}", e)))?;

    if config.model.trim().is_empty() || config.structured_model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "model and structured-model cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.max_content_chars == 0 {
        return Err(ConfigError::Validation(
            "max-content-chars must be > 0".to_string(),
        ));
    }

    if config.max_tokens == 0 {
        return Err(ConfigError::Validation("max-tokens must be > 0".to_string()));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search base-url: {}", e)))?;

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "search max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates bulk configuration
fn validate_bulk_config(config: &BulkConfig) -> Result<(), ConfigError> {
    if !config.pacing_secs.is_finite() || config.pacing_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "pacing-secs must be a non-negative number, got {}",
            config.pacing_secs
        )));
    }

    if config.default_max_sites < 1 {
        return Err(ConfigError::Validation(
            "default-max-sites must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_proxy_port() {
        let mut config = Config::default();
        config.transport.proxy_port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_pause() {
        let mut config = Config::default();
        config.crawler.pause_secs = -1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_result_file_name_must_not_escape_folder() {
        let mut config = Config::default();
        config.crawler.result_file_name = "../result.htm".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_analysis_base_url() {
        let mut config = Config::default();
        config.analysis.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = Config::default();
        config.analysis.temperature = 3.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_attempts() {
        let mut config = Config::default();
        config.analysis.max_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_default_max_sites() {
        let mut config = Config::default();
        config.bulk.default_max_sites = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_dir() {
        let mut config = Config::default();
        config.output.output_dir.clear();
        assert!(validate(&config).is_err());
    }
}
