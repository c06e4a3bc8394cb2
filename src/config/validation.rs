use crate::config::types::{Config, CrawlerConfig, ReportConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound on the request scheduler capacity
const MAX_CONCURRENT_REQUESTS: u32 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_report_config(&config.report)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1
        || config.max_concurrent_requests > MAX_CONCURRENT_REQUESTS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and {}, got {}",
            MAX_CONCURRENT_REQUESTS, config.max_concurrent_requests
        )));
    }

    if config.max_url_length == 0 {
        return Err(ConfigError::Validation(
            "max_url_length must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if config.crawler_name.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "crawler_name must not contain whitespace, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

fn validate_report_config(config: &ReportConfig) -> Result<(), ConfigError> {
    if config.interval == 0 {
        return Err(ConfigError::Validation(
            "report interval must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}
