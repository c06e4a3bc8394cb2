use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;

    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-concurrent-requests = 8
max-retries = 5
max-url-length = 500
request-timeout = 30

[user-agent]
crawler-name = "TestMirror"
crawler-version = "2.0"

[output]
root = "/tmp/mirrors"

[report]
interval = 250
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_concurrent_requests, 8);
        assert_eq!(config.crawler.max_retries, 5);
        assert_eq!(config.crawler.max_url_length, 500);
        assert_eq!(config.crawler.request_timeout, 30);
        assert_eq!(config.user_agent.header_value(), "TestMirror/2.0");
        assert_eq!(
            config.output.root.as_deref(),
            Some(Path::new("/tmp/mirrors"))
        );
        assert_eq!(config.report.interval, 250);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.crawler.max_concurrent_requests, 20);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.crawler.max_url_length, 1000);
        assert!(config.output.root.is_none());
        assert_eq!(config.report.interval, 1000);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[crawler]\nmax-retries = 0\n").unwrap();

        assert_eq!(config.crawler.max_retries, 0);
        assert_eq!(config.crawler.max_concurrent_requests, 20);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/site-mirror.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nmax-concurrent-requests = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
