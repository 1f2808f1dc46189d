use crate::config::types::{Config, CrawlConfig, SiteConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on concurrent fetch loops
pub const MAX_FETCH_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawl_config(&config.crawl)?;
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_start_page(config)?;
    Ok(())
}

/// Validates crawl run parameters
fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    // fetch_budget of zero is a legal, empty crawl

    if config.fetch_workers < 1 || config.fetch_workers > MAX_FETCH_WORKERS {
        return Err(ConfigError::Validation(format!(
            "fetch_workers must be between 1 and {}, got {}",
            MAX_FETCH_WORKERS, config.fetch_workers
        )));
    }

    if !config
        .language
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "language must contain only alphanumeric characters and hyphens, got '{}'",
            config.language
        )));
    }

    Ok(())
}

/// Validates the wiki site layout
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    if config.scheme != "http" && config.scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "scheme must be 'http' or 'https', got '{}'",
            config.scheme
        )));
    }

    validate_host(&config.scheme, &config.host)?;

    if !config.content_prefix.starts_with('/') || !config.content_prefix.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "content_prefix must start and end with '/', got '{}'",
            config.content_prefix
        )));
    }

    for label in &config.excluded_namespaces {
        if label.is_empty() || label.contains(':') || label.contains('/') {
            return Err(ConfigError::Validation(format!(
                "excluded namespace '{}' must be non-empty and contain no ':' or '/'",
                label
            )));
        }
    }

    if config.body_start_marker.is_empty() || config.body_end_marker.is_empty() {
        return Err(ConfigError::Validation(
            "body markers cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that the host is a bare authority (host plus optional port)
fn validate_host(scheme: &str, host: &str) -> ConfigResult<()> {
    if host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    let url = Url::parse(&format!("{}://{}", scheme, host))
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid host '{}': {}", host, e)))?;

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "host '{}' must not contain a path, query or fragment",
            host
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates that the start page resolves to a fetchable URL
fn validate_start_page(config: &Config) -> ConfigResult<()> {
    let start = &config.crawl.start_page;
    let is_absolute = start.starts_with("http://") || start.starts_with("https://");

    if !is_absolute && !start.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "start_page must be a path starting with '/' or an absolute URL, got '{}'",
            start
        )));
    }

    Url::parse(&config.seed_url()).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start page '{}': {}", start, e))
    })?;

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
