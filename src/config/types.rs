use serde::Deserialize;

/// Default page the crawl starts from
pub const DEFAULT_START_PAGE: &str = "/wiki/Special:Random";

/// Default language subdomain
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default number of fetch attempts per crawl
pub const DEFAULT_FETCH_BUDGET: usize = 500;

/// Namespaces whose pages are never followed
pub const DEFAULT_EXCLUDED_NAMESPACES: [&str; 6] =
    ["File", "Special", "Wikipedia", "Template", "Talk", "Help"];

/// Main configuration structure for Wiki-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Parameters of a single crawl run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Path (or absolute URL) of the first page to fetch
    #[serde(rename = "start-page")]
    pub start_page: String,

    /// Language subdomain prepended to the host; empty addresses the host directly
    pub language: String,

    /// Total number of fetch attempts, successful or not
    #[serde(rename = "fetch-budget")]
    pub fetch_budget: usize,

    /// Number of concurrent fetch loops sharing the budget
    #[serde(rename = "fetch-workers")]
    pub fetch_workers: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: DEFAULT_START_PAGE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            fetch_budget: DEFAULT_FETCH_BUDGET,
            fetch_workers: 1,
        }
    }
}

/// Layout of the wiki being crawled
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// URL scheme, `http` or `https`
    pub scheme: String,

    /// Host (optionally with port) below the language subdomain
    pub host: String,

    /// Path prefix of in-wiki content pages
    #[serde(rename = "content-prefix")]
    pub content_prefix: String,

    /// Namespace labels whose pages are not followed
    #[serde(rename = "excluded-namespaces")]
    pub excluded_namespaces: Vec<String>,

    /// Line marker opening the article body
    #[serde(rename = "body-start-marker")]
    pub body_start_marker: String,

    /// Line marker closing the article body
    #[serde(rename = "body-end-marker")]
    pub body_end_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "wikipedia.org".to_string(),
            content_prefix: "/wiki/".to_string(),
            excluded_namespaces: DEFAULT_EXCLUDED_NAMESPACES
                .iter()
                .map(|label| label.to_string())
                .collect(),
            body_start_marker: "<!-- bodyContent -->".to_string(),
            body_end_marker: "<!-- /bodyContent -->".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "WikiRipple".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/wiki-ripple".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Config {
    /// Base URL every wiki path is appended to
    ///
    /// `scheme://language.host`, or `scheme://host` when no language is set.
    pub fn base_url(&self) -> String {
        if self.crawl.language.is_empty() {
            format!("{}://{}", self.site.scheme, self.site.host)
        } else {
            format!(
                "{}://{}.{}",
                self.site.scheme, self.crawl.language, self.site.host
            )
        }
    }

    /// Builds the absolute fetch target for a wiki path
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Absolute URL of the start page
    pub fn seed_url(&self) -> String {
        let start = &self.crawl.start_page;
        if start.starts_with("http://") || start.starts_with("https://") {
            start.clone()
        } else {
            self.page_url(start)
        }
    }

    /// Wiki path of the start page, if it lives under the content prefix
    pub fn seed_path(&self) -> Option<String> {
        let start = &self.crawl.start_page;
        let path = match start.strip_prefix(&self.base_url()) {
            Some(rest) => rest,
            None => start.as_str(),
        };
        path.starts_with(&self.site.content_prefix)
            .then(|| path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.crawl.start_page, "/wiki/Special:Random");
        assert_eq!(config.crawl.language, "en");
        assert_eq!(config.crawl.fetch_budget, 500);
        assert_eq!(config.crawl.fetch_workers, 1);
        assert_eq!(config.site.excluded_namespaces.len(), 6);
    }

    #[test]
    fn test_page_url_with_language() {
        let config = Config::default();
        assert_eq!(
            config.page_url("/wiki/Rust"),
            "https://en.wikipedia.org/wiki/Rust"
        );
    }

    #[test]
    fn test_page_url_without_language() {
        let mut config = Config::default();
        config.crawl.language = String::new();
        config.site.scheme = "http".to_string();
        config.site.host = "127.0.0.1:8080".to_string();
        assert_eq!(config.page_url("/wiki/Rust"), "http://127.0.0.1:8080/wiki/Rust");
    }

    #[test]
    fn test_seed_url_absolute_start_page() {
        let mut config = Config::default();
        config.crawl.start_page = "https://de.wikipedia.org/wiki/Berlin".to_string();
        assert_eq!(config.seed_url(), "https://de.wikipedia.org/wiki/Berlin");
    }

    #[test]
    fn test_seed_path() {
        let mut config = Config::default();
        config.crawl.start_page = "/wiki/Rust".to_string();
        assert_eq!(config.seed_path(), Some("/wiki/Rust".to_string()));

        config.crawl.start_page = "https://en.wikipedia.org/wiki/Go".to_string();
        assert_eq!(config.seed_path(), Some("/wiki/Go".to_string()));

        config.crawl.start_page = "https://elsewhere.org/index.html".to_string();
        assert_eq!(config.seed_path(), None);
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        assert_eq!(
            ua.header_value(),
            "TestBot/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[crawl]
fetch-budget = 10
"#,
        )
        .unwrap();
        assert_eq!(config.crawl.fetch_budget, 10);
        assert_eq!(config.crawl.language, "en");
        assert_eq!(config.site.content_prefix, "/wiki/");
        assert_eq!(config.user_agent.crawler_name, "WikiRipple");
    }
}
