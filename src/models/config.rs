//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// How the current semester is resolved
    #[serde(default)]
    pub semester: SemesterConfig,

    /// Catalogue markup selectors and table layout
    #[serde(default)]
    pub parser: ParserConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_departments == 0 {
            return Err(AppError::validation("crawler.max_departments must be > 0"));
        }
        if self.crawler.seed_department.trim().is_empty() {
            return Err(AppError::validation("crawler.seed_department is empty"));
        }
        url::Url::parse(&self.crawler.base_url)?;
        if self.server.shutdown_timeout_secs == 0 {
            return Err(AppError::validation(
                "server.shutdown_timeout_secs must be > 0",
            ));
        }
        self.parser.validate()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "defaults::addr")]
    pub addr: String,

    /// Grace period for in-flight requests on shutdown
    #[serde(default = "defaults::shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Crawl the whole catalogue before serving
    #[serde(default)]
    pub precache: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::addr(),
            shutdown_timeout_secs: defaults::shutdown_timeout(),
            precache: false,
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Catalogue root without the semester segment
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Department the full crawl starts from
    #[serde(default = "defaults::seed_department")]
    pub seed_department: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent page fetches during a full crawl
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Upper bound on departments visited in one full crawl
    #[serde(default = "defaults::max_departments")]
    pub max_departments: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            seed_department: defaults::seed_department(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_departments: defaults::max_departments(),
        }
    }
}

/// Strategy used to find the active semester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemesterStrategy {
    /// Derive from today's date
    #[default]
    Calendar,
    /// Follow the catalogue root redirect
    Redirect,
}

/// Semester resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemesterConfig {
    #[serde(default)]
    pub strategy: SemesterStrategy,
}

/// CSS selectors and column layout of catalogue pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Selector for each course fragment
    #[serde(default = "defaults::course_selector")]
    pub course_selector: String,

    /// Selector for the course heading inside a fragment
    #[serde(default = "defaults::header_selector")]
    pub header_selector: String,

    /// Selector for the rows that start a new section
    #[serde(default = "defaults::section_row_selector")]
    pub section_row_selector: String,

    /// Selector for undergraduate department links
    #[serde(default = "defaults::undergrad_link_selector")]
    pub undergrad_link_selector: String,

    /// Selector for postgraduate department links
    #[serde(default = "defaults::postgrad_link_selector")]
    pub postgrad_link_selector: String,

    /// Cell holding the section label
    #[serde(default)]
    pub section_column: usize,

    /// Cell holding the instructor names
    #[serde(default = "defaults::instructor_column")]
    pub instructor_column: usize,

    /// Cell that, when non-empty, marks a tutorial and holds its staff
    #[serde(default = "defaults::tutorial_column")]
    pub tutorial_column: usize,
}

impl ParserConfig {
    fn validate(&self) -> Result<()> {
        let selectors = [
            ("parser.course_selector", &self.course_selector),
            ("parser.header_selector", &self.header_selector),
            ("parser.section_row_selector", &self.section_row_selector),
            ("parser.undergrad_link_selector", &self.undergrad_link_selector),
            ("parser.postgrad_link_selector", &self.postgrad_link_selector),
        ];
        for (key, value) in selectors {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{key} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            course_selector: defaults::course_selector(),
            header_selector: defaults::header_selector(),
            section_row_selector: defaults::section_row_selector(),
            undergrad_link_selector: defaults::undergrad_link_selector(),
            postgrad_link_selector: defaults::postgrad_link_selector(),
            section_column: 0,
            instructor_column: defaults::instructor_column(),
            tutorial_column: defaults::tutorial_column(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Server defaults
    pub fn addr() -> String {
        "0.0.0.0:8080".into()
    }
    pub fn shutdown_timeout() -> u64 {
        5
    }

    // Crawler defaults
    pub fn base_url() -> String {
        "https://w5.ab.ust.hk/wcq/cgi-bin".into()
    }
    pub fn seed_department() -> String {
        "COMP".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; catalogue/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_departments() -> usize {
        512
    }

    // Parser defaults
    pub fn course_selector() -> String {
        "div.course".into()
    }
    pub fn header_selector() -> String {
        "h2".into()
    }
    pub fn section_row_selector() -> String {
        "tr.newsect".into()
    }
    pub fn undergrad_link_selector() -> String {
        "a.ug".into()
    }
    pub fn postgrad_link_selector() -> String {
        "a.pg".into()
    }
    pub fn instructor_column() -> usize {
        3
    }
    pub fn tutorial_column() -> usize {
        4
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.crawler.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Url(_)));
    }

    #[test]
    fn test_validate_rejects_empty_selector() {
        let mut config = Config::default();
        config.parser.course_selector = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[crawler]
seed_department = "MATH"
max_concurrent = 2

[semester]
strategy = "redirect"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.crawler.seed_department, "MATH");
        assert_eq!(config.crawler.max_concurrent, 2);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.semester.strategy, SemesterStrategy::Redirect);
        assert_eq!(config.parser.instructor_column, 3);
        assert_eq!(config.server.addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_load_or_default_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.crawler.seed_department, "COMP");
    }
}
