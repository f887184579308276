// src/error.rs

//! Unified error handling for the catalogue service.

use std::fmt;

use thiserror::Error;

/// Result type alias for catalogue operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A catalogue page could not be fetched
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A course fragment could not be parsed
    #[error("Parse error near '{snippet}': {message}")]
    Parse { snippet: String, message: String },

    /// Input failed validation (e.g. unknown semester season)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client failure outside of a page fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Longest heading excerpt carried by a parse error.
const SNIPPET_LIMIT: usize = 80;

impl AppError {
    /// Create a fetch error for a page URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error, truncating the offending snippet.
    pub fn parse(snippet: &str, message: impl fmt::Display) -> Self {
        let snippet = snippet.trim();
        let snippet = match snippet.char_indices().nth(SNIPPET_LIMIT) {
            Some((idx, _)) => format!("{}...", &snippet[..idx]),
            None => snippet.to_string(),
        };
        Self::Parse {
            snippet,
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
