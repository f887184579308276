// src/services/semester.rs

//! Semester resolution strategies.
//!
//! - `CalendarResolver`: derives the active code from today's date
//! - `RedirectResolver`: asks the catalogue, which redirects its root to the
//!   active semester

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Semester, SemesterStrategy, code_for_date};

/// Resolves the semester the catalogue currently serves.
#[async_trait]
pub trait SemesterResolver: Send + Sync {
    /// Four-digit code of the active semester.
    async fn current_code(&self) -> Result<String>;

    /// Active semester with its derived labels.
    async fn current(&self) -> Result<Semester> {
        let code = self.current_code().await?;
        Semester::parse(&code)
    }
}

/// Build the resolver selected by configuration.
pub fn resolver_for(
    strategy: SemesterStrategy,
    client: Client,
    base_url: &str,
) -> Arc<dyn SemesterResolver> {
    match strategy {
        SemesterStrategy::Calendar => Arc::new(CalendarResolver),
        SemesterStrategy::Redirect => Arc::new(RedirectResolver::new(client, base_url)),
    }
}

/// Derives the semester from the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarResolver;

#[async_trait]
impl SemesterResolver for CalendarResolver {
    async fn current_code(&self) -> Result<String> {
        Ok(code_for_date(Local::now().date_naive()))
    }
}

/// Reads the semester off the catalogue root's redirect target.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: Client,
    base_url: String,
}

impl RedirectResolver {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl SemesterResolver for RedirectResolver {
    async fn current_code(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.base_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(
                &self.base_url,
                format!("unexpected status {status}"),
            ));
        }

        let target = response.url();
        let code = target
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string();

        Semester::parse(&code).map_err(|e| {
            AppError::fetch(
                target.as_str(),
                format!("redirect target does not name a semester: {e}"),
            )
        })?;

        log::debug!("Catalogue root redirected to {target}");
        Ok(code)
    }
}
