//! HTTP API over the course store.
//!
//! - `GET /v1/courses/{code}`: cached course, crawling its department on a miss
//! - `GET /v1/courses`: every cached course
//! - `PATCH /v1/courses`: recrawl the active semester
//! - `GET /v1/semesters/{code|current}`: semester labels
//! - `GET /v1`, `GET /healthz`, `GET /`: introspection, health, redirect

mod error;
pub mod handlers;
mod manifest;
pub mod server;

use std::sync::Arc;

pub use error::{ApiError, ApiErrorKind};
pub use manifest::{BuildInfo, Manifest};
pub use server::{app, router, serve};

use crate::services::{CatalogueCrawler, SemesterResolver};

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<CatalogueCrawler>,
    pub resolver: Arc<dyn SemesterResolver>,
    pub build_info: Arc<BuildInfo>,
}

impl AppState {
    pub fn new(crawler: Arc<CatalogueCrawler>, resolver: Arc<dyn SemesterResolver>) -> Self {
        Self {
            crawler,
            resolver,
            build_info: Arc::new(BuildInfo::capture()),
        }
    }
}
