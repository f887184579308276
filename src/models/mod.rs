// src/models/mod.rs

//! Domain models for the catalogue service.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod course;
mod semester;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, LoggingConfig, ParserConfig, SemesterConfig, SemesterStrategy,
    ServerConfig,
};
pub use course::{CourseRecord, DEPARTMENT_PREFIX_LEN, department_of, normalize_code};
pub use semester::{Season, Semester, code_for_date};

/// Summary of a crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CrawlOutcome {
    /// Department pages fetched successfully
    pub departments_visited: usize,
    /// Department pages that could not be fetched
    pub page_failures: usize,
    /// Course records committed to the store
    pub courses_stored: usize,
    /// Course fragments skipped because they failed to parse
    pub parse_failures: usize,
}

impl CrawlOutcome {
    /// Fold another outcome into this one.
    pub fn absorb(&mut self, other: CrawlOutcome) {
        self.departments_visited += other.departments_visited;
        self.page_failures += other.page_failures;
        self.courses_stored += other.courses_stored;
        self.parse_failures += other.parse_failures;
    }
}
