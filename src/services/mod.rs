//! Service layer for the catalogue application.
//!
//! This module contains the business logic for:
//! - Course page parsing (`CourseParser`)
//! - Department crawling (`CatalogueCrawler`)
//! - Semester resolution (`SemesterResolver`)

pub mod crawler;
pub mod parser;
pub mod semester;

pub use crawler::{CatalogueCrawler, VisitedSet};
pub use parser::{CourseParser, ParsedPage, parse_header};
pub use semester::{CalendarResolver, RedirectResolver, SemesterResolver, resolver_for};
