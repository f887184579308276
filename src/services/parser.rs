// src/services/parser.rs

//! Course listing parser.
//!
//! Turns catalogue department pages into course records and the department
//! tokens they link to. Parsing is pure: committing results is the caller's
//! job.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{CourseRecord, ParserConfig, normalize_code};
use crate::utils::normalize_department;

/// Separator between the course code and the title in a heading.
const HEADER_SEPARATOR: &str = " - ";

/// Everything extracted from one department page.
#[derive(Debug, Default)]
pub struct ParsedPage {
    /// One entry per course fragment, in document order
    pub courses: Vec<Result<CourseRecord>>,
    /// Department tokens linked from the page, in document order
    pub departments: Vec<String>,
}

/// Compiled selectors and table layout for catalogue pages.
#[derive(Debug, Clone)]
pub struct CourseParser {
    course: Selector,
    header: Selector,
    section_row: Selector,
    department_link: Selector,
    anchor: Selector,
    section_column: usize,
    instructor_column: usize,
    tutorial_column: usize,
}

impl CourseParser {
    /// Compile the configured selectors.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let links = format!(
            "{}, {}",
            config.undergrad_link_selector, config.postgrad_link_selector
        );
        Ok(Self {
            course: Self::parse_selector(&config.course_selector)?,
            header: Self::parse_selector(&config.header_selector)?,
            section_row: Self::parse_selector(&config.section_row_selector)?,
            department_link: Self::parse_selector(&links)?,
            anchor: Self::parse_selector("a")?,
            section_column: config.section_column,
            instructor_column: config.instructor_column,
            tutorial_column: config.tutorial_column,
        })
    }

    /// Parse a whole department page.
    pub fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let courses = document
            .select(&self.course)
            .map(|fragment| self.parse_fragment(fragment))
            .collect();

        let departments = document
            .select(&self.department_link)
            .map(|link| normalize_department(&link.text().collect::<String>()))
            .filter(|token| !token.is_empty())
            .collect();

        ParsedPage {
            courses,
            departments,
        }
    }

    /// Parse a single course fragment given as markup.
    pub fn parse_course_html(&self, html: &str) -> Result<CourseRecord> {
        let document = Html::parse_fragment(html);
        let fragment = document
            .select(&self.course)
            .next()
            .ok_or_else(|| AppError::parse(html, "no course fragment found"))?;
        self.parse_fragment(fragment)
    }

    /// Parse one course fragment into a record.
    pub fn parse_fragment(&self, fragment: ElementRef<'_>) -> Result<CourseRecord> {
        let header = fragment
            .select(&self.header)
            .next()
            .map(|h| collapse_whitespace(&h.text().collect::<String>()))
            .ok_or_else(|| AppError::parse(&fragment.html(), "course heading missing"))?;

        let (code, title, credits) = parse_header(&header)?;
        let mut course = CourseRecord::new(code, title, credits);

        for row in fragment.select(&self.section_row) {
            let cells: Vec<ElementRef<'_>> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .collect();

            let Some(section) = cells
                .get(self.section_column)
                .and_then(|cell| section_code(&cell.text().collect::<String>()))
            else {
                continue;
            };
            course.add_section(&section);

            let is_tutorial = cells
                .get(self.tutorial_column)
                .is_some_and(|cell| !cell.text().collect::<String>().trim().is_empty());
            let column = if is_tutorial {
                self.tutorial_column
            } else {
                self.instructor_column
            };

            if let Some(cell) = cells.get(column) {
                for name in self.instructor_names(*cell) {
                    course.add_instructor(&name, &section);
                }
            }
        }

        Ok(course)
    }

    /// Linked names in a cell. Unlinked text such as "TBA" is not a name.
    fn instructor_names(&self, cell: ElementRef<'_>) -> Vec<String> {
        cell.select(&self.anchor)
            .map(|a| collapse_whitespace(&a.text().collect::<String>()))
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Split a course heading into `(code, title, credits)`.
///
/// The heading looks like `"COMP 1021 - Introduction to CS (3 units)"`.
pub fn parse_header(header: &str) -> Result<(String, String, f64)> {
    let (raw_code, rest) = header
        .split_once(HEADER_SEPARATOR)
        .ok_or_else(|| AppError::parse(header, "heading has no ' - ' separator"))?;

    let code = normalize_code(raw_code);
    if code.is_empty() {
        return Err(AppError::parse(header, "course code is empty"));
    }

    let open = rest
        .rfind('(')
        .ok_or_else(|| AppError::parse(header, "credit annotation missing"))?;
    let group = &rest[open + 1..];
    let close = group
        .find(')')
        .ok_or_else(|| AppError::parse(header, "credit annotation is not closed"))?;

    let token = group[..close].split_whitespace().next().unwrap_or_default();
    let credits: f64 = token
        .parse()
        .ok()
        .filter(|c: &f64| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| AppError::parse(header, format!("invalid credit value '{token}'")))?;

    let title = rest[..open].trim().to_string();

    Ok((code, title, credits))
}

/// Section label of a cell such as `"L1 (1234)"`, or `None` when blank.
fn section_code(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    let label = match text.find('(') {
        Some(idx) => &text[..idx],
        None => text.as_str(),
    };
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
