// src/models/course.rs

//! Course record produced by the page parser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of leading code characters naming the department.
pub const DEPARTMENT_PREFIX_LEN: usize = 4;

/// One course as listed in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Canonical course code (e.g. "COMP1021")
    pub code: String,

    /// Course title without the credit annotation
    pub title: String,

    /// Credit units; may be fractional
    pub credits: f64,

    /// Instructor name to the sections they teach, in first-seen order
    #[serde(default)]
    pub instructors: BTreeMap<String, Vec<String>>,

    /// Section codes in first-seen order
    #[serde(default)]
    pub sections: Vec<String>,
}

impl CourseRecord {
    /// Create a record with no sections yet.
    pub fn new(code: impl Into<String>, title: impl Into<String>, credits: f64) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            credits,
            instructors: BTreeMap::new(),
            sections: Vec::new(),
        }
    }

    /// Record a section code. Returns `false` if it was already present.
    pub fn add_section(&mut self, section: &str) -> bool {
        if section.is_empty() || self.sections.iter().any(|s| s == section) {
            return false;
        }
        self.sections.push(section.to_string());
        true
    }

    /// Associate an instructor with a section, ignoring blank names and repeats.
    pub fn add_instructor(&mut self, name: &str, section: &str) {
        let name = name.trim();
        if name.is_empty() || section.is_empty() {
            return;
        }
        let sections = self.instructors.entry(name.to_string()).or_default();
        if !sections.iter().any(|s| s == section) {
            sections.push(section.to_string());
        }
    }
}

/// Canonical form of a course code: whitespace removed, uppercase.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Department prefix of a course code, if the code is long enough.
pub fn department_of(code: &str) -> Option<String> {
    let code = normalize_code(code);
    let prefix: String = code.chars().take(DEPARTMENT_PREFIX_LEN).collect();
    (prefix.chars().count() == DEPARTMENT_PREFIX_LEN).then_some(prefix)
}
