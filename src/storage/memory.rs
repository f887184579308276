// src/storage/memory.rs

//! Lock-guarded map from course code to record.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::{CourseRecord, normalize_code};

/// Shared course cache.
///
/// Writers overwrite by code (last write wins). Locks are only held for the
/// duration of a single map operation, never across an `.await`.
#[derive(Debug, Default)]
pub struct CourseStore {
    courses: RwLock<HashMap<String, CourseRecord>>,
}

impl CourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record under its code.
    pub fn put(&self, record: CourseRecord) {
        let code = record.code.clone();
        self.courses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code.clone(), record);
        log::debug!("In-memory cache updated for {code}");
    }

    /// Look up a record; the code is normalized first.
    pub fn get(&self, code: &str) -> Option<CourseRecord> {
        self.courses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_code(code))
            .cloned()
    }

    /// Snapshot of every record, sorted by code.
    pub fn list(&self) -> Vec<CourseRecord> {
        let mut courses: Vec<CourseRecord> = self
            .courses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        courses
    }

    pub fn len(&self) -> usize {
        self.courses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
