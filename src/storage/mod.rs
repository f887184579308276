//! In-memory course storage.
//!
//! The store lives for the lifetime of the process: created empty at
//! startup, filled by crawls, read by every course request. There is no
//! eviction and nothing is written to disk.

pub mod memory;

// Re-export for convenience
pub use memory::CourseStore;
