//! Utility functions and helpers.

pub mod http;

/// Catalogue root for one semester: `{base}/{semester}`.
pub fn semester_endpoint(base_url: &str, semester: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), semester.trim())
}

/// Listing page of one department: `{endpoint}/subject/{token}`.
pub fn subject_url(endpoint: &str, department: &str) -> String {
    format!("{}/subject/{}", endpoint.trim_end_matches('/'), department)
}

/// Case-normalized department token.
pub fn normalize_department(token: &str) -> String {
    token.trim().to_uppercase()
}
