// src/api/manifest.rs

//! Build and runtime information served at `/v1`.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Facts about this process captured at startup.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub hostname: String,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

/// Serialized view of [`BuildInfo`].
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub hostname: String,
    pub started_at: DateTime<Utc>,
    /// Seconds since startup, two decimals
    pub uptime: String,
}

impl BuildInfo {
    pub fn capture() -> Self {
        Self {
            name: "Course Catalogue".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            hostname: std::env::var("HOSTNAME")
                .ok()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| "localhost".to_string()),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn uptime(&self) -> String {
        format!("{:.2}", self.started.elapsed().as_secs_f64())
    }

    pub fn manifest(&self) -> Manifest {
        Manifest {
            name: self.name.clone(),
            version: self.version.clone(),
            platform: self.platform.clone(),
            hostname: self.hostname.clone(),
            started_at: self.started_at,
            uptime: self.uptime(),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>20}: {}", "Application", self.name)?;
        writeln!(f, "{:>20}: {}", "Version", self.version)?;
        writeln!(f, "{:>20}: {}", "Platform", self.platform)?;
        write!(f, "{:>20}: {}", "Host", self.hostname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_reports_package_version() {
        let info = BuildInfo::capture();
        let manifest = info.manifest();
        assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
        assert!(manifest.uptime.parse::<f64>().unwrap() >= 0.0);
    }

    #[test]
    fn test_banner_lists_application_name() {
        let banner = BuildInfo::capture().to_string();
        assert!(banner.contains("Course Catalogue"));
        assert_eq!(banner.lines().count(), 4);
    }
}
