// src/models/semester.rs

//! Semester codes and the academic calendar rule behind them.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Season indicator carried in the last two digits of a semester code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Season {
    /// Look up a season by its two-digit indicator.
    pub fn from_indicator(indicator: &str) -> Option<Self> {
        match indicator {
            "10" => Some(Self::Fall),
            "20" => Some(Self::Winter),
            "30" => Some(Self::Spring),
            "40" => Some(Self::Summer),
            _ => None,
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Fall => "10",
            Self::Winter => "20",
            Self::Spring => "30",
            Self::Summer => "40",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
        }
    }

    /// Seasons after Winter fall in the second calendar year of the cohort.
    fn in_second_year(&self) -> bool {
        matches!(self, Self::Spring | Self::Summer)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated semester code with its derived labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    /// Four-digit code as given (e.g. "2510")
    pub code: String,

    /// Human label (e.g. "2025 - 2026 Fall")
    pub name: String,

    /// Calendar year the season falls in
    pub year: String,

    /// Academic year range (e.g. "2025 - 2026")
    pub cohort: String,
}

impl Semester {
    /// Parse a semester code relative to today's date.
    pub fn parse(code: &str) -> Result<Self> {
        Self::parse_with_year(code, Local::now().year())
    }

    /// Parse a semester code relative to `reference_year`.
    ///
    /// The two-digit prefix resolves to the cohort start year nearest to
    /// `reference_year`, so "9920" read in January 2100 is 2099 - 2100.
    pub fn parse_with_year(code: &str, reference_year: i32) -> Result<Self> {
        let code = code.trim();
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(format!(
                "invalid semester code '{code}': expected four digits"
            )));
        }

        let (prefix, indicator) = code.split_at(2);
        let season = Season::from_indicator(indicator).ok_or_else(|| {
            AppError::validation(format!(
                "invalid semester code '{code}': unknown season '{indicator}'"
            ))
        })?;

        let short_year: i32 = prefix
            .parse()
            .map_err(|e| AppError::validation(format!("invalid semester code '{code}': {e}")))?;
        let mut first_year = reference_year.div_euclid(100) * 100 + short_year;
        if first_year - reference_year > 50 {
            first_year -= 100;
        } else if reference_year - first_year > 50 {
            first_year += 100;
        }
        let second_year = first_year + 1;

        let cohort = format!("{first_year} - {second_year}");
        let year = if season.in_second_year() {
            second_year
        } else {
            first_year
        };

        Ok(Self {
            code: code.to_string(),
            name: format!("{cohort} {season}"),
            year: year.to_string(),
            cohort,
        })
    }

    pub fn season(&self) -> Option<Season> {
        Season::from_indicator(&self.code[self.code.len().saturating_sub(2)..])
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Semester code active on `date` under the academic calendar.
///
/// The academic year starts in September; earlier months belong to the
/// year that started the previous September.
pub fn code_for_date(date: NaiveDate) -> String {
    let month = date.month();
    if month >= 9 {
        return format!("{:02}{}", date.year().rem_euclid(100), Season::Fall.indicator());
    }

    let season = if month > 6 {
        Season::Summer
    } else if month > 2 {
        Season::Spring
    } else {
        Season::Winter
    };
    format!(
        "{:02}{}",
        (date.year() - 1).rem_euclid(100),
        season.indicator()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_fall_semester() {
        let semester = Semester::parse_with_year("2510", 2025).unwrap();
        assert_eq!(semester.code, "2510");
        assert_eq!(semester.cohort, "2025 - 2026");
        assert_eq!(semester.year, "2025");
        assert!(semester.name.contains("Fall"));
        assert_eq!(semester.season(), Some(Season::Fall));
    }

    #[test]
    fn test_spring_and_summer_roll_into_next_year() {
        assert_eq!(Semester::parse_with_year("2530", 2026).unwrap().year, "2026");
        assert_eq!(Semester::parse_with_year("2540", 2026).unwrap().year, "2026");
        assert_eq!(Semester::parse_with_year("2520", 2026).unwrap().year, "2025");
    }

    #[test]
    fn test_last_year_of_century_does_not_overflow_label() {
        let semester = Semester::parse_with_year("9910", 2099).unwrap();
        assert_eq!(semester.cohort, "2099 - 2100");
    }

    #[test]
    fn test_unknown_season_is_validation_error() {
        let err = Semester::parse_with_year("2599", 2025).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_malformed_codes_are_validation_errors() {
        for code in ["", "251", "25100", "ab10", "25x0"] {
            let err = Semester::parse_with_year(code, 2025).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "code {code:?}");
        }
    }

    #[test]
    fn test_calendar_rule_month_buckets() {
        assert_eq!(code_for_date(date(2025, 9, 1)), "2510");
        assert_eq!(code_for_date(date(2025, 12, 31)), "2510");
        assert_eq!(code_for_date(date(2026, 1, 15)), "2520");
        assert_eq!(code_for_date(date(2026, 2, 28)), "2520");
        assert_eq!(code_for_date(date(2026, 3, 1)), "2530");
        assert_eq!(code_for_date(date(2026, 6, 30)), "2530");
        assert_eq!(code_for_date(date(2026, 7, 1)), "2540");
        assert_eq!(code_for_date(date(2026, 8, 31)), "2540");
    }

    #[test]
    fn test_calendar_rule_handles_century_boundary() {
        assert_eq!(code_for_date(date(2000, 1, 10)), "9920");
    }

    #[test]
    fn test_calendar_code_labels_agree_across_century() {
        let code = code_for_date(date(2100, 1, 10));
        assert_eq!(code, "9920");

        let semester = Semester::parse_with_year(&code, 2100).unwrap();
        assert_eq!(semester.cohort, "2099 - 2100");
        assert_eq!(semester.year, "2099");
    }

    #[test]
    fn test_next_century_prefix_rolls_forward() {
        let semester = Semester::parse_with_year("0010", 2099).unwrap();
        assert_eq!(semester.cohort, "2100 - 2101");
    }

    #[test]
    fn test_upcoming_cohort_stays_in_current_century() {
        let semester = Semester::parse_with_year("2610", 2025).unwrap();
        assert_eq!(semester.cohort, "2026 - 2027");
    }
}
