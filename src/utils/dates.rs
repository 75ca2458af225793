//! Date feature extraction and day arithmetic
//!
//! Downstream report tables slice isolate counts by year, quarter, month and
//! week; `DateFeatures` derives all of those from one collection timestamp.
//! The combined labels are zero-padded so they sort lexicographically.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whole days from `start` to `end`, ignoring the time of day
#[must_use]
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end.date() - start.date()).num_days()
}

/// Calendar features derived from a collection timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFeatures {
    /// Calendar year
    pub year: i32,
    /// Quarter of the year, 1-4
    pub quarter: u32,
    /// Month of the year, 1-12
    pub month: u32,
    /// ISO week number, 1-53
    pub week: u32,
    /// Day of the month, 1-31
    pub day: u32,
    /// Day of the week, Monday = 0
    pub day_of_week: u32,
    /// Day of the year, 1-366
    pub day_of_year: u32,
}

impl DateFeatures {
    /// Derive features from a date
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() + 2) / 3,
            month: date.month(),
            week: date.iso_week().week(),
            day: date.day(),
            day_of_week: date.weekday().num_days_from_monday(),
            day_of_year: date.ordinal(),
        }
    }

    /// Derive features from a timestamp, dropping the time component
    #[must_use]
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self::from_date(datetime.date())
    }

    /// Combined year-quarter label, e.g. `2023-Q2`
    #[must_use]
    pub fn year_quarter(&self) -> String {
        format!("{}-Q{}", self.year, self.quarter)
    }

    /// Combined year-month label, e.g. `2023-M05`
    #[must_use]
    pub fn year_month(&self) -> String {
        format!("{}-M{:02}", self.year, self.month)
    }

    /// Combined year-week label, e.g. `2023-W07`
    #[must_use]
    pub fn year_week(&self) -> String {
        format!("{}-W{:02}", self.year, self.week)
    }

    /// Combined year-day label, e.g. `2023-D045`
    #[must_use]
    pub fn year_day(&self) -> String {
        format!("{}-D{:03}", self.year, self.day_of_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_features() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 14).unwrap();
        let features = DateFeatures::from_date(date);

        assert_eq!(features.year, 2023);
        assert_eq!(features.quarter, 1);
        assert_eq!(features.month, 2);
        assert_eq!(features.week, 7);
        assert_eq!(features.day, 14);
        assert_eq!(features.day_of_week, 1); // a Tuesday
        assert_eq!(features.day_of_year, 45);
        assert_eq!(features.year_quarter(), "2023-Q1");
        assert_eq!(features.year_month(), "2023-M02");
        assert_eq!(features.year_week(), "2023-W07");
        assert_eq!(features.year_day(), "2023-D045");
    }

    #[test]
    fn test_whole_days_ignore_time_of_day() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(whole_days_between(start, end), 1);
        assert_eq!(whole_days_between(end, start), -1);
    }
}
