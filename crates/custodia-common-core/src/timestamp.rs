//! Timestamp utilities.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default display format for dates in reports (pt-BR).
pub const BR_DATE_FORMAT: &str = "%d/%m/%Y";

/// A UTC timestamp.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// From a DateTime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// ISO 8601 string.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Format with a `strftime` pattern, e.g. [`BR_DATE_FORMAT`].
    pub fn format_date(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }

    /// Calendar date in UTC.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Whether both timestamps fall in the same UTC calendar month.
    pub fn same_month_as(&self, other: &Timestamp) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }

    /// This timestamp shifted forward by whole days.
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + chrono::Duration::days(days))
    }

    /// Duration since this timestamp.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_timestamp_serialization() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, deserialized);
    }

    #[test]
    fn test_br_date_format() {
        assert_eq!(ts(2024, 3, 7).format_date(BR_DATE_FORMAT), "07/03/2024");
    }

    #[test]
    fn test_same_month() {
        assert!(ts(2024, 3, 1).same_month_as(&ts(2024, 3, 31)));
        assert!(!ts(2024, 3, 1).same_month_as(&ts(2024, 4, 1)));
        assert!(!ts(2023, 3, 1).same_month_as(&ts(2024, 3, 1)));
    }

    #[test]
    fn test_plus_days() {
        assert_eq!(ts(2024, 1, 1).plus_days(31), ts(2024, 2, 1));
    }
}
