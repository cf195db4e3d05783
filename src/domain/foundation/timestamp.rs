//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Formats as `YYYY-MM-DD HH:MM`, the format shown in encounter history.
    pub fn to_display_minutes(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        let later = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        assert!(earlier.is_before(&later));
        assert!(earlier < later);
    }

    #[test]
    fn display_minutes_drops_seconds() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 59).unwrap());
        assert_eq!(ts.to_display_minutes(), "2024-03-07 14:05");
    }
}
