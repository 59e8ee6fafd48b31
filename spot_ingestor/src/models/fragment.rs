//! Raw time-series fragments as published by the transparency platform.
//!
//! A query window may return several fragments for the same interval: the
//! source re-publishes a day's prices with a superseding, more authoritative
//! series later. Fragments are transient; they exist only between decoding a
//! response and normalization.

use chrono::{DateTime, Duration, FixedOffset};
use rust_decimal::Decimal;

/// Half-open `[start, end)` window one fragment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// One published sample. `position` is a 1-based offset into the interval at
/// the fragment's resolution; the source omits positions whose price repeats
/// the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub position: u32,
    pub price: Decimal,
}

/// One raw, possibly partial time series from a query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub currency: String,
    pub energy_unit: String,
    pub interval: TimeInterval,
    /// Cadence code as published (e.g. `"PT60M"`). Mapped to [`Resolution`]
    /// during normalization so unknown cadences fail per fragment, not per
    /// document.
    pub resolution: String,
    /// Authority rank among competing publications of the same interval;
    /// lower wins. Absent means least authoritative.
    pub classification: Option<u32>,
    pub data_points: Vec<DataPoint>,
}

impl RawFragment {
    /// Rank assigned to fragments published without a classification.
    pub const DEFAULT_RANK: u32 = 999;

    pub fn rank(&self) -> u32 {
        self.classification.unwrap_or(Self::DEFAULT_RANK)
    }
}

/// Recognized slot cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hourly,
    QuarterHourly,
}

impl Resolution {
    /// Maps an upstream cadence code; anything but the two recognized codes
    /// is unsupported.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PT60M" => Some(Resolution::Hourly),
            "PT15M" => Some(Resolution::QuarterHourly),
            _ => None,
        }
    }

    /// Slots in one published interval.
    pub fn slot_count(self) -> u32 {
        match self {
            Resolution::Hourly => 24,
            Resolution::QuarterHourly => 96,
        }
    }

    pub fn slot_duration(self) -> Duration {
        match self {
            Resolution::Hourly => Duration::minutes(60),
            Resolution::QuarterHourly => Duration::minutes(15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_codes() {
        assert_eq!(Resolution::from_code("PT60M"), Some(Resolution::Hourly));
        assert_eq!(
            Resolution::from_code("PT15M"),
            Some(Resolution::QuarterHourly)
        );
        assert_eq!(Resolution::from_code("PT30M"), None);
        assert_eq!(Resolution::from_code(""), None);
    }

    #[test]
    fn slot_geometry() {
        assert_eq!(Resolution::Hourly.slot_count(), 24);
        assert_eq!(Resolution::QuarterHourly.slot_count(), 96);
        assert_eq!(Resolution::Hourly.slot_duration(), Duration::minutes(60));
        assert_eq!(
            Resolution::QuarterHourly.slot_duration(),
            Duration::minutes(15)
        );
    }

    #[test]
    fn missing_classification_ranks_last() {
        let fragment = RawFragment {
            currency: "SEK".into(),
            energy_unit: "MWH".into(),
            interval: TimeInterval {
                start: DateTime::parse_from_rfc3339("2024-01-01T00:00:00+01:00").unwrap(),
                end: DateTime::parse_from_rfc3339("2024-01-02T00:00:00+01:00").unwrap(),
            },
            resolution: "PT60M".into(),
            classification: None,
            data_points: vec![],
        };
        assert_eq!(fragment.rank(), RawFragment::DEFAULT_RANK);
        let ranked = RawFragment {
            classification: Some(1),
            ..fragment
        };
        assert_eq!(ranked.rank(), 1);
    }
}
