//! Canonical in-memory representation of one archived price record.
//!
//! This struct is the standard output of the reconciliation pipeline and the
//! unit of storage in the partitioned archive, regardless of which upstream
//! publication it came from.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The market's fixed UTC+1 offset (Etc/GMT-1, no daylight saving).
///
/// Archived timestamps always carry this offset so the JSON form is stable
/// across the year.
pub fn market_offset() -> FixedOffset {
    FixedOffset::east_opt(3600).expect("one hour east is a valid offset")
}

/// One price for one cadence slot.
///
/// Identity is the `(timestamp, value)` pair: a re-published price with a
/// different value at the same timestamp is a different record, not an
/// update. Ordering is by timestamp first, then value, which is the order
/// partitions are persisted in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PricePoint {
    /// Slot start in the market's fixed UTC+1 offset.
    pub timestamp: DateTime<FixedOffset>,
    /// Price as published, kept as a decimal string.
    pub value: String,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<FixedOffset>, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }
}
