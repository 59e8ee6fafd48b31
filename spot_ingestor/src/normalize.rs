//! Expansion of sparse fragments into full-cadence price sequences.
//!
//! The upstream platform only publishes a position when its price differs
//! from the previous slot, so a fragment's point list is sparse. Archival and
//! display both need the dense series, with the "most recent known price"
//! carried across elided slots.

use thiserror::Error;

use crate::models::fragment::{RawFragment, Resolution};
use crate::models::price_point::PricePoint;

/// Why one fragment could not be expanded. All variants are recoverable:
/// callers skip the fragment and keep the batch.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Cadence is neither 60 nor 15 minutes.
    #[error("unsupported resolution '{0}' (expected PT60M or PT15M)")]
    UnsupportedResolution(String),

    /// A data point lies outside the interval's slot range.
    #[error("data point position {position} outside 1..={slot_count}")]
    PositionOutOfRange { position: u32, slot_count: u32 },

    /// The fragment carries no data points at all, so there is no value to
    /// fill any slot with.
    #[error("fragment has no data points")]
    EmptyFragment,
}

/// Expands one fragment into exactly one [`PricePoint`] per cadence slot
/// (24 hourly, 96 quarter-hourly), timestamps spaced one slot apart starting
/// at the fragment's interval start.
///
/// Gaps between published positions are forward-filled with the last emitted
/// value; a gap before the first position borrows that first upcoming value;
/// trailing silence keeps the last value to the end of the interval.
/// Duplicate positions keep their first occurrence.
pub fn expand_fragment(fragment: &RawFragment) -> Result<Vec<PricePoint>, NormalizeError> {
    let resolution = Resolution::from_code(&fragment.resolution)
        .ok_or_else(|| NormalizeError::UnsupportedResolution(fragment.resolution.clone()))?;
    let slot_count = resolution.slot_count();
    let slot = resolution.slot_duration();

    if fragment.data_points.is_empty() {
        return Err(NormalizeError::EmptyFragment);
    }

    let mut data_points = fragment.data_points.clone();
    data_points.sort_by_key(|p| p.position);

    let start = fragment.interval.start;
    let mut series = Vec::with_capacity(slot_count as usize);
    let mut cursor: u32 = 1;
    let mut last_value: Option<String> = None;

    for point in &data_points {
        if point.position < 1 || point.position > slot_count {
            return Err(NormalizeError::PositionOutOfRange {
                position: point.position,
                slot_count,
            });
        }
        if point.position < cursor {
            continue;
        }

        let value = point.price.to_string();
        while cursor < point.position {
            let fill = last_value.clone().unwrap_or_else(|| value.clone());
            series.push(PricePoint::new(start + slot * (cursor as i32 - 1), fill));
            cursor += 1;
        }
        series.push(PricePoint::new(
            start + slot * (cursor as i32 - 1),
            value.clone(),
        ));
        last_value = Some(value);
        cursor += 1;
    }

    if let Some(last) = last_value {
        while cursor <= slot_count {
            series.push(PricePoint::new(
                start + slot * (cursor as i32 - 1),
                last.clone(),
            ));
            cursor += 1;
        }
    }

    Ok(series)
}
