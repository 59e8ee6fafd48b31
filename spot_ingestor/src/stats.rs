//! Per-day price statistics derived from archived day partitions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::{ArchiveError, ArchiveStore, FsArchiveStore, Partition};
use crate::models::price_point::PricePoint;

/// Summary of one archived day, stored per year in `stats.json` next to the
/// year's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatistics {
    pub day: NaiveDate,
    pub highest_price: String,
    pub lowest_price: String,
    pub average_price: String,
}

#[derive(Debug, Error)]
pub enum StatsError {
    /// The day partition holds nothing to summarize.
    #[error("no archived prices on {day}")]
    EmptyDay { day: NaiveDate },

    /// A stored value does not parse as a decimal.
    #[error("unparsable archived value '{0}'")]
    InvalidValue(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Computes lowest, highest, and mean price over one day's records. Values
/// compare numerically, not lexically; the mean is rounded to two decimals.
pub fn day_statistics(day: NaiveDate, points: &[PricePoint]) -> Result<DayStatistics, StatsError> {
    let mut values = Vec::with_capacity(points.len());
    for point in points {
        let value: Decimal = point
            .value
            .parse()
            .map_err(|_| StatsError::InvalidValue(point.value.clone()))?;
        values.push((value, point.value.clone()));
    }
    values.sort_by(|a, b| a.0.cmp(&b.0));

    let (Some(lowest), Some(highest)) = (values.first(), values.last()) else {
        return Err(StatsError::EmptyDay { day });
    };

    let sum: Decimal = values.iter().map(|(value, _)| *value).sum();
    let average = (sum / Decimal::from(values.len())).round_dp(2);

    Ok(DayStatistics {
        day,
        highest_price: highest.1.clone(),
        lowest_price: lowest.1.clone(),
        average_price: average.to_string(),
    })
}

/// Reads the archived day partition for `day`, computes its statistics, and
/// upserts them into the year's `stats.json` (re-running a day replaces its
/// entry instead of appending a duplicate).
pub async fn record_day_statistics(
    store: &FsArchiveStore,
    area: &str,
    day: NaiveDate,
) -> Result<DayStatistics, StatsError> {
    let day_key = day.format("%Y-%m-%d").to_string();
    let year = day.format("%Y").to_string();

    let points = store.read(area, &Partition::day(day_key.as_str())).await?;
    if points.is_empty() {
        return Err(StatsError::EmptyDay { day });
    }

    let stats = day_statistics(day, &points)?;
    tracing::info!(area, day = %day, "saving updated statistics");

    let mut year_stats = store.read_year_statistics(area, &year).await?;
    year_stats.retain(|entry| entry.day != day);
    year_stats.push(stats.clone());
    year_stats.sort_by_key(|entry| entry.day);
    store.write_year_statistics(area, &year, &year_stats).await?;

    Ok(stats)
}
