//! Drives archive merges for one reconciled series.
//!
//! A run's series is grouped by calendar key per granularity and merged into
//! each partition it touches, coarsest granularity first. The rolling
//! `latest` partition is rewritten, not merged: it always reflects exactly
//! what the run produced for today and tomorrow.

use chrono::{Days, NaiveDate, Utc};
use indexmap::IndexMap;

use crate::archive::{ArchiveError, ArchiveStore, Granularity, MergePolicy, Partition, merge};
use crate::models::price_point::PricePoint;

/// Calendar granularities a run is merged into, coarsest first.
const CALENDAR_GRANULARITIES: [Granularity; 3] =
    [Granularity::Year, Granularity::Month, Granularity::Day];

pub struct Archiver<S> {
    store: S,
    policy: MergePolicy,
}

impl<S: ArchiveStore + Send + Sync> Archiver<S> {
    pub fn new(store: S, policy: MergePolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merges one reconciled series into every day, month, and year
    /// partition it touches.
    pub async fn merge_run(&self, area: &str, series: &[PricePoint]) -> Result<(), ArchiveError> {
        for granularity in CALENDAR_GRANULARITIES {
            self.merge_granularity(area, series, granularity).await?;
        }
        Ok(())
    }

    /// Rewrites the rolling `latest` partition with the run's points for
    /// today and tomorrow. Before tomorrow's prices are published the feed
    /// has nothing for that day.
    pub async fn update_latest(
        &self,
        area: &str,
        series: &[PricePoint],
    ) -> Result<(), ArchiveError> {
        tracing::info!(area, "updating latest values");
        let today = Utc::now().date_naive();
        let tomorrow = today + Days::new(1);

        let grouped = group_by_key(series, Granularity::Day);
        let mut latest = Vec::new();
        for day in [today, tomorrow] {
            if let Some(points) = grouped.get(&day_key(day)) {
                latest.extend(points.iter().cloned());
            }
        }
        latest.sort();

        self.store.write(area, &Partition::latest(), &latest).await
    }

    async fn merge_granularity(
        &self,
        area: &str,
        series: &[PricePoint],
        granularity: Granularity,
    ) -> Result<(), ArchiveError> {
        for (key, points) in group_by_key(series, granularity) {
            tracing::info!(area, %key, "updating {} values", granularity.label());
            let partition = Partition { granularity, key };
            let existing = self.store.read(area, &partition).await?;
            let merged = merge(existing, &points, self.policy);
            self.store.write(area, &partition, &merged).await?;
        }
        Ok(())
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Groups points by their calendar partition key, in first-seen order. The
/// key is taken from the point's own (market-offset) timestamp.
fn group_by_key(series: &[PricePoint], granularity: Granularity) -> IndexMap<String, Vec<PricePoint>> {
    let mut grouped: IndexMap<String, Vec<PricePoint>> = IndexMap::new();
    let Some(format) = granularity.key_format() else {
        return grouped;
    };
    for point in series {
        let key = point.timestamp.format(format).to_string();
        grouped.entry(key).or_default().push(point.clone());
    }
    grouped
}
