//! Reconciliation of competing publications into one price sequence.
//!
//! One query window can return several normalized fragments covering the
//! same timestamps: the platform re-publishes a day with a superseding,
//! more authoritative series. [`resolve_conflicts`] collapses the overlap by
//! classification rank; [`ReconciliationEngine`] drives the whole
//! fetch → decode → normalize → resolve run.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::models::area::PriceArea;
use crate::models::price_point::PricePoint;
use crate::normalize::expand_fragment;
use crate::providers::entsoe::document;
use crate::providers::{PriceProvider, TransportError};
use crate::ratelimit::RateLimiter;

/// Ordered, gap-free, deduplicated result of one ingestion run: exactly one
/// point per timestamp, ascending.
pub type ReconciledSeries = Vec<PricePoint>;

/// One fragment after normalization, still carrying its authority rank.
#[derive(Debug, Clone)]
pub struct NormalizedFragment {
    pub rank: u32,
    pub points: Vec<PricePoint>,
}

/// How the engine treats a sub-window whose upstream request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportPolicy {
    /// Abort the run on the first failed request.
    Fail,
    /// Log the failure and continue with the remaining sub-windows.
    SkipWindow,
}

/// Keeps, per timestamp, the point of the fragment with the lowest
/// classification rank; ties go to the fragment seen first. The result is
/// sorted ascending by timestamp.
pub fn resolve_conflicts(fragments: Vec<NormalizedFragment>) -> ReconciledSeries {
    let mut winners: IndexMap<DateTime<FixedOffset>, (u32, PricePoint)> = IndexMap::new();
    for fragment in fragments {
        for point in fragment.points {
            match winners.entry(point.timestamp) {
                Entry::Occupied(mut slot) => {
                    if fragment.rank < slot.get().0 {
                        slot.insert((fragment.rank, point));
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert((fragment.rank, point));
                }
            }
        }
    }

    let mut series: ReconciledSeries = winners.into_values().map(|(_, point)| point).collect();
    series.sort();
    series
}

/// Drives one ingestion run over a query window.
pub struct ReconciliationEngine<P> {
    provider: P,
    limiter: Arc<RateLimiter>,
}

impl<P: PriceProvider + Send + Sync> ReconciliationEngine<P> {
    /// Hard upstream constraint on the span of a single query.
    pub const MAX_QUERY_SPAN_DAYS: i64 = 14;

    pub fn new(provider: P, limiter: Arc<RateLimiter>) -> Self {
        Self { provider, limiter }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs fetch → decode → normalize → resolve over `[start, end)`,
    /// splitting into sub-windows of at most fourteen days. Decode and
    /// normalization failures are contained to their sub-window or fragment;
    /// transport failures follow `policy`.
    pub async fn run(
        &self,
        area: &PriceArea,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        policy: TransportPolicy,
    ) -> Result<ReconciledSeries, TransportError> {
        let mut fragments = Vec::new();
        let mut cursor = start;
        while cursor < end {
            let step_end = (cursor + Duration::days(Self::MAX_QUERY_SPAN_DAYS)).min(end);
            match self.fetch_fragments(area, cursor, step_end).await {
                Ok(batch) => fragments.extend(batch),
                Err(err) => match policy {
                    TransportPolicy::Fail => return Err(err),
                    TransportPolicy::SkipWindow => {
                        tracing::error!(
                            area = %area.code,
                            %cursor,
                            %step_end,
                            error = %err,
                            "sub-window request failed, skipping"
                        );
                    }
                },
            }
            cursor = step_end;
        }
        Ok(resolve_conflicts(fragments))
    }

    /// Fetches and normalizes one sub-window. A body that does not decode
    /// yields no fragments; individual series that fail to structure or
    /// normalize are skipped.
    async fn fetch_fragments(
        &self,
        area: &PriceArea,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<NormalizedFragment>, TransportError> {
        self.limiter.acquire().await;
        let body = self.provider.fetch_window(&area.eic_code, start, end).await?;

        let decoded = match document::decode_document(&body) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::error!(area = %area.code, error = %err, "problem with content of response");
                return Ok(Vec::new());
            }
        };

        let mut fragments = Vec::new();
        for structured in decoded {
            let fragment = match structured {
                Ok(fragment) => fragment,
                Err(err) => {
                    tracing::warn!(area = %area.code, error = %err, "skipping malformed series");
                    continue;
                }
            };
            match expand_fragment(&fragment) {
                Ok(points) => fragments.push(NormalizedFragment {
                    rank: fragment.rank(),
                    points,
                }),
                Err(err) => {
                    tracing::warn!(area = %area.code, error = %err, "skipping fragment");
                }
            }
        }
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price_point::market_offset;
    use chrono::TimeZone;

    fn point(hour: u32, value: &str) -> PricePoint {
        let ts = market_offset()
            .with_ymd_and_hms(2024, 1, 1, hour, 0, 0)
            .unwrap();
        PricePoint::new(ts, value)
    }

    fn fragment(rank: u32, points: Vec<PricePoint>) -> NormalizedFragment {
        NormalizedFragment { rank, points }
    }

    #[test]
    fn lowest_rank_wins_regardless_of_order() {
        let authoritative = fragment(1, vec![point(0, "20.0")]);
        let superseded = fragment(2, vec![point(0, "10.0")]);

        for fragments in [
            vec![authoritative.clone(), superseded.clone()],
            vec![superseded, authoritative],
        ] {
            let series = resolve_conflicts(fragments);
            assert_eq!(series.len(), 1);
            assert_eq!(series[0].value, "20.0");
        }
    }

    #[test]
    fn equal_rank_keeps_first_seen() {
        let first = fragment(2, vec![point(0, "10.0")]);
        let second = fragment(2, vec![point(0, "99.0")]);
        let series = resolve_conflicts(vec![first, second]);
        assert_eq!(series[0].value, "10.0");
    }

    #[test]
    fn disjoint_fragments_union_sorted() {
        let evening = fragment(1, vec![point(23, "3.0"), point(22, "2.0")]);
        let morning = fragment(2, vec![point(0, "1.0")]);
        let series = resolve_conflicts(vec![evening, morning]);
        let values: Vec<&str> = series.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["1.0", "2.0", "3.0"]);
    }

    #[test]
    fn missing_classification_loses_to_any_rank() {
        let unranked = fragment(999, vec![point(0, "10.0")]);
        let ranked = fragment(3, vec![point(0, "20.0")]);
        let series = resolve_conflicts(vec![unranked, ranked]);
        assert_eq!(series[0].value, "20.0");
    }

    #[test]
    fn empty_input_resolves_to_empty_series() {
        assert!(resolve_conflicts(Vec::new()).is_empty());
    }
}
