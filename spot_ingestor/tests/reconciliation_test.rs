//! End-to-end pipeline scenarios against a canned provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use spot_ingestor::archive::{ArchiveStore, FsArchiveStore, MergePolicy, Partition};
use spot_ingestor::archiver::Archiver;
use spot_ingestor::models::area::PriceArea;
use spot_ingestor::models::price_point::market_offset;
use spot_ingestor::providers::{PriceProvider, TransportError};
use spot_ingestor::ratelimit::RateLimiter;
use spot_ingestor::reconcile::{ReconciliationEngine, TransportPolicy};

/// Serves one canned body for every window and counts the requests.
struct CannedProvider {
    body: String,
    calls: AtomicUsize,
}

impl CannedProvider {
    fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PriceProvider for CannedProvider {
    async fn fetch_window(
        &self,
        _area_code: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

/// Fails every request with a transport error.
struct DownProvider;

#[async_trait]
impl PriceProvider for DownProvider {
    async fn fetch_window(
        &self,
        _area_code: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<String, TransportError> {
        Err(TransportError::Status {
            status: 503,
            body: "maintenance".to_string(),
        })
    }
}

fn se3() -> PriceArea {
    PriceArea::new("SE3", "10Y1001A1001A46L")
}

fn engine<P: PriceProvider + Send + Sync>(provider: P) -> ReconciliationEngine<P> {
    // generous quota so tests never sleep
    let limiter = Arc::new(RateLimiter::new(1000, Duration::from_secs(1)));
    ReconciliationEngine::new(provider, limiter)
}

/// One hourly series for 2024-01-01 (market time), sparse-encoded as
/// positions 1 and 3: prices 10.0, 10.0, 11.0, 11.0, ...
const SPARSE_DAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Publication_MarketDocument>
  <TimeSeries>
    <currency_Unit.name>SEK</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <Period>
      <timeInterval>
        <start>2023-12-31T23:00Z</start>
        <end>2024-01-01T23:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>10.0</price.amount></Point>
      <Point><position>3</position><price.amount>11.0</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>
"#;

/// Two publications of the same day: an unclassified one and a rank-1
/// re-publication with different prices.
const REPUBLISHED_DAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Publication_MarketDocument>
  <TimeSeries>
    <currency_Unit.name>SEK</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <Period>
      <timeInterval>
        <start>2023-12-31T23:00Z</start>
        <end>2024-01-01T23:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>99.0</price.amount></Point>
    </Period>
  </TimeSeries>
  <TimeSeries>
    <currency_Unit.name>SEK</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <classificationSequence_AttributeInstanceComponent.position>1</classificationSequence_AttributeInstanceComponent.position>
    <Period>
      <timeInterval>
        <start>2023-12-31T23:00Z</start>
        <end>2024-01-01T23:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>42.0</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>
"#;

fn day_window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap(),
    )
}

#[tokio::test]
async fn sparse_day_reconciles_and_archives() {
    let engine = engine(CannedProvider::new(SPARSE_DAY));
    let (start, end) = day_window();
    let series = engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap();

    assert_eq!(series.len(), 24);
    let first_slot = market_offset().with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(series[0].timestamp, first_slot);
    assert_eq!(series[0].value, "10.0");
    assert_eq!(series[1].value, "10.0");
    for point in &series[2..] {
        assert_eq!(point.value, "11.0");
    }

    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(FsArchiveStore::new(dir.path()), MergePolicy::Union);
    archiver.merge_run("SE3", &series).await.unwrap();

    let store = FsArchiveStore::new(dir.path());
    let day = store
        .read("SE3", &Partition::day("2024-01-01"))
        .await
        .unwrap();
    assert_eq!(day, series, "day partition should hold the sorted series");

    let month = store
        .read("SE3", &Partition::month("2024-01"))
        .await
        .unwrap();
    assert_eq!(month.len(), 24);
    let year = store.read("SE3", &Partition::year("2024")).await.unwrap();
    assert_eq!(year.len(), 24);
}

#[tokio::test]
async fn republication_with_lower_rank_wins() {
    let engine = engine(CannedProvider::new(REPUBLISHED_DAY));
    let (start, end) = day_window();
    let series = engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap();

    assert_eq!(series.len(), 24);
    for point in &series {
        assert_eq!(point.value, "42.0");
    }
}

#[tokio::test]
async fn acknowledgement_body_yields_empty_series() {
    let body = r#"<Acknowledgement_MarketDocument>
  <Reason><code>999</code><text>No matching data found</text></Reason>
</Acknowledgement_MarketDocument>"#;
    let engine = engine(CannedProvider::new(body));
    let (start, end) = day_window();
    let series = engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap();
    assert!(series.is_empty());
}

#[tokio::test]
async fn long_windows_are_split_into_fourteen_day_requests() {
    let provider = CannedProvider::new(SPARSE_DAY);
    let engine = engine(provider);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

    engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap();

    // 30 days -> 14 + 14 + 2
    assert_eq!(engine_calls(&engine), 3);
}

fn engine_calls(engine: &ReconciliationEngine<CannedProvider>) -> usize {
    engine.provider().calls.load(Ordering::SeqCst)
}

#[tokio::test]
async fn transport_failure_aborts_or_skips_by_policy() {
    let engine = engine(DownProvider);
    let (start, end) = day_window();

    let err = engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 503, .. }));

    let series = engine
        .run(&se3(), start, end, TransportPolicy::SkipWindow)
        .await
        .unwrap();
    assert!(series.is_empty());
}

#[tokio::test]
async fn rerunning_the_same_window_does_not_change_the_archive() {
    let engine = engine(CannedProvider::new(SPARSE_DAY));
    let (start, end) = day_window();
    let series = engine
        .run(&se3(), start, end, TransportPolicy::Fail)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let archiver = Archiver::new(FsArchiveStore::new(dir.path()), MergePolicy::Union);
    archiver.merge_run("SE3", &series).await.unwrap();
    let store = FsArchiveStore::new(dir.path());
    let first = store
        .read("SE3", &Partition::day("2024-01-01"))
        .await
        .unwrap();

    archiver.merge_run("SE3", &series).await.unwrap();
    let second = store
        .read("SE3", &Partition::day("2024-01-01"))
        .await
        .unwrap();
    assert_eq!(first, second);
}
