//! Decoding of `Publication_MarketDocument` responses.
//!
//! Decoding runs in two stages so failures stay as local as the data that
//! caused them: the whole body deserializes into loosely typed XML structs
//! (failure here is a [`ParseError`] and the window yields nothing), then
//! each series/period pair is structured into a typed [`RawFragment`]
//! (failure here is a [`StructuringError`] and only that fragment is lost).

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::models::fragment::{DataPoint, RawFragment, TimeInterval};
use crate::models::price_point::market_offset;

/// The response body does not decode into the expected document shape.
///
/// The platform answers windows without data with an acknowledgement
/// document instead of a publication; both that and malformed XML land here.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("document has no TimeSeries container")]
    MissingSeries,
}

/// One series failed to map into [`RawFragment`] fields.
#[derive(Debug, Error)]
pub enum StructuringError {
    #[error("series is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid timestamp '{raw}': {source}")]
    Timestamp {
        raw: String,
        source: chrono::ParseError,
    },

    #[error("invalid price '{0}'")]
    Price(String),

    #[error("invalid position '{0}'")]
    Position(String),

    #[error("invalid classification sequence '{0}'")]
    Classification(String),
}

// Loosely typed mirror of the XML. Every leaf is optional so a missing
// field fails the one series it belongs to during structuring, not the
// whole document during deserialization.

#[derive(Debug, Deserialize)]
struct PublicationDocumentXml {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeriesXml>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesXml {
    #[serde(rename = "currency_Unit.name")]
    currency: Option<String>,
    #[serde(rename = "price_Measure_Unit.name")]
    energy_unit: Option<String>,
    #[serde(rename = "classificationSequence_AttributeInstanceComponent.position")]
    classification: Option<String>,
    #[serde(rename = "Period", default)]
    periods: Vec<PeriodXml>,
}

#[derive(Debug, Deserialize)]
struct PeriodXml {
    #[serde(rename = "timeInterval")]
    time_interval: Option<TimeIntervalXml>,
    resolution: Option<String>,
    #[serde(rename = "Point", default)]
    points: Vec<PointXml>,
}

#[derive(Debug, Deserialize)]
struct TimeIntervalXml {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointXml {
    position: Option<String>,
    #[serde(rename = "price.amount")]
    price: Option<String>,
}

/// Decodes one response body. Each published period becomes its own
/// fragment; per-fragment structuring failures are returned in place so the
/// caller can log them and keep the rest of the batch.
pub fn decode_document(
    body: &str,
) -> Result<Vec<Result<RawFragment, StructuringError>>, ParseError> {
    let document: PublicationDocumentXml = quick_xml::de::from_str(body)?;
    if document.time_series.is_empty() {
        return Err(ParseError::MissingSeries);
    }

    let mut fragments = Vec::new();
    for series in document.time_series {
        if series.periods.is_empty() {
            fragments.push(Err(StructuringError::MissingField("Period")));
            continue;
        }
        for period in &series.periods {
            fragments.push(structure_fragment(&series, period));
        }
    }
    Ok(fragments)
}

fn structure_fragment(
    series: &TimeSeriesXml,
    period: &PeriodXml,
) -> Result<RawFragment, StructuringError> {
    let currency = require(series.currency.as_deref(), "currency_Unit.name")?;
    let energy_unit = require(series.energy_unit.as_deref(), "price_Measure_Unit.name")?;
    let classification = series
        .classification
        .as_deref()
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| StructuringError::Classification(raw.to_string()))
        })
        .transpose()?;

    let interval = period
        .time_interval
        .as_ref()
        .ok_or(StructuringError::MissingField("timeInterval"))?;
    let resolution = require(period.resolution.as_deref(), "resolution")?;
    let start = parse_timestamp(require(interval.start.as_deref(), "timeInterval.start")?)?;
    let end = parse_timestamp(require(interval.end.as_deref(), "timeInterval.end")?)?;

    let mut data_points = Vec::with_capacity(period.points.len());
    for point in &period.points {
        let raw_position = require(point.position.as_deref(), "position")?;
        let position = raw_position
            .parse::<u32>()
            .map_err(|_| StructuringError::Position(raw_position.to_string()))?;
        let raw_price = require(point.price.as_deref(), "price.amount")?;
        let price: Decimal = raw_price
            .parse()
            .map_err(|_| StructuringError::Price(raw_price.to_string()))?;
        data_points.push(DataPoint { position, price });
    }

    Ok(RawFragment {
        currency: currency.to_string(),
        energy_unit: energy_unit.to_string(),
        interval: TimeInterval { start, end },
        resolution: resolution.to_string(),
        classification,
        data_points,
    })
}

fn require<'a>(
    field: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, StructuringError> {
    field.ok_or(StructuringError::MissingField(name))
}

/// Documents carry minute-precision UTC instants such as
/// `2024-01-01T23:00Z`; full RFC 3339 is accepted as well. The result is
/// shifted into the market's fixed UTC+1 offset.
fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, StructuringError> {
    let instant = DateTime::parse_from_rfc3339(raw).or_else(|_| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
            .map(|naive| naive.and_utc().fixed_offset())
    });
    match instant {
        Ok(instant) => Ok(instant.with_timezone(&market_offset())),
        Err(source) => Err(StructuringError::Timestamp {
            raw: raw.to_string(),
            source,
        }),
    }
}
