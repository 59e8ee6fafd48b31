use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Parses a CLI datetime. Full RFC 3339 is preferred; a bare date is
/// accepted and taken as midnight UTC.
pub fn parse_utc_datetime(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|err| {
        raw.parse::<NaiveDate>()
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|_| err)
    })
}

pub fn parse_naive_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    raw.parse::<NaiveDate>()
}
