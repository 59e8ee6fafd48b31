//! Bidding-zone registry.

use serde::{Deserialize, Serialize};

/// A market region with its own price series: a short code used for CLI
/// selection and archive paths, plus the upstream EIC area identifier used
/// in API queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceArea {
    /// Short zone code, e.g. `"SE3"`.
    pub code: String,
    /// Upstream area identifier, e.g. `"10Y1001A1001A46L"`.
    pub eic_code: String,
}

impl PriceArea {
    pub fn new(code: impl Into<String>, eic_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            eic_code: eic_code.into(),
        }
    }
}

/// The Swedish bidding zones the service tracks out of the box.
pub fn default_areas() -> Vec<PriceArea> {
    vec![
        PriceArea::new("SE1", "10Y1001A1001A44P"),
        PriceArea::new("SE2", "10Y1001A1001A45N"),
        PriceArea::new("SE3", "10Y1001A1001A46L"),
        PriceArea::new("SE4", "10Y1001A1001A47J"),
    ]
}
