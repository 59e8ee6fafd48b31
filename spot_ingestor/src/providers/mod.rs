//! Provider abstraction for upstream price sources.
//!
//! [`PriceProvider`] is the transport seam of the pipeline: it fetches the
//! raw publication document for one area and window and nothing more.
//! Decoding stays in the core so a provider can be swapped (or mocked in
//! tests) without touching reconciliation.

pub mod entsoe;
pub mod errors;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use errors::{ProviderInitError, TransportError};

#[async_trait]
pub trait PriceProvider {
    /// Fetches the raw publication document covering `[start, end)` for one
    /// upstream area identifier.
    async fn fetch_window(
        &self,
        area_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String, TransportError>;
}
