//! The unified error type for whole-run failures.
//!
//! Per-fragment and per-sub-window failures never reach this type: they are
//! logged and recovered where they happen (see `reconcile` and the provider
//! document decoder). What remains are the failures that must abort an
//! ingestion run and exit non-zero.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::config::SettingsError;
use crate::providers::{ProviderInitError, TransportError};
use crate::stats::StatsError;

#[derive(Debug, Error)]
pub enum Error {
    /// The upstream API could not be reached or answered non-2xx.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The provider could not be constructed (missing credential, client).
    #[error("provider setup failed: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// Archive read or write failed; no partial partition was left behind.
    #[error("persistence error: {0}")]
    Persistence(#[from] ArchiveError),

    /// Statistics could not be computed or recorded.
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),

    /// The settings file was unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] SettingsError),

    /// A zone code not present in the configured registry.
    #[error("unknown price area '{0}'")]
    UnknownPriceArea(String),
}
