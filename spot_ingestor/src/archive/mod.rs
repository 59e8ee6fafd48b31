//! Partitioned, durable storage of reconciled price points.
//!
//! The archive is the only durable entity in the pipeline. Each price area
//! owns one partition per calendar day, month, and year it has data for,
//! plus a rolling `latest` partition for live display. A partition is read
//! wholesale before a merge and rewritten wholesale after it; merges are
//! read-modify-write, so writes to one partition must be serialized (the
//! pipeline drives areas sequentially).

pub mod fs_store;
pub mod merge;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::price_point::PricePoint;

pub use fs_store::FsArchiveStore;
pub use merge::{MergePolicy, merge};

/// Partition granularities of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
    Year,
    Latest,
}

impl Granularity {
    /// strftime pattern of the partition key; `Latest` has no calendar key.
    pub fn key_format(self) -> Option<&'static str> {
        match self {
            Granularity::Day => Some("%Y-%m-%d"),
            Granularity::Month => Some("%Y-%m"),
            Granularity::Year => Some("%Y"),
            Granularity::Latest => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "daily",
            Granularity::Month => "monthly",
            Granularity::Year => "yearly",
            Granularity::Latest => "latest",
        }
    }
}

/// One unit of archive storage: a granularity plus its calendar key
/// (`2024-01-01`, `2024-01`, `2024`, or the singleton `latest`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub granularity: Granularity,
    pub key: String,
}

impl Partition {
    pub fn day(key: impl Into<String>) -> Self {
        Self {
            granularity: Granularity::Day,
            key: key.into(),
        }
    }

    pub fn month(key: impl Into<String>) -> Self {
        Self {
            granularity: Granularity::Month,
            key: key.into(),
        }
    }

    pub fn year(key: impl Into<String>) -> Self {
        Self {
            granularity: Granularity::Year,
            key: key.into(),
        }
    }

    pub fn latest() -> Self {
        Self {
            granularity: Granularity::Latest,
            key: "latest".to_string(),
        }
    }

    /// Path of the partition's index file relative to an area directory:
    /// dashes in the calendar key become directory separators, so day
    /// `2024-01-02` lives at `2024/01/02/index.json`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        match self.granularity {
            Granularity::Latest => path.push("latest"),
            _ => {
                for segment in self.key.split('-') {
                    path.push(segment);
                }
            }
        }
        path.push("index.json");
        path
    }
}

/// Archive read/write failures. Fatal for the merge that hit them; the
/// atomic write discipline of the store guarantees no partially written
/// partition is ever visible.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed partition file {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode partition: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Storage seam of the pipeline. Implementations must read absent
/// partitions as empty and must not leave partial files behind on a failed
/// write.
#[async_trait]
pub trait ArchiveStore {
    /// Reads the persisted record set for one partition, sorted as written.
    async fn read(
        &self,
        area: &str,
        partition: &Partition,
    ) -> Result<Vec<PricePoint>, ArchiveError>;

    /// Overwrites one partition with a full record set, already sorted and
    /// deduplicated by the caller.
    async fn write(
        &self,
        area: &str,
        partition: &Partition,
        points: &[PricePoint],
    ) -> Result<(), ArchiveError>;
}
