//! Filesystem-backed archive store.
//!
//! Layout under the archive root mirrors the published site:
//!
//! ```text
//! <root>/<area>/<YYYY>/index.json
//! <root>/<area>/<YYYY>/<MM>/index.json
//! <root>/<area>/<YYYY>/<MM>/<DD>/index.json
//! <root>/<area>/latest/index.json
//! <root>/<area>/<YYYY>/stats.json
//! ```
//!
//! Writes go to a temporary sibling file first and are renamed into place,
//! so readers never observe a partially written partition.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::archive::{ArchiveError, ArchiveStore, Partition};
use crate::models::price_point::PricePoint;
use crate::stats::DayStatistics;

pub struct FsArchiveStore {
    root: PathBuf,
}

impl FsArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn partition_path(&self, area: &str, partition: &Partition) -> PathBuf {
        self.root.join(area).join(partition.relative_path())
    }

    fn stats_path(&self, area: &str, year: &str) -> PathBuf {
        self.root.join(area).join(year).join("stats.json")
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Vec<T>, ArchiveError> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| ArchiveError::Decode {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ArchiveError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn write_json<T: serde::Serialize>(
        path: &Path,
        records: &[T],
    ) -> Result<(), ArchiveError> {
        let io_err = |source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let encoded = serde_json::to_vec(records).map_err(ArchiveError::Encode)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &encoded).await.map_err(io_err)?;
        fs::rename(&tmp, path).await.map_err(io_err)
    }

    /// Reads the per-day statistics recorded for one year; absent files
    /// read as empty.
    pub async fn read_year_statistics(
        &self,
        area: &str,
        year: &str,
    ) -> Result<Vec<DayStatistics>, ArchiveError> {
        Self::read_json(&self.stats_path(area, year)).await
    }

    /// Overwrites the per-day statistics file for one year.
    pub async fn write_year_statistics(
        &self,
        area: &str,
        year: &str,
        stats: &[DayStatistics],
    ) -> Result<(), ArchiveError> {
        Self::write_json(&self.stats_path(area, year), stats).await
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn read(
        &self,
        area: &str,
        partition: &Partition,
    ) -> Result<Vec<PricePoint>, ArchiveError> {
        Self::read_json(&self.partition_path(area, partition)).await
    }

    async fn write(
        &self,
        area: &str,
        partition: &Partition,
        points: &[PricePoint],
    ) -> Result<(), ArchiveError> {
        Self::write_json(&self.partition_path(area, partition), points).await
    }
}
