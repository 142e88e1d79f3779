//! Report storage trait and implementations.
//!
//! Provides the `ReportStore` trait for persisting computed records, a
//! `FileReportStore` writing one file per submitter, and an
//! `InMemoryReportStore` for development and testing.

use crate::models::MetricsRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during report store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on report store")]
    LockError,

    /// Filesystem failure.
    #[error("Failed to write report to {}: {source}", .path.display())]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded.
    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Content written for each stored report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    /// Pretty-printed JSON of the full record.
    #[default]
    Json,
    /// The rendered plain-text report.
    Text,
}

impl FromStr for StorageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("Unknown storage format: {other}")),
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// # Examples
///
/// ```
/// use shared::storage::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Mary-Jane O'Neil"), "Mary_Jane_O_Neil");
/// assert_eq!(sanitize_identifier("../etc/passwd"), "___etc_passwd");
/// ```
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Longest sanitized name used in a file name, keeping the full
/// `<name>_data.txt` within common filesystem limits.
pub const MAX_FILE_STEM_LEN: usize = 200;

/// Trait for report persistence.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists a record and its rendered report.
    ///
    /// A later save for the same submitter replaces the earlier one.
    /// Returns a description of where the report was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save(&self, record: &MetricsRecord, report: &str) -> Result<String, StoreError>;
}

/// Stores each report as `<sanitized name>_data.txt` in a directory.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
    format: StorageFormat,
}

impl FileReportStore {
    /// Creates a store writing into `dir` with the given content format.
    ///
    /// The directory is created on first save if it does not exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: StorageFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Returns the path a record for `name` is written to.
    ///
    /// Names longer than [`MAX_FILE_STEM_LEN`] after sanitizing are cut to
    /// that length, so two such names sharing a prefix map to the same file.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        let mut stem = sanitize_identifier(name);
        // Sanitized names are ASCII, so any byte index is a char boundary.
        stem.truncate(MAX_FILE_STEM_LEN);
        self.dir.join(format!("{stem}_data.txt"))
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn save(&self, record: &MetricsRecord, report: &str) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let contents = match self.format {
            StorageFormat::Json => serde_json::to_string_pretty(record)?,
            StorageFormat::Text => report.to_string(),
        };

        let path = self.path_for(&record.name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), format = ?self.format, "Report written");
        Ok(path.display().to_string())
    }
}

/// A stored report held in memory.
#[derive(Debug, Clone)]
pub struct StoredReport {
    /// The stored record.
    pub record: MetricsRecord,
    /// The rendered report text.
    pub report: String,
}

/// In-memory report store implementation, keyed by sanitized name.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: Arc<RwLock<HashMap<String, StoredReport>>>,
}

impl InMemoryReportStore {
    /// Creates a new empty in-memory report store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory report store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the report stored for `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn get(&self, name: &str) -> Result<Option<StoredReport>, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::LockError)?;
        Ok(reports.get(&sanitize_identifier(name)).cloned())
    }

    /// Returns the number of stored reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn count(&self) -> Result<usize, StoreError> {
        let reports = self.reports.read().map_err(|_| StoreError::LockError)?;
        Ok(reports.len())
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, record: &MetricsRecord, report: &str) -> Result<String, StoreError> {
        let key = sanitize_identifier(&record.name);
        let mut reports = self.reports.write().map_err(|_| StoreError::LockError)?;
        reports.insert(
            key.clone(),
            StoredReport {
                record: record.clone(),
                report: report.to_string(),
            },
        );
        Ok(format!("memory://{key}"))
    }
}
