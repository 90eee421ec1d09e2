use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to read checkpoint {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("checkpoint {path:?} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to serialize checkpoint: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write checkpoint: {0}")]
    Write(#[from] PersistError),
}

/// Resumption state. `downloaded_stylesheets` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub last_listing_url: Url,
    pub last_article_id: Option<String>,
    pub downloaded_stylesheets: BTreeSet<String>,
}

impl ProgressRecord {
    pub fn starting_at(listing_url: Url) -> Self {
        Self {
            last_listing_url: listing_url,
            last_article_id: None,
            downloaded_stylesheets: BTreeSet::new(),
        }
    }
}

/// On-disk shape of the checkpoint file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProgress {
    #[serde(default)]
    last_url: Option<String>,
    #[serde(default)]
    last_link_number: Option<String>,
    #[serde(default)]
    downloaded_css: Vec<String>,
}

/// Listing root filtered to posts before `now`, e.g. `?before=2026-10-18T12%3A30%3A00Z`.
pub fn start_url(channel_url: &Url, now: DateTime<Utc>) -> Url {
    let mut url = channel_url.clone();
    let stamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    url.query_pairs_mut().append_pair("before", &stamp);
    url
}

#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted record, or a fresh one starting at `default_start` if none exists.
    pub fn load(&self, default_start: Url) -> Result<ProgressRecord, CheckpointError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_info!("No checkpoint at {:?}; starting at {}", self.path, default_start);
                return Ok(ProgressRecord::starting_at(default_start));
            }
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let stored: StoredProgress =
            serde_json::from_str(&content).map_err(|err| self.corrupt(err.to_string()))?;

        let last_listing_url = match stored.last_url {
            Some(raw) => Url::parse(&raw).map_err(|err| self.corrupt(format!("last_url: {err}")))?,
            None => default_start,
        };

        let record = ProgressRecord {
            last_listing_url,
            last_article_id: stored.last_link_number,
            downloaded_stylesheets: stored.downloaded_css.into_iter().collect(),
        };
        engine_info!(
            "Resuming at {} (last article {:?}, {} stylesheets cached)",
            record.last_listing_url,
            record.last_article_id,
            record.downloaded_stylesheets.len()
        );
        Ok(record)
    }

    /// Overwrites the checkpoint file atomically.
    pub fn save(&self, record: &ProgressRecord) -> Result<(), CheckpointError> {
        let stored = StoredProgress {
            last_url: Some(record.last_listing_url.to_string()),
            last_link_number: record.last_article_id.clone(),
            downloaded_css: record.downloaded_stylesheets.iter().cloned().collect(),
        };
        let content = serde_json::to_string(&stored)?;

        let (dir, filename) = self.split_path();
        AtomicFileWriter::new(dir).write(&filename, content)?;
        engine_debug!("Checkpoint saved: {}", content_summary(record));
        Ok(())
    }

    fn split_path(&self) -> (PathBuf, String) {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "progress.json".to_string());
        (dir, filename)
    }

    fn corrupt(&self, message: String) -> CheckpointError {
        CheckpointError::Corrupt {
            path: self.path.clone(),
            message,
        }
    }
}

fn content_summary(record: &ProgressRecord) -> String {
    format!(
        "url={} article={:?} css={}",
        record.last_listing_url,
        record.last_article_id,
        record.downloaded_stylesheets.len()
    )
}

/// The run's single checkpoint: the record plus the store it is written through.
///
/// Every mutation persists before returning, so a failed write surfaces at the
/// exact state change that could not be made durable.
#[derive(Debug)]
pub struct Checkpoint {
    store: ProgressStore,
    record: ProgressRecord,
}

impl Checkpoint {
    pub fn open(store: ProgressStore, default_start: Url) -> Result<Self, CheckpointError> {
        let record = store.load(default_start)?;
        Ok(Self { store, record })
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn set_position(
        &mut self,
        listing_url: Url,
        last_article_id: Option<String>,
    ) -> Result<(), CheckpointError> {
        self.record.last_listing_url = listing_url;
        self.record.last_article_id = last_article_id;
        self.store.save(&self.record)
    }

    pub fn has_stylesheet(&self, name: &str) -> bool {
        self.record.downloaded_stylesheets.contains(name)
    }

    pub fn add_stylesheet(&mut self, name: &str) -> Result<(), CheckpointError> {
        if self.record.downloaded_stylesheets.insert(name.to_string()) {
            self.store.save(&self.record)?;
        }
        Ok(())
    }
}
