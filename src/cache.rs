use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// How long a snapshot counts as fresh. Advisory only: a stale snapshot is
/// still served, the age is just logged on read.
pub const CACHE_FRESHNESS_SECS: i64 = 60 * 60 * 6;

/// One complete, timestamped result of a roster sweep. Items keep the
/// provider-native JSON shape; normalization happens on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub timestamp: i64,
    #[serde(default)]
    pub videos: Vec<Value>,
}

impl CacheSnapshot {
    /// Stamp a finished sweep with the current time. The timestamp marks
    /// the moment retrieval completed, never an earlier point.
    pub fn now(videos: Vec<Value>) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            videos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn age_secs(&self) -> i64 {
        Utc::now().timestamp() - self.timestamp
    }

    pub fn is_fresh(&self) -> bool {
        self.age_secs() < CACHE_FRESHNESS_SECS
    }
}

/// Disk-backed snapshot store.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted snapshot. Fails soft: a missing, unreadable or
    /// malformed file is indistinguishable from no prior run.
    pub fn load(&self) -> CacheSnapshot {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!("📂 No readable cache file at {}", self.path.display());
                return CacheSnapshot::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "⚠️ Ignoring malformed cache file {}: {}",
                    self.path.display(),
                    e
                );
                CacheSnapshot::default()
            }
        }
    }

    /// Persist a snapshot, replacing prior content wholesale. The JSON is
    /// written to a sibling temp file and renamed over the target, so the
    /// file on disk is always either the old or the new complete snapshot.
    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            "💾 Saved snapshot of {} videos to {}",
            snapshot.videos.len(),
            self.path.display()
        );
        Ok(())
    }
}
