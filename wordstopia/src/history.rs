use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storage key, kept from the web build of the app.
pub const HISTORY_KEY: &str = "wordstopia_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub word: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
}

/// Durable storage for the recent-searches list.
///
/// Storage is dumb on purpose: it persists and restores whatever sequence it
/// is handed and owns no in-memory state. Last write wins; none of the
/// operations report errors to the caller.
pub trait HistoryStore: Send + Sync {
    /// Returns the persisted sequence, or empty when absent or unreadable.
    fn load(&self) -> Vec<HistoryItem>;
    /// Replaces the persisted sequence with `items`.
    fn save(&self, items: &[HistoryItem]);
    /// Removes the persisted entry entirely.
    fn clear(&self);
}

/// File-backed store: one JSON document named after the storage key.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{HISTORY_KEY}.json")),
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Vec<HistoryItem> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != ErrorKind::NotFound {
                    warn!(path = %self.path.display(), %error, "failed to read history");
                }
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to parse history");
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[HistoryItem]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "failed to serialize history");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), %error, "failed to create history directory");
                return;
            }
        }
        if let Err(error) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), %error, "failed to write history");
        }
    }

    fn clear(&self) {
        if let Err(error) = fs::remove_file(&self.path) {
            if error.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), %error, "failed to remove history");
            }
        }
    }
}
