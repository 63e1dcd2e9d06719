//! File-backed key-value store
//!
//! Keeps all values in one pretty-printed JSON file, rewritten on every set.

use crossbeam_channel::Receiver;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

use super::{KeyValueStore, KvChange, Subscribers};
use crate::error::Result;
use crate::helpers::get_or_create_data_dir;

/// Store persisted to a JSON file
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
    subscribers: Subscribers,
}

fn load_values(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    Ok(serde_json::from_str(&content)?)
}

impl FileKvStore {
    /// Open (or start) a store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = load_values(&path)?;
        debug!(path = ?path, keys = values.len(), "Opened key-value store");
        Ok(Self {
            path,
            values: RwLock::new(values),
            subscribers: Subscribers::default(),
        })
    }

    /// Open a store named `filename` in the data directory
    pub fn open_in_data_dir(filename: &str) -> Result<Self> {
        Self::open(get_or_create_data_dir()?.join(filename))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        {
            let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
            let previous = values.insert(key.to_string(), value.clone());
            if let Err(e) = self.save(&values) {
                warn!(error = %e, path = ?self.path, key, "Failed to persist value");
                match previous {
                    Some(previous) => values.insert(key.to_string(), previous),
                    None => values.shift_remove(key),
                };
                return Err(e);
            }
        }
        self.subscribers.publish(key, &value);
        Ok(())
    }

    fn subscribe(&self) -> Receiver<KvChange> {
        self.subscribers.subscribe()
    }
}
