//! In-memory key-value store

use crossbeam_channel::Receiver;
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};

use super::{KeyValueStore, KvChange, Subscribers};
use crate::error::Result;

/// Volatile store, used when nothing should outlive the process
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: RwLock<Map<String, Value>>,
    subscribers: Subscribers,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        self.subscribers.publish(key, &value);
        Ok(())
    }

    fn subscribe(&self) -> Receiver<KvChange> {
        self.subscribers.subscribe()
    }
}
