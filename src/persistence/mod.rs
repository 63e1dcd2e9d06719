//! Persistence Port
//!
//! A small key-value port for client-side toggles. Components take an
//! `Arc<dyn KeyValueStore>` instead of reaching for storage directly.

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use crossbeam_channel::{Receiver, Sender};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

/// A key changed value
#[derive(Debug, Clone, PartialEq)]
pub struct KvChange {
    pub key: String,
    pub value: Value,
}

/// Key-value persistence for UI toggles
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Receive every later change
    fn subscribe(&self) -> Receiver<KvChange>;

    /// Read a boolean toggle
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }
}

/// Fan-out of change events to subscribers; dropped receivers are pruned
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<KvChange>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> Receiver<KvChange> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub(crate) fn publish(&self, key: &str, value: &Value) {
        let change = KvChange {
            key: key.to_string(),
            value: value.clone(),
        };
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}
