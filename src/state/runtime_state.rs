//! Runtime State
//!
//! Transient runtime data (queue items, counters) that rides along with the
//! configuration payload but is not part of the configuration itself.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Receiver for the runtime slices split off a configuration payload
pub trait RuntimeSink: Send + Sync {
    /// Record the total number of history entries on the server
    fn set_history_count(&self, count: u64);

    /// Append items under a topic
    fn add_all(&self, topic: &str, items: Vec<Value>);
}

#[derive(Debug, Default)]
struct RuntimeInner {
    history_count: u64,
    topics: BTreeMap<String, Vec<Value>>,
}

/// In-memory runtime state
#[derive(Debug, Default)]
pub struct RuntimeState {
    inner: RwLock<RuntimeInner>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_count(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history_count
    }

    /// Items stored under a topic, oldest first
    pub fn items(&self, topic: &str) -> Vec<Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of items stored under a topic
    pub fn len(&self, topic: &str) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.history_count = 0;
        inner.topics.clear();
    }
}

impl RuntimeSink for RuntimeState {
    fn set_history_count(&self, count: u64) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .history_count = count;
    }

    fn add_all(&self, topic: &str, items: Vec<Value>) {
        tracing::debug!(topic, count = items.len(), "Adding runtime items");
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .entry(topic.to_string())
            .or_default()
            .extend(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_all_appends_per_topic() {
        let state = RuntimeState::new();
        state.add_all("queue", vec![json!({ "id": "a" })]);
        state.add_all("queue", vec![json!({ "id": "b" }), json!({ "id": "c" })]);
        state.add_all("done", vec![json!(1)]);

        assert_eq!(state.len("queue"), 3);
        assert_eq!(state.items("queue")[2], json!({ "id": "c" }));
        assert_eq!(state.len("done"), 1);
        assert_eq!(state.len("missing"), 0);
    }

    #[test]
    fn history_count_and_clear() {
        let state = RuntimeState::new();
        state.set_history_count(42);
        state.add_all("queue", vec![json!(1)]);
        assert_eq!(state.history_count(), 42);

        state.clear();
        assert_eq!(state.history_count(), 0);
        assert!(state.items("queue").is_empty());
    }
}
