//! Config Store
//!
//! Owner of the aggregate `ConfigState`. Reads and writes go through dotted-path
//! keys, collections change through typed patches, and the remote load is
//! coalesced so at most one fetch is in flight.
//!
//! ```text
//! load_config ─► ConfigSource::fetch ─► history_count/queue ─► RuntimeSink
//!                                   └─► remaining keys ─► merge_remote ─► ConfigState
//! ```

use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::constants::{
    DEFAULT_LOAD_TIMEOUT_SECS, HISTORY_COUNT_FIELD, QUEUE_FIELD, QUEUE_TOPIC,
};
use crate::domain::{AppSettings, ConfigState, DlField, Preset};
use crate::error::{CancelledSnafu, Error, ReadOnlySnafu, Result};
use crate::services::{ConfigSource, HttpConfigSource};
use crate::settings::ClientSettings;
use crate::state::patch::{self, FeaturePatch, PatchOutcome};
use crate::state::path;
use crate::state::runtime_state::RuntimeSink;

/// Shared handle to the live aggregate
pub type SharedConfig = Arc<RwLock<ConfigState>>;

/// How a `load_config` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The remote payload was merged
    Loaded,
    /// Another load was in flight; nothing was done
    AlreadyLoading,
    /// Fetch, decode or merge failed; the previous state was kept
    Failed,
}

/// Configuration store shared by every consumer of the client
///
/// Cloning is cheap and clones share the same state.
#[derive(Clone)]
pub struct ConfigStore {
    state: SharedConfig,
    source: Arc<dyn ConfigSource>,
    runtime: Arc<dyn RuntimeSink>,
    load_timeout: Duration,
    /// Token of the load in flight, if any
    cancel: Arc<Mutex<Option<CancellationToken>>>,
}

/// Resets the loading flags when a load ends, including when its future is dropped
struct LoadingGuard<'a> {
    store: &'a ConfigStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.lock_cancel().take();
        let mut state = self.store.write();
        state.is_loaded = true;
        state.is_loading = false;
    }
}

impl ConfigStore {
    /// Create a store seeded with the hard-coded defaults
    pub fn new(source: Arc<dyn ConfigSource>, runtime: Arc<dyn RuntimeSink>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConfigState::new())),
            source,
            runtime,
            load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
            cancel: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a store that loads over HTTP according to `settings`
    pub fn from_settings(settings: &ClientSettings, runtime: Arc<dyn RuntimeSink>) -> Result<Self> {
        let source = HttpConfigSource::from_settings(settings)?;
        Ok(Self::new(Arc::new(source), runtime).with_load_timeout(settings.load_timeout()))
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, ConfigState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConfigState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancel(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Path Access ====================

    /// Read a value by dotted-path key, or `default` when it is absent or null
    ///
    /// `is_loaded` and `is_loading` read the lifecycle flags.
    pub fn get(&self, key: &str, default: Value) -> Value {
        let state = self.read();
        match state.lifecycle_value(key) {
            Some(flag) => flag,
            None => path::get_or(state.document(), key, default),
        }
    }

    /// Write a value by dotted-path key
    ///
    /// Any value is stored as written. The write is rejected, leaving the state
    /// untouched, when the parent is missing or the key is a lifecycle flag.
    pub fn add(&self, key: &str, value: Value) -> Result<()> {
        snafu::ensure!(!ConfigState::is_lifecycle_key(key), ReadOnlySnafu { key });
        path::set(self.write().document_mut(), key, value)?;
        debug!(key, "Config value set");
        Ok(())
    }

    /// Alias for `add`
    pub fn update(&self, key: &str, value: Value) -> Result<()> {
        self.add(key, value)
    }

    // ==================== Aggregate Access ====================

    /// The live aggregate; readers see every later mutation
    pub fn get_all(&self) -> SharedConfig {
        self.state.clone()
    }

    /// An owned copy of the current aggregate
    pub fn snapshot(&self) -> ConfigState {
        self.read().clone()
    }

    /// Merge every key of `record`, in order, then mark the state loaded
    ///
    /// All keys are applied or none are. Lifecycle keys are skipped, and while a
    /// load is in flight `is_loaded` is left for the load to settle.
    pub fn set_all(&self, record: Map<String, Value>) -> Result<()> {
        let mut state = self.write();
        let mut document = state.document().clone();
        for (key, value) in record {
            if ConfigState::is_lifecycle_key(&key) {
                warn!(key = %key, "Skipping lifecycle flag in record");
                continue;
            }
            path::set(&mut document, &key, value)?;
        }
        *state.document_mut() = document;
        if !state.is_loading {
            state.is_loaded = true;
        }
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.read().is_loaded
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    pub fn paused(&self) -> bool {
        self.read().paused()
    }

    pub fn app(&self) -> AppSettings {
        self.read().app()
    }

    pub fn presets(&self) -> Vec<Preset> {
        self.read().presets()
    }

    pub fn dl_fields(&self) -> Vec<DlField> {
        self.read().dl_fields()
    }

    // ==================== Collection Patches ====================

    /// Apply a string-addressed patch
    ///
    /// Unknown feature/action combinations are `Ignored`; a payload that does
    /// not decode for a known combination is an error.
    pub fn patch(&self, feature: &str, action: &str, data: Value) -> Result<PatchOutcome> {
        match FeaturePatch::decode(feature, action, data)? {
            Some(patch) => Ok(self.apply_patch(patch)),
            None => {
                debug!(feature, action, "Ignoring unsupported patch");
                Ok(PatchOutcome::Ignored)
            }
        }
    }

    /// Apply a typed patch
    pub fn apply_patch(&self, patch: FeaturePatch) -> PatchOutcome {
        let (feature, action) = (patch.feature(), patch.action());
        let outcome = patch::apply(&mut self.write(), patch);
        if outcome == PatchOutcome::NotFound {
            debug!(%feature, %action, "Patch target not found");
        }
        outcome
    }

    // ==================== Remote Load ====================

    /// Load the remote configuration and merge it into the state
    ///
    /// Never fails outward: errors are logged and the store always ends up
    /// loaded, keeping whatever state it had before.
    pub async fn load_config(&self) -> LoadOutcome {
        let cancel = {
            let mut state = self.write();
            if state.is_loading {
                debug!("Configuration load already in flight");
                return LoadOutcome::AlreadyLoading;
            }
            state.is_loaded = false;
            state.is_loading = true;

            let token = CancellationToken::new();
            *self.lock_cancel() = Some(token.clone());
            token
        };
        let _guard = LoadingGuard { store: self };

        match self.fetch_and_merge(&cancel).await {
            Ok(()) => {
                info!("Configuration loaded");
                LoadOutcome::Loaded
            }
            Err(e @ (Error::Timeout { .. } | Error::Cancelled { .. })) => {
                warn!(error = %e, "Configuration load aborted");
                LoadOutcome::Failed
            }
            Err(e) => {
                error!(error = %e, "Failed to load configuration");
                LoadOutcome::Failed
            }
        }
    }

    /// Cancel the load in flight; returns whether there was one
    pub fn cancel_load(&self) -> bool {
        match self.lock_cancel().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    async fn fetch_and_merge(&self, cancel: &CancellationToken) -> Result<()> {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                return CancelledSnafu { message: "configuration load" }.fail();
            }
            result = tokio::time::timeout(self.load_timeout, self.source.fetch()) => result,
        };

        let mut payload = fetched.map_err(|_| Error::Timeout {
            message: format!("configuration load exceeded {:?}", self.load_timeout),
        })??;

        self.forward_runtime_fields(&mut payload);
        let skipped = self.merge_remote(payload);
        if skipped > 0 {
            warn!(skipped, "Configuration merged with skipped keys");
        }
        Ok(())
    }

    /// Merge a remote payload key by key; returns how many keys were skipped
    ///
    /// A key that cannot be written is logged and dropped without affecting the
    /// others. Lifecycle flags are never taken from the payload.
    fn merge_remote(&self, payload: Map<String, Value>) -> usize {
        let mut state = self.write();
        let mut skipped = 0;
        for (key, value) in payload {
            if ConfigState::is_lifecycle_key(&key) {
                debug!(key = %key, "Ignoring lifecycle flag in payload");
                skipped += 1;
                continue;
            }
            if let Err(e) = path::set(state.document_mut(), &key, value) {
                warn!(error = %e, key = %key, "Skipping payload key");
                skipped += 1;
            }
        }
        skipped
    }

    /// Hand `history_count` and `queue` to the runtime sink and strip them
    fn forward_runtime_fields(&self, payload: &mut Map<String, Value>) {
        if let Some(raw) = payload.shift_remove(HISTORY_COUNT_FIELD) {
            match as_count(&raw) {
                Some(count) => self.runtime.set_history_count(count),
                None => warn!(value = %raw, "Ignoring non-numeric history_count"),
            }
        }

        if let Some(queue) = payload.shift_remove(QUEUE_FIELD) {
            let items = match queue {
                Value::Array(items) => items,
                Value::Object(items) => items.into_iter().map(|(_, item)| item).collect(),
                Value::Null => Vec::new(),
                other => vec![other],
            };
            self.runtime.add_all(QUEUE_TOPIC, items);
        }
    }
}

/// Any JSON number as a count; negatives clamp to zero, fractions truncate
fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|n| n.max(0.0) as u64))
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("ConfigStore")
            .field("is_loaded", &state.is_loaded)
            .field("is_loading", &state.is_loading)
            .field("keys", &state.document().len())
            .field("load_timeout", &self.load_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_PRESET_NAME;
    use crate::domain::DlFieldId;
    use crate::state::patch::{FieldPatch, PresetPatch};
    use crate::state::runtime_state::RuntimeState;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Scripted source: counts calls, can park until released
    #[derive(Default)]
    struct FakeSource {
        payload: Option<Value>,
        fail_status: Option<u16>,
        hang: bool,
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        gated: bool,
    }

    impl FakeSource {
        fn returning(payload: Value) -> Self {
            Self {
                payload: Some(payload),
                ..Self::default()
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                fail_status: Some(status),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ConfigSource for FakeSource {
        async fn fetch(&self) -> Result<Map<String, Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.entered.notify_one();
                self.release.notified().await;
            }
            if self.hang {
                std::future::pending::<()>().await;
            }
            if let Some(status) = self.fail_status {
                return Err(Error::Status {
                    status,
                    url: "http://test".to_string(),
                });
            }
            match self.payload.clone() {
                Some(Value::Object(map)) => Ok(map),
                _ => Err(Error::Invalid {
                    message: "no payload".to_string(),
                }),
            }
        }
    }

    fn store_with(source: FakeSource) -> (ConfigStore, Arc<FakeSource>, Arc<RuntimeState>) {
        let source = Arc::new(source);
        let runtime = Arc::new(RuntimeState::new());
        let store = ConfigStore::new(source.clone(), runtime.clone());
        (store, source, runtime)
    }

    fn idle_store() -> ConfigStore {
        store_with(FakeSource::default()).0
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn get_after_add_round_trips() {
        let store = idle_store();
        assert_eq!(store.get("paused", json!("d")), json!(false));
        assert_eq!(store.get("never_set", json!("d")), json!("d"));

        store.add("paused", json!(true)).expect("add");
        store.add("folders", json!(["music"])).expect("add");
        store.update("app.max_workers", json!(6)).expect("update");

        assert_eq!(store.get("paused", json!(false)), json!(true));
        assert!(store.paused());
        assert_eq!(store.get("folders", Value::Null), json!(["music"]));
        assert_eq!(store.get("app.max_workers", json!(0)), json!(6));
        assert_eq!(store.app().max_workers, 6);
    }

    #[test]
    fn add_rejects_bad_writes_without_changes() {
        let store = idle_store();
        let before = store.snapshot();

        let err = store.add("nope.child", json!(1)).expect_err("missing parent");
        assert!(matches!(err, Error::MissingParent { .. }));

        let err = store.add("is_loading", json!(true)).expect_err("lifecycle flag");
        assert!(matches!(err, Error::ReadOnly { .. }));

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.get("is_loading", Value::Null), json!(false));
        assert_eq!(store.get("is_loaded", Value::Null), json!(true));
    }

    #[test]
    fn any_value_round_trips_through_typed_fields() {
        let store = idle_store();

        store.add("paused", json!("yes")).expect("add");
        store.add("presets", json!("none")).expect("add");
        store.add("app.max_workers", json!(2.5)).expect("add");

        assert_eq!(store.get("paused", Value::Null), json!("yes"));
        assert_eq!(store.get("presets", Value::Null), json!("none"));
        assert_eq!(store.get("app.max_workers", Value::Null), json!(2.5));

        // typed views fall back to defaults
        assert!(!store.paused());
        assert!(store.presets().is_empty());
        assert_eq!(store.app().max_workers, AppSettings::default().max_workers);
    }

    #[test]
    fn replaced_parent_keeps_only_written_children() {
        let store = idle_store();
        store.add("app", json!({ "max_workers": 3 })).expect("add");

        assert_eq!(store.get("app.download_path", json!("d")), json!("d"));
        assert_eq!(store.get("app.max_workers", json!(0)), json!(3));
        assert_eq!(store.app().download_path, AppSettings::default().download_path);
        assert_eq!(store.app().max_workers, 3);
    }

    #[test]
    fn get_all_is_live() {
        let store = idle_store();
        let shared = store.get_all();
        store.add("app.basic_mode", json!(true)).expect("add");
        assert!(shared.read().expect("read").app().basic_mode);
    }

    #[test]
    fn set_all_merges_in_order_and_marks_loaded() {
        let store = idle_store();
        store.write().is_loaded = false;

        store
            .set_all(record(json!({
                "app": { "download_path": "/data", "max_workers": 3 },
                "app.max_workers": 4,
                "paused": true,
            })))
            .expect("set_all");

        let state = store.snapshot();
        assert!(state.is_loaded);
        assert!(state.paused());
        assert_eq!(state.app().download_path, "/data");
        assert_eq!(state.app().max_workers, 4);
        // replaced wholesale, then one child overwritten
        assert_eq!(store.get("app.temp_path", json!("none")), json!("none"));
    }

    #[test]
    fn set_all_is_all_or_nothing() {
        let store = idle_store();
        let before = store.snapshot();
        let result = store.set_all(record(json!({ "paused": true, "missing.child": 1 })));
        assert!(result.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn string_patches_follow_protocol() {
        let store = idle_store();

        let outcome = store
            .patch("dl_fields", "create", json!({ "id": 1, "name": "source" }))
            .expect("create");
        assert_eq!(outcome, PatchOutcome::Applied);
        assert_eq!(store.dl_fields().len(), 1);

        let outcome = store
            .patch("presets", "create", json!({ "name": "x" }))
            .expect("ignored");
        assert_eq!(outcome, PatchOutcome::Ignored);
        assert_eq!(store.presets().len(), 1);

        let outcome = store.patch("folders", "replace", json!([])).expect("ignored");
        assert_eq!(outcome, PatchOutcome::Ignored);

        let outcome = store
            .patch("dl_fields", "delete", json!({ "id": 7 }))
            .expect("delete");
        assert_eq!(outcome, PatchOutcome::NotFound);
        assert_eq!(store.dl_fields().len(), 1);
    }

    #[test]
    fn replacing_presets_removes_default() {
        let store = idle_store();
        assert_eq!(store.presets()[0].name, DEFAULT_PRESET_NAME);

        let presets = vec![Preset::named("p1"), Preset::named("p2")];
        let outcome = store.apply_patch(FeaturePatch::Presets(PresetPatch::Replace(presets.clone())));
        assert!(outcome.is_applied());

        let shared = store.get_all();
        let state = shared.read().expect("read");
        assert_eq!(state.presets(), presets);
        assert!(state.presets().iter().all(|p| p.name != DEFAULT_PRESET_NAME));
    }

    #[test]
    fn typed_update_keeps_order() {
        let store = idle_store();
        for id in 1..=3 {
            store.apply_patch(FeaturePatch::DlFields(FieldPatch::Create(
                DlField::new(id).with("name", format!("f{id}")),
            )));
        }
        let outcome = store.apply_patch(FeaturePatch::DlFields(FieldPatch::Update(
            DlField::new(2).with("name", "renamed"),
        )));
        assert_eq!(outcome, PatchOutcome::Applied);

        let fields = store.dl_fields();
        let ids: Vec<_> = fields.iter().map(|f| f.id.clone()).collect();
        assert_eq!(
            ids,
            vec![DlFieldId::Number(1), DlFieldId::Number(2), DlFieldId::Number(3)]
        );
        assert_eq!(fields[1].get("name"), Some(&json!("renamed")));
    }

    #[tokio::test]
    async fn load_merges_payload_and_forwards_runtime_fields() {
        let (store, source, runtime) = store_with(FakeSource::returning(json!({
            "app": { "download_path": "/srv/dl", "max_workers": 5 },
            "presets": [{ "name": "audio", "cli": "-x" }],
            "dl_fields": [{ "id": "f1", "name": "Source" }],
            "history_count": 12,
            "queue": { "a": { "id": "a" }, "b": { "id": "b" } },
            "folders": ["music", "video"],
        })));

        assert_eq!(store.load_config().await, LoadOutcome::Loaded);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert!(store.is_loaded());
        assert!(!store.is_loading());
        assert_eq!(store.app().download_path, "/srv/dl");
        assert_eq!(store.presets()[0].name, "audio");
        assert_eq!(store.dl_fields()[0].id, DlFieldId::from("f1"));
        assert_eq!(store.get("folders", Value::Null), json!(["music", "video"]));

        assert_eq!(runtime.history_count(), 12);
        assert_eq!(runtime.items(QUEUE_TOPIC), vec![json!({ "id": "a" }), json!({ "id": "b" })]);
        assert_eq!(store.get(HISTORY_COUNT_FIELD, json!("gone")), json!("gone"));
        assert_eq!(store.get(QUEUE_FIELD, json!("gone")), json!("gone"));
    }

    #[tokio::test]
    async fn failed_load_still_marks_loaded() {
        let (store, _, runtime) = store_with(FakeSource::failing(500));
        store.add("paused", json!(true)).expect("add");
        let before = store.snapshot();

        assert_eq!(store.load_config().await, LoadOutcome::Failed);
        assert!(store.is_loaded());
        assert!(!store.is_loading());
        assert_eq!(store.snapshot(), before);
        assert_eq!(runtime.history_count(), 0);
    }

    #[tokio::test]
    async fn null_and_mistyped_fields_do_not_drop_the_payload() {
        let (store, _, _) = store_with(FakeSource::returning(json!({
            "app": { "download_path": "/srv", "app_version": null, "max_workers": 8 },
            "presets": [{ "name": "audio" }],
            "paused": true,
        })));

        assert_eq!(store.load_config().await, LoadOutcome::Loaded);
        let app = store.app();
        assert_eq!(app.download_path, "/srv");
        assert_eq!(app.max_workers, 8);
        assert_eq!(app.app_version, "");
        assert_eq!(store.get("app.app_version", json!("unknown")), json!("unknown"));
        assert_eq!(store.presets()[0].name, "audio");
        assert!(store.paused());
    }

    #[tokio::test]
    async fn unwritable_payload_key_skips_only_itself() {
        let (store, _, _) = store_with(FakeSource::returning(json!({
            "missing.child": 1,
            "paused.child": 2,
            "app": { "max_workers": "lots" },
            "folders": ["music"],
        })));

        assert_eq!(store.load_config().await, LoadOutcome::Loaded);
        assert_eq!(store.get("missing", json!("absent")), json!("absent"));
        assert_eq!(store.get("app.max_workers", Value::Null), json!("lots"));
        assert_eq!(store.get("folders", Value::Null), json!(["music"]));
    }

    #[tokio::test]
    async fn payload_cannot_touch_lifecycle_flags() {
        let (store, _, runtime) = store_with(FakeSource::returning(json!({
            "is_loading": true,
            "is_loaded": false,
            "history_count": -4,
            "paused": true,
        })));
        runtime.set_history_count(9);

        assert_eq!(store.load_config().await, LoadOutcome::Loaded);
        assert!(store.is_loaded());
        assert!(!store.is_loading());
        assert!(store.paused());
        assert_eq!(runtime.history_count(), 0);
        assert_eq!(store.get(HISTORY_COUNT_FIELD, json!("gone")), json!("gone"));
        assert!(!store.snapshot().document().contains_key("is_loading"));
    }

    #[tokio::test]
    async fn set_all_during_load_leaves_is_loaded_to_the_load() {
        let (store, source, _) = store_with(FakeSource {
            payload: Some(json!({ "paused": true })),
            gated: true,
            ..FakeSource::default()
        });

        let load = store.load_config();
        let during = async {
            source.entered.notified().await;
            store
                .set_all(record(json!({ "folders": ["a"], "is_loading": false })))
                .expect("set_all");
            let flags = (store.is_loading(), store.is_loaded());
            source.release.notify_one();
            flags
        };

        let (outcome, flags) = tokio::join!(load, during);
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(flags, (true, false));
        assert!(store.is_loaded());
        assert!(!store.is_loading());
        assert_eq!(store.get("folders", Value::Null), json!(["a"]));
    }

    #[tokio::test]
    async fn concurrent_loads_issue_one_fetch() {
        let (store, source, _) = store_with(FakeSource {
            payload: Some(json!({ "paused": true })),
            gated: true,
            ..FakeSource::default()
        });

        let first = store.load_config();
        let second = async {
            source.entered.notified().await;
            assert!(store.is_loading());
            assert!(!store.is_loaded());
            let outcome = store.load_config().await;
            source.release.notify_one();
            outcome
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, LoadOutcome::Loaded);
        assert_eq!(second, LoadOutcome::AlreadyLoading);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(store.paused());
    }

    #[tokio::test]
    async fn load_times_out() {
        let (store, _, _) = store_with(FakeSource {
            hang: true,
            ..FakeSource::default()
        });
        let store = store.with_load_timeout(Duration::from_millis(20));

        assert_eq!(store.load_config().await, LoadOutcome::Failed);
        assert!(store.is_loaded());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn load_can_be_cancelled() {
        let (store, source, _) = store_with(FakeSource {
            gated: true,
            payload: Some(json!({ "paused": true })),
            ..FakeSource::default()
        });
        assert!(!store.cancel_load());

        let load = store.load_config();
        let cancel = async {
            source.entered.notified().await;
            store.cancel_load()
        };

        let (outcome, cancelled) = tokio::join!(load, cancel);
        assert!(cancelled);
        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(!store.paused());
        assert!(store.is_loaded());
    }

    #[tokio::test]
    async fn dropped_load_resets_flags() {
        let (store, source, _) = store_with(FakeSource {
            gated: true,
            ..FakeSource::default()
        });

        {
            let load = store.load_config();
            tokio::pin!(load);
            tokio::select! {
                _ = &mut load => unreachable!("load is parked"),
                _ = source.entered.notified() => {}
            }
            assert!(store.is_loading());
        }

        assert!(!store.is_loading());
        assert!(store.is_loaded());
    }

    #[test]
    fn as_count_accepts_any_number() {
        assert_eq!(as_count(&json!(3)), Some(3));
        assert_eq!(as_count(&json!(3.9)), Some(3));
        assert_eq!(as_count(&json!(-1)), Some(0));
        assert_eq!(as_count(&json!(-2.5)), Some(0));
        assert_eq!(as_count(&json!("3")), None);
    }
}
