//! Config - Aggregate Configuration State

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{
    APP_FIELD, DEFAULT_MAX_WORKERS, DEFAULT_MAX_WORKERS_PER_EXTRACTOR, DEFAULT_PAGINATION,
    DL_FIELDS_FIELD, IS_LOADED_FIELD, IS_LOADING_FIELD, PAUSED_FIELD, PRESETS_FIELD,
};
use crate::domain::dl_field::DlField;
use crate::domain::preset::Preset;

/// Typed scalar settings reported by the server under `app`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Root folder downloads are written to
    pub download_path: String,
    /// Scratch folder used while a download is in progress
    pub temp_path: String,
    /// Folder holding the server configuration files
    pub config_path: String,
    /// Global number of concurrent download workers
    pub max_workers: u32,
    /// Concurrent workers allowed per extractor
    pub max_workers_per_extractor: u32,
    /// Simplified UI mode
    pub basic_mode: bool,
    pub file_logging: bool,
    pub console_enabled: bool,
    pub browser_enabled: bool,
    pub ui_update_title: bool,
    /// Delete files from disk when removing history entries
    pub remove_files: bool,
    /// Default output filename template
    pub output_template: String,
    pub version: String,
    pub app_version: String,
    pub app_commit_sha: String,
    pub app_build_date: String,
    pub app_branch: String,
    /// Environment tag, e.g. "production" or "development"
    pub app_env: String,
    pub ytdlp_version: String,
    pub instance_title: Option<String>,
    /// Page size for download lists
    pub default_pagination: u32,
    /// Settings the server sends that this client has no typed field for
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_path: "/downloads".to_string(),
            temp_path: "/tmp".to_string(),
            config_path: "/config".to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            max_workers_per_extractor: DEFAULT_MAX_WORKERS_PER_EXTRACTOR,
            basic_mode: false,
            file_logging: false,
            console_enabled: false,
            browser_enabled: false,
            ui_update_title: true,
            remove_files: false,
            output_template: "%(title)s.%(ext)s".to_string(),
            version: String::new(),
            app_version: String::new(),
            app_commit_sha: String::new(),
            app_build_date: String::new(),
            app_branch: String::new(),
            app_env: "production".to_string(),
            ytdlp_version: String::new(),
            instance_title: None,
            default_pagination: DEFAULT_PAGINATION,
            extra: Map::new(),
        }
    }
}

impl AppSettings {
    /// Whether the server runs in its development environment
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    /// Typed view of an `app` object
    ///
    /// Missing, null and ill-typed entries keep their defaults.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => decode_lenient(map),
            _ => Self::default(),
        }
    }
}

/// Decode `T` from `overlay` laid over `T::default()`, skipping entries that do not fit
fn decode_lenient<T>(overlay: &Map<String, Value>) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    let Ok(Value::Object(mut base)) = serde_json::to_value(T::default()) else {
        return T::default();
    };

    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }
        let previous = base.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(base.clone())).is_err() {
            debug!(key = key.as_str(), "Skipping value that does not fit its field");
            match previous {
                Some(previous) => base.insert(key.clone(), previous),
                None => base.shift_remove(key),
            };
        }
    }

    serde_json::from_value(Value::Object(base)).unwrap_or_default()
}

/// Typed view of a collection entry; entries that are not objects are dropped
fn decode_entries<T, F>(value: Option<&Value>, decode: F) -> Vec<T>
where
    F: Fn(&Map<String, Value>) -> Option<T>,
{
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(decode)
            .collect(),
        _ => Vec::new(),
    }
}

/// The aggregate state owned by a `ConfigStore`
///
/// Configuration lives in one JSON document addressed by dotted paths, so any
/// value a caller or the server writes is kept exactly as written. `app()`,
/// `presets()` and `dl_fields()` are typed views decoded on read. The lifecycle
/// flags sit outside the document and only the store changes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigState {
    #[serde(flatten)]
    document: Map<String, Value>,
    /// Whether the state reflects defaults or a merged remote payload
    pub is_loaded: bool,
    /// Whether a remote load is in flight
    pub is_loading: bool,
}

impl Default for ConfigState {
    fn default() -> Self {
        let mut document = Map::new();
        document.insert(
            APP_FIELD.to_string(),
            serde_json::to_value(AppSettings::default()).unwrap_or_default(),
        );
        document.insert(
            PRESETS_FIELD.to_string(),
            serde_json::to_value(vec![Preset::default_preset()]).unwrap_or_default(),
        );
        document.insert(DL_FIELDS_FIELD.to_string(), Value::Array(Vec::new()));
        document.insert(PAUSED_FIELD.to_string(), Value::Bool(false));

        Self {
            document,
            is_loaded: true,
            is_loading: false,
        }
    }
}

impl ConfigState {
    /// Create the hard-coded initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` names a lifecycle flag rather than a document entry
    pub fn is_lifecycle_key(key: &str) -> bool {
        key == IS_LOADED_FIELD || key == IS_LOADING_FIELD
    }

    /// The path-addressable configuration document
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.document
    }

    /// A lifecycle flag as a JSON value
    pub fn lifecycle_value(&self, key: &str) -> Option<Value> {
        match key {
            IS_LOADED_FIELD => Some(Value::Bool(self.is_loaded)),
            IS_LOADING_FIELD => Some(Value::Bool(self.is_loading)),
            _ => None,
        }
    }

    pub fn app(&self) -> AppSettings {
        AppSettings::from_value(self.document.get(APP_FIELD))
    }

    /// Presets in display order; entries that are not objects are skipped
    pub fn presets(&self) -> Vec<Preset> {
        decode_entries(self.document.get(PRESETS_FIELD), |map| {
            Some(decode_lenient::<Preset>(map))
        })
    }

    /// Download-list fields in display order; entries without a usable id are skipped
    pub fn dl_fields(&self) -> Vec<DlField> {
        decode_entries(self.document.get(DL_FIELDS_FIELD), |map| {
            serde_json::from_value(Value::Object(map.clone())).ok()
        })
    }

    /// `paused` as a flag; anything but `true` reads as running
    pub fn paused(&self) -> bool {
        self.document
            .get(PAUSED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Find the preset marked as default, falling back to the first one
    pub fn default_preset(&self) -> Option<Preset> {
        let presets = self.presets();
        let index = presets.iter().position(|p| p.default).unwrap_or(0);
        presets.into_iter().nth(index)
    }

    /// Run `f` over the entries of a collection and store the result back
    ///
    /// A missing or non-list value is handed to `f` as an empty list.
    pub fn update_collection<R>(&mut self, key: &str, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let slot = self.document.entry(key.to_string()).or_insert(Value::Null);
        let mut items = match slot.take() {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let result = f(&mut items);
        *slot = Value::Array(items);
        result
    }
}
