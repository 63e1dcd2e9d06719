//! Store Constants
//!
//! Centralized constants shared by the store, the HTTP source and the CLI.

/// Separator between parent and child in a dotted-path key
pub const KEY_SEPARATOR: char = '.';

/// Remote configuration endpoint, relative to the base url
pub const CONFIG_ENDPOINT: &str = "/api/system/configuration";

/// Top-level fields of the configuration document
pub const APP_FIELD: &str = "app";
pub const PRESETS_FIELD: &str = "presets";
pub const DL_FIELDS_FIELD: &str = "dl_fields";
pub const PAUSED_FIELD: &str = "paused";

/// Lifecycle flags; readable by path, never written through it
pub const IS_LOADED_FIELD: &str = "is_loaded";
pub const IS_LOADING_FIELD: &str = "is_loading";

/// Payload field forwarded to the runtime sink as the history counter
pub const HISTORY_COUNT_FIELD: &str = "history_count";

/// Payload field forwarded to the runtime sink as queue items
pub const QUEUE_FIELD: &str = "queue";

/// Runtime sink topic that receives queue items
pub const QUEUE_TOPIC: &str = "queue";

/// Name of the preset that always exists in a fresh store
pub const DEFAULT_PRESET_NAME: &str = "default";

/// Default server base url
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Environment variable overriding the configured base url
pub const BASE_URL_ENV: &str = "DL_CONFIG_BASE_URL";

/// Request / load timeouts
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Default page size for download lists
pub const DEFAULT_PAGINATION: u32 = 50;

/// Default worker limits
pub const DEFAULT_MAX_WORKERS: u32 = 1;
pub const DEFAULT_MAX_WORKERS_PER_EXTRACTOR: u32 = 2;

/// Persisted feedback toggles
pub const TOAST_ENABLED_KEY: &str = "toast_enabled";
pub const REDUCE_CONFIRMATION_KEY: &str = "reduce_confirmation";
pub const DEFAULT_FEEDBACK_FILE: &str = "feedback.json";

/// Default toast lifetime in milliseconds
pub const DEFAULT_TOAST_TIMEOUT_MS: u64 = 5000;

/// Recently shown toasts kept by the notifier
pub const TOAST_HISTORY_CAPACITY: usize = 50;
