//! dl-config-store
//!
//! Client-side configuration store for a download manager. Holds the runtime
//! configuration, download presets and download-list fields, reads and writes
//! values by dotted-path key, and mutates collections through a typed
//! create/update/delete/replace protocol.

pub mod constants;
pub mod domain;
pub mod error;
pub mod feedback;
pub mod helpers;
pub mod persistence;
pub mod services;
pub mod settings;
pub mod state;

pub use error::{Error, Result};
pub use state::{ConfigStore, LoadOutcome};
