//! State - Configuration Store and Companions
//!
//! The store owns the aggregate configuration; the runtime state receives the
//! transient slices a configuration payload carries.
//!
//! ```text
//! Caller ─► ConfigStore ─► path (dotted keys)
//!                      └─► patch (collection protocol)
//!                      └─► RuntimeSink (history_count, queue)
//! ```

pub mod config_store;
pub mod patch;
pub mod path;
pub mod runtime_state;

pub use config_store::*;
pub use patch::{Feature, FeaturePatch, FieldPatch, PatchAction, PatchOutcome, PresetPatch};
pub use runtime_state::*;
