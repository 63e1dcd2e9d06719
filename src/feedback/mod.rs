//! User Feedback
//!
//! Gated wrappers around toast and dialog presenters. The gates are persisted
//! toggles read through the `KeyValueStore` port; presentation is injected.

mod confirm;
mod notify;

pub use confirm::*;
pub use notify::*;
