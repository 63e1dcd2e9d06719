//! Service Layer
//!
//! Abstraction over the server endpoints the store talks to.

mod config_api;

pub use config_api::*;
