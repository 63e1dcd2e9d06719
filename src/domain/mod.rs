//! Domain - Pure Data Structures
//!
//! These types carry no locking or I/O and represent the configuration domain.

pub mod config;
pub mod dl_field;
pub mod preset;

pub use config::*;
pub use dl_field::*;
pub use preset::*;
