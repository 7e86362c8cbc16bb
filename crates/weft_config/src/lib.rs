//! Parsing and validation of `weft.toml` design descriptions.
//!
//! A `weft.toml` names the project, selects the top component class, sets
//! elaboration options, defines whole-elaboration constants and declares every
//! component class: its signals, children, update blocks, helper functions
//! and explicit ordering constraints.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
