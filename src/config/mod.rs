// src/config/mod.rs

//! Configuration loading and validation for dropwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate trigger patterns and intervals (`validate.rs`).
//! - Compile the model into runtime triggers and options (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::{build_triggers, dispatcher_options};
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ActionConfig, ConfigFile, TriggerConfig};
pub use validate::validate_config;
