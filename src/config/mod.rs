// src/config/mod.rs

//! Configuration loading and resolution for audition-runner.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like positive timeouts (`validate.rs`).
//! - Snapshot the environment once per invocation (`env.rs`).
//! - Layer file, environment and CLI into one `Settings` (`settings.rs`).

pub mod env;
pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use env::EnvSnapshot;
pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    CaptureSection, ConfigFile, DiscoverySection, EngineSection, RawConfigFile, TimeoutSection,
};
pub use settings::{
    CaptureSettings, DiscoverySettings, EngineSettings, EscalationBudgets, Settings,
};
