//! Configuration loading and management for the shift engine.
//!
//! This module provides functionality to load engine settings, the pharmacy
//! directory and rate tables from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use shift_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Sweeping every {:?}", config.settings().sweep_interval());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, EngineSettings, PharmaciesConfig, PharmacyEntry, RatesConfig};
