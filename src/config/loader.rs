//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::directory::StaticDirectory;
use crate::error::{EngineError, EngineResult};
use crate::scheduling::TierSequence;

use super::types::{EngineConfig, EngineSettings, PharmaciesConfig, PharmacyEntry, RatesConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml      # Server, sweep and timeout settings
/// ├── pharmacies.yaml  # Pharmacies, roster members and operators
/// └── rates.yaml       # Per-role rates and public holidays
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Serving on {}", loader.settings().bind_address);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a required field (`ConfigParseError`)
    /// - A pharmacy is declared twice or has an invalid tier list (`ConfigParseError`)
    /// - A sweep interval, rate timeout or recurrence window is zero (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&settings_path)?;
        Self::check_settings(&settings, &settings_path.display().to_string())?;

        let pharmacies_path = path.join("pharmacies.yaml");
        let pharmacies = Self::load_yaml::<PharmaciesConfig>(&pharmacies_path)?;
        Self::check_pharmacies(&pharmacies.pharmacies, &pharmacies_path.display().to_string())?;

        let rates = Self::load_yaml::<RatesConfig>(&path.join("rates.yaml"))?;

        Ok(Self {
            config: EngineConfig::new(settings, pharmacies.pharmacies, rates),
        })
    }

    /// Builds a loader from already-parsed parts.
    pub fn from_parts(
        settings: EngineSettings,
        pharmacies: Vec<PharmacyEntry>,
        rates: RatesConfig,
    ) -> EngineResult<Self> {
        Self::check_settings(&settings, "<memory>")?;
        Self::check_pharmacies(&pharmacies, "<memory>")?;
        Ok(Self {
            config: EngineConfig::new(settings, pharmacies, rates),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_settings(settings: &EngineSettings, path: &str) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::ConfigParseError {
            path: path.to_string(),
            message: message.to_string(),
        };
        if settings.sweep_interval_secs == 0 {
            return Err(invalid("sweep_interval_secs must be greater than zero"));
        }
        if settings.rate_timeout_ms == 0 {
            return Err(invalid("rate_timeout_ms must be greater than zero"));
        }
        if settings.max_recurrence_days < 1 {
            return Err(invalid("max_recurrence_days must be at least 1"));
        }
        Ok(())
    }

    fn check_pharmacies(entries: &[PharmacyEntry], path: &str) -> EngineResult<()> {
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.pharmacy.id.as_str()) {
                return Err(EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: format!("pharmacy '{}' is declared more than once", entry.pharmacy.id),
                });
            }
            TierSequence::for_pharmacy(&entry.pharmacy).map_err(|e| {
                EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: format!("pharmacy '{}': {}", entry.pharmacy.id, e),
                }
            })?;
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the runtime settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the rate tables.
    pub fn rates(&self) -> &RatesConfig {
        self.config.rates()
    }

    /// Builds the directory collaborators described by the configuration.
    pub fn directory(&self) -> StaticDirectory {
        StaticDirectory::new(self.config.pharmacies().to_vec())
    }
}
