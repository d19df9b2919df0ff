//! Application state for the shift engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineSettings};
use crate::rates::{RateResolver, TableRateResolver};
use crate::roster::RosterService;

/// Shared application state.
///
/// Contains the roster service, the rate resolver and the runtime settings
/// shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<RosterService>,
    rates: Arc<dyn RateResolver>,
    settings: Arc<EngineSettings>,
}

impl AppState {
    /// Creates application state from already-built parts.
    pub fn new(
        service: Arc<RosterService>,
        rates: Arc<dyn RateResolver>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            service,
            rates,
            settings: Arc::new(settings),
        }
    }

    /// Wires a roster service and a table-backed rate resolver from loaded
    /// configuration.
    pub fn from_config(loader: &ConfigLoader) -> Self {
        let directory = Arc::new(loader.directory());
        let settings = loader.settings().clone();
        let service = Arc::new(RosterService::new(
            directory.clone(),
            directory.clone(),
            settings.max_recurrence_days,
        ));
        let rates = Arc::new(TableRateResolver::new(directory, loader.rates().clone()));
        Self::new(service, rates, settings)
    }

    /// Returns the roster service.
    pub fn service(&self) -> &Arc<RosterService> {
        &self.service
    }

    /// Returns the rate resolver.
    pub fn rates(&self) -> &dyn RateResolver {
        self.rates.as_ref()
    }

    /// Returns the runtime settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
