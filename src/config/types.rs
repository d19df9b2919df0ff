//! Configuration types for the shift engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{HolidayCalendar, Pharmacy, Role, RosterMember, UserId};

/// Runtime settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Seconds between due-escalation sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Milliseconds a single rate lookup may take before it is abandoned.
    #[serde(default = "default_rate_timeout_ms")]
    pub rate_timeout_ms: u64,
    /// Longest recurrence window, in days, a slot may span.
    #[serde(default = "default_max_recurrence_days")]
    pub max_recurrence_days: i64,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_rate_timeout_ms() -> u64 {
    5_000
}

fn default_max_recurrence_days() -> i64 {
    366
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            sweep_interval_secs: default_sweep_interval_secs(),
            rate_timeout_ms: default_rate_timeout_ms(),
            max_recurrence_days: default_max_recurrence_days(),
            log_filter: default_log_filter(),
        }
    }
}

impl EngineSettings {
    /// Interval between escalation sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Timeout for one rate lookup.
    pub fn rate_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_timeout_ms)
    }
}

/// A pharmacy together with its roster membership.
#[derive(Debug, Clone, Deserialize)]
pub struct PharmacyEntry {
    /// The directory record.
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    /// Workers on the pharmacy's roster.
    #[serde(default)]
    pub members: Vec<RosterMember>,
    /// Users allowed to decide requests and manage shifts.
    #[serde(default)]
    pub operators: Vec<UserId>,
}

/// Pharmacies configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PharmaciesConfig {
    /// All known pharmacies.
    pub pharmacies: Vec<PharmacyEntry>,
}

/// Rate tables from `rates.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Hourly base rate per role for non-pharmacist shifts.
    #[serde(default)]
    pub role_rates: HashMap<Role, Decimal>,
    /// Multiplier applied to casual engagements of non-pharmacist roles.
    #[serde(default = "default_casual_loading")]
    pub casual_loading: Decimal,
    /// Occurrences starting before this time take the early-morning rate.
    #[serde(default = "default_early_morning_before")]
    pub early_morning_before: NaiveTime,
    /// Occurrences ending after this time take the late-night rate.
    #[serde(default = "default_late_night_after")]
    pub late_night_after: NaiveTime,
    /// Public holidays.
    #[serde(default)]
    pub public_holidays: HolidayCalendar,
}

fn default_casual_loading() -> Decimal {
    Decimal::new(125, 2)
}

fn default_early_morning_before() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("Valid early-morning cutoff")
}

fn default_late_night_after() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).expect("Valid late-night cutoff")
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            role_rates: HashMap::new(),
            casual_loading: default_casual_loading(),
            early_morning_before: default_early_morning_before(),
            late_night_after: default_late_night_after(),
            public_holidays: HolidayCalendar::default(),
        }
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    pharmacies: Vec<PharmacyEntry>,
    rates: RatesConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, pharmacies: Vec<PharmacyEntry>, rates: RatesConfig) -> Self {
        Self {
            settings,
            pharmacies,
            rates,
        }
    }

    /// Returns the runtime settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all pharmacies.
    pub fn pharmacies(&self) -> &[PharmacyEntry] {
        &self.pharmacies
    }

    /// Returns the rate tables.
    pub fn rates(&self) -> &RatesConfig {
        &self.rates
    }
}
