//! Pharmacy directory records and day-type rate configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PharmacyId, VisibilityTier};

/// Hourly base rates by day type.
///
/// Only pharmacist shifts carry a rate configuration; other roles are rated
/// from the resolver's own tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Monday to Friday, ordinary hours.
    pub weekday: Decimal,
    /// Saturday.
    pub saturday: Decimal,
    /// Sunday.
    pub sunday: Decimal,
    /// Any public holiday.
    pub public_holiday: Decimal,
    /// Shifts starting before the early-morning cutoff.
    pub early_morning: Decimal,
    /// Shifts ending after the late-night cutoff.
    pub late_night: Decimal,
}

/// A pharmacy as supplied by the pharmacy directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    /// Unique identifier.
    pub id: PharmacyId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the owner runs a chain of pharmacies.
    #[serde(default)]
    pub has_chain: bool,
    /// Whether an organization has claimed the pharmacy.
    #[serde(default)]
    pub claimed: bool,
    /// Explicit tier sequence from an upstream authority, overriding the flags.
    #[serde(default)]
    pub allowed_escalation_levels: Option<Vec<VisibilityTier>>,
    /// Default pharmacist rates.
    #[serde(default)]
    pub default_rate_config: Option<RateConfig>,
}
