//! Config-backed rate resolver.
//!
//! A local stand-in for the external rate service, driven by the pharmacy's
//! default [`RateConfig`] and the role tables in `rates.yaml`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RatesConfig;
use crate::directory::PharmacyDirectory;
use crate::error::EngineResult;
use crate::models::{EmploymentType, Occurrence, RateConfig, Role};

use super::contract::{RateEntry, RateRequest, RateResolver};

/// Which column of a [`RateConfig`] an occurrence is paid from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDayType {
    /// Monday to Friday within ordinary hours.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
    /// A public holiday, whatever the weekday.
    PublicHoliday,
    /// A weekday occurrence starting before the early-morning cutoff.
    EarlyMorning,
    /// A weekday occurrence ending after the late-night cutoff.
    LateNight,
}

impl std::fmt::Display for RateDayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateDayType::Weekday => write!(f, "Weekday"),
            RateDayType::Saturday => write!(f, "Saturday"),
            RateDayType::Sunday => write!(f, "Sunday"),
            RateDayType::PublicHoliday => write!(f, "Public holiday"),
            RateDayType::EarlyMorning => write!(f, "Early morning"),
            RateDayType::LateNight => write!(f, "Late night"),
        }
    }
}

impl RateDayType {
    /// Picks the matching rate from `config`.
    pub fn rate_from(&self, config: &RateConfig) -> Decimal {
        match self {
            RateDayType::Weekday => config.weekday,
            RateDayType::Saturday => config.saturday,
            RateDayType::Sunday => config.sunday,
            RateDayType::PublicHoliday => config.public_holiday,
            RateDayType::EarlyMorning => config.early_morning,
            RateDayType::LateNight => config.late_night,
        }
    }
}

/// Classifies an occurrence.
///
/// Precedence: public holiday, Sunday, Saturday, early morning, late night,
/// then weekday.
///
/// # Example
///
/// ```
/// use shift_engine::config::RatesConfig;
/// use shift_engine::models::Occurrence;
/// use shift_engine::rates::{classify, RateDayType};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let rates = RatesConfig::default();
/// let saturday = Occurrence::new(
///     NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
/// );
/// assert_eq!(classify(&saturday, &rates), RateDayType::Saturday);
/// ```
pub fn classify(occurrence: &Occurrence, rates: &RatesConfig) -> RateDayType {
    if rates.public_holidays.is_public_holiday(occurrence.date) {
        return RateDayType::PublicHoliday;
    }
    match occurrence.weekday() {
        Weekday::Sun => RateDayType::Sunday,
        Weekday::Sat => RateDayType::Saturday,
        _ if occurrence.start_time < rates.early_morning_before => RateDayType::EarlyMorning,
        _ if occurrence.end_time > rates.late_night_after => RateDayType::LateNight,
        _ => RateDayType::Weekday,
    }
}

/// Resolves rates from configuration.
pub struct TableRateResolver {
    directory: Arc<dyn PharmacyDirectory>,
    rates: RatesConfig,
}

impl TableRateResolver {
    /// Creates a resolver over the given directory and rate tables.
    pub fn new(directory: Arc<dyn PharmacyDirectory>, rates: RatesConfig) -> Self {
        Self { directory, rates }
    }

    fn pharmacist_entries(&self, occurrences: &[Occurrence], config: &RateConfig) -> Vec<RateEntry> {
        occurrences
            .iter()
            .map(|o| RateEntry::rate(classify(o, &self.rates).rate_from(config)))
            .collect()
    }

    fn role_entries(
        &self,
        occurrences: &[Occurrence],
        role: Role,
        employment_type: EmploymentType,
    ) -> Vec<RateEntry> {
        let Some(base) = self.rates.role_rates.get(&role).copied() else {
            return occurrences
                .iter()
                .map(|_| RateEntry::error(format!("no rate configured for role {}", role)))
                .collect();
        };

        let rate = if employment_type == EmploymentType::Casual {
            (base * self.rates.casual_loading).round_dp(2)
        } else {
            base
        };
        occurrences.iter().map(|_| RateEntry::rate(rate)).collect()
    }
}

#[async_trait]
impl RateResolver for TableRateResolver {
    async fn resolve(&self, request: &RateRequest) -> EngineResult<Vec<RateEntry>> {
        let entries = if request.role == Role::Pharmacist {
            let config = match &request.rate_config {
                Some(config) => Some(config.clone()),
                None => self.directory.pharmacy(&request.pharmacy_id)?.default_rate_config,
            };
            match config {
                Some(config) => self.pharmacist_entries(&request.occurrences, &config),
                None => request
                    .occurrences
                    .iter()
                    .map(|_| RateEntry::error("no pharmacist rate configuration"))
                    .collect(),
            }
        } else {
            self.role_entries(&request.occurrences, request.role, request.employment_type)
        };

        debug!(
            pharmacy_id = %request.pharmacy_id,
            role = %request.role,
            occurrences = request.occurrences.len(),
            "Resolved rates from tables"
        );

        Ok(entries)
    }
}
