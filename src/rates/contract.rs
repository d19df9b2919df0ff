//! The rate lookup contract.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{EmploymentType, Occurrence, PharmacyId, RateConfig, Role};

/// A batch rate lookup for the occurrences of one shift.
///
/// `rate_config` is only carried for pharmacist shifts; [`RateRequest::new`]
/// drops it for every other role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRequest {
    /// The pharmacy the shift belongs to.
    pub pharmacy_id: PharmacyId,
    /// The role being rated.
    pub role: Role,
    /// The engagement the shift is offered under.
    pub employment_type: EmploymentType,
    /// Occurrences to rate, in expansion order.
    pub occurrences: Vec<Occurrence>,
    /// Day-type base rates for pharmacist shifts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_config: Option<RateConfig>,
}

impl RateRequest {
    /// Creates a request, keeping `rate_config` only for pharmacists.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_engine::models::{EmploymentType, RateConfig, Role};
    /// use shift_engine::rates::RateRequest;
    /// use rust_decimal::Decimal;
    ///
    /// let config = RateConfig {
    ///     weekday: Decimal::new(65, 0),
    ///     saturday: Decimal::new(75, 0),
    ///     sunday: Decimal::new(85, 0),
    ///     public_holiday: Decimal::new(110, 0),
    ///     early_morning: Decimal::new(70, 0),
    ///     late_night: Decimal::new(72, 0),
    /// };
    ///
    /// let request = RateRequest::new("ph-1", Role::Assistant, EmploymentType::Casual, vec![], Some(config));
    /// assert!(request.rate_config.is_none());
    /// ```
    pub fn new(
        pharmacy_id: impl Into<PharmacyId>,
        role: Role,
        employment_type: EmploymentType,
        occurrences: Vec<Occurrence>,
        rate_config: Option<RateConfig>,
    ) -> Self {
        let rate_config = if role == Role::Pharmacist {
            rate_config
        } else {
            None
        };
        Self {
            pharmacy_id: pharmacy_id.into(),
            role,
            employment_type,
            occurrences,
            rate_config,
        }
    }
}

/// One entry of a rate response, matched to its request occurrence by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateEntry {
    /// The hourly rate for the occurrence.
    Rate {
        /// Hourly rate.
        rate: Decimal,
    },
    /// Why the occurrence could not be rated.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl RateEntry {
    /// Creates a rate entry.
    pub fn rate(rate: Decimal) -> Self {
        RateEntry::Rate { rate }
    }

    /// Creates an error entry.
    pub fn error(message: impl Into<String>) -> Self {
        RateEntry::Error {
            error: message.into(),
        }
    }
}

/// Resolves hourly rates for occurrences.
///
/// Implementations must return exactly one entry per request occurrence, in
/// the same order. A failure of the whole call is reported as
/// `UpstreamUnavailable`; a failure for one occurrence is an
/// [`RateEntry::Error`] in its slot.
#[async_trait]
pub trait RateResolver: Send + Sync {
    /// Resolves the rates for `request`.
    async fn resolve(&self, request: &RateRequest) -> EngineResult<Vec<RateEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialization_is_untagged() {
        assert_eq!(
            serde_json::to_string(&RateEntry::rate(Decimal::new(6550, 2))).unwrap(),
            r#"{"rate":"65.50"}"#
        );
        assert_eq!(
            serde_json::to_string(&RateEntry::error("no rate")).unwrap(),
            r#"{"error":"no rate"}"#
        );
        let parsed: RateEntry = serde_json::from_str(r#"{"error":"down"}"#).unwrap();
        assert_eq!(parsed, RateEntry::error("down"));
    }

    #[test]
    fn test_pharmacist_keeps_rate_config() {
        let config = RateConfig {
            weekday: Decimal::ONE,
            saturday: Decimal::ONE,
            sunday: Decimal::ONE,
            public_holiday: Decimal::ONE,
            early_morning: Decimal::ONE,
            late_night: Decimal::ONE,
        };
        let request = RateRequest::new(
            "ph-1",
            Role::Pharmacist,
            EmploymentType::Locum,
            vec![],
            Some(config),
        );
        assert!(request.rate_config.is_some());
    }
}
