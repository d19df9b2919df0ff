//! Shift model.
//!
//! A [`Shift`] is what a pharmacy posts: the role it needs, the slots it
//! covers and the audience it is currently exposed to.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmploymentType, Occurrence, PharmacyId, Role, SlotTemplate, VisibilityTier};
use crate::scheduling::expand_all;

/// Planned escalation times, keyed by the tier that should activate.
///
/// A `None` timestamp records that the operator selected a tier without
/// giving it a date; such entries never fall due on their own.
pub type EscalationSchedule = BTreeMap<VisibilityTier, Option<DateTime<Utc>>>;

/// Represents a posted shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The pharmacy that posted the shift.
    pub pharmacy_id: PharmacyId,
    /// The role the shift needs.
    pub role_needed: Role,
    /// The employment arrangement offered.
    pub employment_type: EmploymentType,
    /// Slot definitions; occurrences are derived from these.
    pub slots: Vec<SlotTemplate>,
    /// The audience the shift is currently exposed to.
    pub current_visibility: VisibilityTier,
    /// Future tiers and when they should activate.
    #[serde(default)]
    pub escalation_schedule: EscalationSchedule,
    /// Whether every occurrence must be filled by the same worker.
    #[serde(default)]
    pub single_user_only: bool,
    /// When the shift was created.
    pub created_at: DateTime<Utc>,
    /// When the shift was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    /// Expands the shift's slots into its occurrences, sorted by date and start time.
    ///
    /// Occurrences are computed on every call and never cached.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_engine::models::{EmploymentType, Role, Shift, SlotTemplate, VisibilityTier};
    /// use chrono::{NaiveDate, NaiveTime, Utc};
    /// use uuid::Uuid;
    ///
    /// let shift = Shift {
    ///     id: Uuid::new_v4(),
    ///     pharmacy_id: "ph-1".to_string(),
    ///     role_needed: Role::Pharmacist,
    ///     employment_type: EmploymentType::Locum,
    ///     slots: vec![SlotTemplate::single(
    ///         NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
    ///         NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///         NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    ///     )],
    ///     current_visibility: VisibilityTier::LocumCasual,
    ///     escalation_schedule: Default::default(),
    ///     single_user_only: false,
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    /// assert_eq!(shift.occurrences().len(), 1);
    /// ```
    pub fn occurrences(&self) -> Vec<Occurrence> {
        expand_all(&self.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Weekday};

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn make_shift(slots: Vec<SlotTemplate>) -> Shift {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Shift {
            id: Uuid::new_v4(),
            pharmacy_id: "ph-1".to_string(),
            role_needed: Role::Pharmacist,
            employment_type: EmploymentType::Locum,
            slots,
            current_visibility: VisibilityTier::FullPartTime,
            escalation_schedule: EscalationSchedule::new(),
            single_user_only: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_occurrences_across_slots_are_sorted() {
        let shift = make_shift(vec![
            SlotTemplate::single(make_date("2024-06-05"), make_time(9), make_time(17)),
            SlotTemplate::single(make_date("2024-06-03"), make_time(13), make_time(18)),
            SlotTemplate::single(make_date("2024-06-03"), make_time(8), make_time(12)),
        ]);

        let dates: Vec<_> = shift
            .occurrences()
            .iter()
            .map(|o| (o.date, o.start_time))
            .collect();
        assert_eq!(
            dates,
            vec![
                (make_date("2024-06-03"), make_time(8)),
                (make_date("2024-06-03"), make_time(13)),
                (make_date("2024-06-05"), make_time(9)),
            ]
        );
    }

    #[test]
    fn test_schedule_serializes_with_tier_keys() {
        let mut shift = make_shift(vec![]);
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        shift
            .escalation_schedule
            .insert(VisibilityTier::Platform, Some(at));
        shift.escalation_schedule.insert(VisibilityTier::OwnerChain, None);

        let json = serde_json::to_value(&shift).unwrap();
        assert!(json["escalation_schedule"]["PLATFORM"].is_string());
        assert!(json["escalation_schedule"]["OWNER_CHAIN"].is_null());

        let back: Shift = serde_json::from_value(json).unwrap();
        assert_eq!(back, shift);
    }
}
