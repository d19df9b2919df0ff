//! Pharmacy directory and roster membership.
//!
//! The engine does not own pharmacies or their staff lists. It asks two
//! collaborators: a [`PharmacyDirectory`] for the pharmacy record and
//! capability flags, and a [`RosterMembership`] for who works where and who
//! may decide requests. [`StaticDirectory`] implements both from
//! configuration.

use std::collections::HashMap;

use crate::config::PharmacyEntry;
use crate::error::{EngineError, EngineResult};
use crate::models::{Pharmacy, Role, RosterMember, UserId, VisibilityTier};

/// Looks up pharmacy records.
pub trait PharmacyDirectory: Send + Sync {
    /// Returns the pharmacy with `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `UpstreamUnavailable` when the directory
    /// cannot be reached.
    fn pharmacy(&self, id: &str) -> EngineResult<Pharmacy>;
}

/// Answers roster questions for a pharmacy.
pub trait RosterMembership: Send + Sync {
    /// Returns the roster record for `user_id` at `pharmacy_id`, if any.
    fn member(&self, pharmacy_id: &str, user_id: &str) -> Option<RosterMember>;

    /// Returns true if `user_id` may decide requests for `pharmacy_id`.
    fn is_operator(&self, pharmacy_id: &str, user_id: &str) -> bool;

    /// Returns the members able to work `role`, in roster order.
    fn eligible_users(&self, pharmacy_id: &str, role: Role) -> Vec<UserId>;

    /// Returns the narrowest tier `user_id` belongs to for `pharmacy_id`.
    ///
    /// Workers who are not on the roster only ever see platform-wide shifts.
    fn audience_tier(&self, pharmacy_id: &str, user_id: &str) -> VisibilityTier {
        self.member(pharmacy_id, user_id)
            .map(|m| m.audience_tier)
            .unwrap_or(VisibilityTier::Platform)
    }
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    pharmacy: Pharmacy,
    members: Vec<RosterMember>,
    operators: Vec<UserId>,
}

/// An in-memory directory built from configuration.
///
/// # Example
///
/// ```
/// use shift_engine::config::PharmacyEntry;
/// use shift_engine::directory::{PharmacyDirectory, StaticDirectory};
/// use shift_engine::models::Pharmacy;
///
/// let directory = StaticDirectory::new(vec![PharmacyEntry {
///     pharmacy: Pharmacy {
///         id: "ph-1".to_string(),
///         name: "Harbour Pharmacy".to_string(),
///         has_chain: false,
///         claimed: false,
///         allowed_escalation_levels: None,
///         default_rate_config: None,
///     },
///     members: vec![],
///     operators: vec!["op-1".to_string()],
/// }]);
///
/// assert_eq!(directory.pharmacy("ph-1").unwrap().name, "Harbour Pharmacy");
/// assert!(directory.pharmacy("ph-2").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    /// Creates a directory from configured entries.
    pub fn new(entries: Vec<PharmacyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| {
                (
                    e.pharmacy.id.clone(),
                    DirectoryEntry {
                        pharmacy: e.pharmacy,
                        members: e.members,
                        operators: e.operators,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Returns the number of pharmacies known.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no pharmacies are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PharmacyDirectory for StaticDirectory {
    fn pharmacy(&self, id: &str) -> EngineResult<Pharmacy> {
        self.entries
            .get(id)
            .map(|e| e.pharmacy.clone())
            .ok_or_else(|| EngineError::not_found("Pharmacy", id))
    }
}

impl RosterMembership for StaticDirectory {
    fn member(&self, pharmacy_id: &str, user_id: &str) -> Option<RosterMember> {
        self.entries
            .get(pharmacy_id)?
            .members
            .iter()
            .find(|m| m.user_id == user_id)
            .cloned()
    }

    fn is_operator(&self, pharmacy_id: &str, user_id: &str) -> bool {
        self.entries
            .get(pharmacy_id)
            .is_some_and(|e| e.operators.iter().any(|op| op == user_id))
    }

    fn eligible_users(&self, pharmacy_id: &str, role: Role) -> Vec<UserId> {
        self.entries
            .get(pharmacy_id)
            .map(|e| {
                e.members
                    .iter()
                    .filter(|m| m.can_work(role))
                    .map(|m| m.user_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![PharmacyEntry {
            pharmacy: Pharmacy {
                id: "ph-1".to_string(),
                name: "Harbour".to_string(),
                has_chain: true,
                claimed: false,
                allowed_escalation_levels: None,
                default_rate_config: None,
            },
            members: vec![
                RosterMember {
                    user_id: "u-1".to_string(),
                    roles: vec![Role::Pharmacist],
                    audience_tier: VisibilityTier::FullPartTime,
                },
                RosterMember {
                    user_id: "u-2".to_string(),
                    roles: vec![Role::Assistant, Role::Pharmacist],
                    audience_tier: VisibilityTier::LocumCasual,
                },
            ],
            operators: vec!["op-1".to_string()],
        }])
    }

    #[test]
    fn test_unknown_pharmacy_is_not_found() {
        let err = directory().pharmacy("nope").unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_member_lookup() {
        let dir = directory();
        assert_eq!(dir.member("ph-1", "u-2").unwrap().audience_tier, VisibilityTier::LocumCasual);
        assert!(dir.member("ph-1", "u-9").is_none());
        assert!(dir.member("ph-9", "u-1").is_none());
    }

    #[test]
    fn test_non_member_is_platform_audience() {
        let dir = directory();
        assert_eq!(dir.audience_tier("ph-1", "u-1"), VisibilityTier::FullPartTime);
        assert_eq!(dir.audience_tier("ph-1", "stranger"), VisibilityTier::Platform);
    }

    #[test]
    fn test_eligible_users_filters_by_role() {
        let dir = directory();
        assert_eq!(dir.eligible_users("ph-1", Role::Pharmacist), vec!["u-1", "u-2"]);
        assert_eq!(dir.eligible_users("ph-1", Role::Assistant), vec!["u-2"]);
        assert!(dir.eligible_users("ph-1", Role::Intern).is_empty());
    }

    #[test]
    fn test_operators() {
        let dir = directory();
        assert!(dir.is_operator("ph-1", "op-1"));
        assert!(!dir.is_operator("ph-1", "u-1"));
        assert!(!dir.is_operator("ph-2", "op-1"));
    }
}
