//! Worker-facing staffing types.
//!
//! This module defines the [`Role`] and [`EmploymentType`] enums used to
//! describe what a shift needs, and the [`RosterMember`] record describing
//! a worker's relationship with a pharmacy.

use serde::{Deserialize, Serialize};

use super::VisibilityTier;

/// Identifier of a worker or operator, issued by the identity service.
pub type UserId = String;

/// Identifier of a pharmacy, issued by the pharmacy directory.
pub type PharmacyId = String;

/// The professional role a shift needs filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Registered pharmacist.
    Pharmacist,
    /// Intern pharmacist.
    Intern,
    /// Pharmacy student.
    Student,
    /// Pharmacy assistant.
    Assistant,
    /// Dispensary technician.
    Technician,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Pharmacist => "PHARMACIST",
            Role::Intern => "INTERN",
            Role::Student => "STUDENT",
            Role::Assistant => "ASSISTANT",
            Role::Technician => "TECHNICIAN",
        };
        f.write_str(name)
    }
}

/// Represents the type of employment arrangement a shift is offered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    /// Full-time employment.
    FullTime,
    /// Part-time employment with a regular pattern.
    PartTime,
    /// Locum engagement for a fixed period.
    Locum,
    /// Casual engagement with no guaranteed hours.
    Casual,
}

/// A worker's membership of a pharmacy roster.
///
/// `audience_tier` is the narrowest tier the worker belongs to for this
/// pharmacy: a full-time employee sees shifts from `FULL_PART_TIME` onwards,
/// a favourite locum from `LOCUM_CASUAL` onwards, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    /// The worker's identifier.
    pub user_id: UserId,
    /// Roles the worker may be assigned to.
    pub roles: Vec<Role>,
    /// The narrowest audience the worker belongs to.
    pub audience_tier: VisibilityTier,
}

impl RosterMember {
    /// Returns true if the member can work `role`.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_engine::models::{RosterMember, Role, VisibilityTier};
    ///
    /// let member = RosterMember {
    ///     user_id: "u-1".to_string(),
    ///     roles: vec![Role::Pharmacist],
    ///     audience_tier: VisibilityTier::FullPartTime,
    /// };
    /// assert!(member.can_work(Role::Pharmacist));
    /// assert!(!member.can_work(Role::Assistant));
    /// ```
    pub fn can_work(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
