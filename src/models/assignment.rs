//! Assignments and open shifts.
//!
//! Every occurrence of a shift is either held by a worker through an
//! [`Assignment`] or waiting to be claimed as an [`OpenShift`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Occurrence, Role, UserId, VisibilityTier};

/// A worker holding one occurrence of a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier for the assignment.
    pub id: Uuid,
    /// The owning shift.
    pub shift_id: Uuid,
    /// The occurrence being worked.
    pub occurrence: Occurrence,
    /// The assigned worker.
    pub user_id: UserId,
    /// The most recent leave request raised against this assignment.
    #[serde(default)]
    pub leave_request_id: Option<Uuid>,
}

impl Assignment {
    /// Creates an assignment without leave.
    pub fn new(shift_id: Uuid, occurrence: Occurrence, user_id: impl Into<UserId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_id,
            occurrence,
            user_id: user_id.into(),
            leave_request_id: None,
        }
    }
}

/// An occurrence with nobody assigned, claimable by eligible workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShift {
    /// Unique identifier for the open shift.
    pub id: Uuid,
    /// The owning shift.
    pub shift_id: Uuid,
    /// The unfilled occurrence.
    pub occurrence: Occurrence,
    /// The role required to claim it.
    pub role_needed: Role,
}

impl OpenShift {
    /// Creates an open shift for an occurrence.
    pub fn new(shift_id: Uuid, occurrence: Occurrence, role_needed: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_id,
            occurrence,
            role_needed,
        }
    }
}

/// An open shift as seen by a worker, with the tier it is exposed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShiftView {
    /// The open shift.
    #[serde(flatten)]
    pub open_shift: OpenShift,
    /// The pharmacy that posted the shift.
    pub pharmacy_id: String,
    /// The owning shift's current tier.
    pub visibility: VisibilityTier,
}
