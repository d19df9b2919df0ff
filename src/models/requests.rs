//! Worker-initiated requests: leave and swap/cover.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Occurrence, PharmacyId, Role, UserId};

/// The kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    /// Personal illness.
    Sick,
    /// Annual leave.
    Annual,
    /// Personal leave other than illness.
    Personal,
    /// Caring for a family member.
    Carer,
    /// Compassionate or bereavement leave.
    Compassionate,
    /// Anything else; the note carries the detail.
    Other,
}

/// Status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Waiting for an operator decision.
    Pending,
    /// Approved; the worker is off for the occurrence.
    Approved,
    /// Rejected; nothing changed.
    Rejected,
}

impl LeaveStatus {
    /// Returns true once an operator has decided.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// A worker's request to be excused from an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The assignment the leave applies to.
    pub assignment_id: Uuid,
    /// The worker who raised the request.
    pub user_id: UserId,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// Free-text note from the worker.
    #[serde(default)]
    pub note: String,
    /// Current status.
    pub status: LeaveStatus,
    /// When the request was raised.
    pub created_at: DateTime<Utc>,
    /// When the request was decided.
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    /// The operator who decided.
    #[serde(default)]
    pub decided_by: Option<UserId>,
}

/// Status of a swap/cover request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    /// Waiting for an operator or publishing policy.
    Pending,
    /// Approved by an operator.
    Approved,
    /// Rejected by an operator.
    Rejected,
    /// Published straight to the open marketplace by an external policy.
    AutoPublished,
}

impl SwapStatus {
    /// Returns true once the request can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

/// A worker asking for an occurrence to be covered by someone else.
///
/// Unlike leave, a swap is not tied to an existing assignment: it can be
/// raised from an empty calendar slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The pharmacy the occurrence belongs to.
    pub pharmacy_id: PharmacyId,
    /// The role to be covered.
    pub role: Role,
    /// The occurrence to be covered.
    pub occurrence: Occurrence,
    /// Free-text note from the worker.
    #[serde(default)]
    pub note: String,
    /// The worker who raised the request.
    pub requested_by: UserId,
    /// Current status.
    pub status: SwapStatus,
    /// The worker who took over, when approval reassigned the occurrence.
    #[serde(default)]
    pub replacement_user_id: Option<UserId>,
    /// When the request was raised.
    pub created_at: DateTime<Utc>,
    /// When the request reached a terminal status.
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}
