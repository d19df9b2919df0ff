//! Request and response bodies for the shift engine API.
//!
//! Shift, leave and swap creation bodies reuse the roster input types
//! directly; this module holds the shapes that exist only at the HTTP edge.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    EmploymentType, LeaveStatus, PharmacyId, RateConfig, Role, SlotTemplate, SwapStatus, UserId,
    VisibilityTier,
};
use crate::rates::RateRow;
use crate::roster::{AppliedEscalation, SwapPatch};

use super::response::ApiError;

/// Body of `POST /shifts/:id/escalate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalateRequest {
    /// The tier to move the shift to.
    pub target_visibility: VisibilityTier,
    /// Assignment to release as an open shift at the new tier.
    #[serde(default)]
    pub unassign_assignment_id: Option<Uuid>,
}

/// Body of `POST /open-shifts/claim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// The shift the open occurrence belongs to.
    pub shift_id: Uuid,
    /// The open shift being claimed.
    pub occurrence_id: Uuid,
    /// The claiming worker.
    pub user_id: UserId,
}

/// Query string naming the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    /// The acting user.
    pub user_id: UserId,
}

/// Body of `PATCH /leave-requests/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDecisionRequest {
    /// `APPROVED` or `REJECTED`.
    pub status: LeaveStatus,
    /// The deciding operator.
    pub operator_id: UserId,
}

/// Body of `PATCH /swap-requests/:id`.
///
/// With a `status` the body is an operator or policy decision; without one
/// it edits the request on behalf of `user_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapUpdateRequest {
    /// The decision being recorded.
    #[serde(default)]
    pub status: Option<SwapStatus>,
    /// The deciding operator.
    #[serde(default)]
    pub operator_id: Option<UserId>,
    /// Worker taking over the assignment on approval.
    #[serde(default)]
    pub replacement_user_id: Option<UserId>,
    /// The requester editing the request.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Field edits.
    #[serde(flatten)]
    pub patch: SwapPatch,
}

/// What a [`SwapUpdateRequest`] asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapAction {
    /// The requester edits a pending request.
    Edit {
        /// The requester.
        user_id: UserId,
        /// Field edits.
        patch: SwapPatch,
    },
    /// An operator approves, optionally naming a replacement.
    Approve {
        /// The deciding operator.
        operator_id: UserId,
        /// Worker taking over the assignment.
        replacement: Option<UserId>,
    },
    /// An operator rejects.
    Reject {
        /// The deciding operator.
        operator_id: UserId,
    },
    /// The publishing policy releases the request to the open market.
    AutoPublish,
}

impl SwapUpdateRequest {
    /// Works out which transition the body asks for.
    pub fn into_action(self) -> Result<SwapAction, ApiError> {
        let operator = |operator_id: Option<UserId>| {
            operator_id.ok_or_else(|| ApiError::validation_error("operator_id is required for a decision"))
        };
        match self.status {
            None => {
                let user_id = self
                    .user_id
                    .ok_or_else(|| ApiError::validation_error("user_id is required to edit a swap request"))?;
                Ok(SwapAction::Edit {
                    user_id,
                    patch: self.patch,
                })
            }
            Some(SwapStatus::Approved) => Ok(SwapAction::Approve {
                operator_id: operator(self.operator_id)?,
                replacement: self.replacement_user_id,
            }),
            Some(SwapStatus::Rejected) => Ok(SwapAction::Reject {
                operator_id: operator(self.operator_id)?,
            }),
            Some(SwapStatus::AutoPublished) => Ok(SwapAction::AutoPublish),
            Some(SwapStatus::Pending) => Err(ApiError::validation_error(
                "status must be APPROVED, REJECTED or AUTO_PUBLISHED",
            )),
        }
    }
}

/// Body of `POST /rates/resolve`.
///
/// Slots are expanded server-side so the response rows line up with the
/// occurrences a shift created from the same slots would have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResolveRequest {
    /// The pharmacy posting the shift.
    pub pharmacy_id: PharmacyId,
    /// The role being rated.
    pub role: Role,
    /// The engagement the shift is offered under.
    pub employment_type: EmploymentType,
    /// Slot templates to expand and rate.
    pub slots: Vec<SlotTemplate>,
    /// Pharmacist day-type rates; ignored for other roles.
    #[serde(default)]
    pub rate_config: Option<RateConfig>,
}

/// Response of `POST /rates/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResolveResponse {
    /// One row per occurrence, in date order.
    pub rows: Vec<RateRow>,
    /// Rates to submit; `None` where the operator has to enter one.
    pub rates: Vec<Option<Decimal>>,
}

/// Body of `POST /escalations/run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscalationRunRequest {
    /// Evaluate schedules as of this instant instead of now.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

/// Response of `POST /escalations/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRunResponse {
    /// Escalations applied by this sweep.
    pub applied: Vec<AppliedEscalation>,
}
