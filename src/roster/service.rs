//! Roster lifecycle operations.
//!
//! [`RosterService`] is the single entry point for everything that changes a
//! shift, an assignment, an open shift or a request. Collaborator lookups
//! (pharmacy directory, roster membership) happen before the store's write
//! lock is taken; every check that depends on roster state happens inside it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::directory::{PharmacyDirectory, RosterMembership};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, EmploymentType, EscalationSchedule, LeaveRequest, LeaveStatus, LeaveType,
    Occurrence, OpenShift, OpenShiftView, PharmacyId, Role, Shift, SlotTemplate, SwapRequest,
    SwapStatus, UserId, VisibilityTier,
};
use crate::scheduling::{
    TierSequence, due_tier, escalate, expand_all, initial_tier, retarget, validate_schedule,
};

use super::store::{RosterState, RosterStore};

/// Input for [`RosterService::create_shift`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShift {
    /// The posting pharmacy.
    pub pharmacy_id: PharmacyId,
    /// The role needed.
    pub role_needed: Role,
    /// The engagement offered.
    pub employment_type: EmploymentType,
    /// Slot definitions.
    pub slots: Vec<SlotTemplate>,
    /// Starting tier; the pharmacy's first tier when absent.
    #[serde(default)]
    pub visibility: Option<VisibilityTier>,
    /// Planned escalations.
    #[serde(default)]
    pub escalate_to: EscalationSchedule,
    /// Whether one worker must take every occurrence.
    #[serde(default)]
    pub single_user_only: bool,
    /// Workers assigned up front. Empty means every occurrence is open.
    #[serde(default)]
    pub assign_users: Vec<UserId>,
}

/// Changes for [`RosterService::edit_shift`]. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftPatch {
    /// Replacement slot definitions.
    #[serde(default)]
    pub slots: Option<Vec<SlotTemplate>>,
    /// New role.
    #[serde(default)]
    pub role_needed: Option<Role>,
    /// New engagement.
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    /// New audience; must not be narrower than the current one.
    #[serde(default)]
    pub visibility: Option<VisibilityTier>,
    /// Replacement escalation schedule.
    #[serde(default)]
    pub escalate_to: Option<EscalationSchedule>,
    /// New single-worker flag.
    #[serde(default)]
    pub single_user_only: Option<bool>,
}

/// A shift with everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftView {
    /// The shift record.
    pub shift: Shift,
    /// Its occurrences in date order.
    pub occurrences: Vec<Occurrence>,
    /// Filled occurrences.
    pub assignments: Vec<Assignment>,
    /// Unfilled occurrences.
    pub open_shifts: Vec<OpenShift>,
}

/// An escalation that was applied to a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEscalation {
    /// The escalated shift.
    pub shift_id: Uuid,
    /// The tier before.
    pub from: VisibilityTier,
    /// The tier after.
    pub to: VisibilityTier,
    /// The occurrence released by unassigning, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<OpenShift>,
}

/// Input for [`RosterService::request_leave`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeave {
    /// The assignment the worker cannot work.
    pub assignment_id: Uuid,
    /// The requesting worker.
    pub user_id: UserId,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
}

/// Input for [`RosterService::request_swap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwap {
    /// The pharmacy the occurrence belongs to.
    pub pharmacy_id: PharmacyId,
    /// The role to be covered.
    pub role: Role,
    /// The occurrence to be covered.
    pub occurrence: Occurrence,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
    /// The requesting worker.
    pub requested_by: UserId,
}

/// Changes to a pending swap request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPatch {
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
    /// New occurrence.
    #[serde(default)]
    pub occurrence: Option<Occurrence>,
    /// New note.
    #[serde(default)]
    pub note: Option<String>,
}

/// The effect of deciding a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// The request after the decision.
    pub swap: SwapRequest,
    /// The reassigned assignment, when a replacement took it over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
    /// The open shift created when the occurrence was released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<OpenShift>,
}

/// Runs roster lifecycle operations against a [`RosterStore`].
pub struct RosterService {
    store: RosterStore,
    directory: Arc<dyn PharmacyDirectory>,
    membership: Arc<dyn RosterMembership>,
    max_recurrence_days: i64,
}

impl RosterService {
    /// Creates a service with an empty roster.
    pub fn new(
        directory: Arc<dyn PharmacyDirectory>,
        membership: Arc<dyn RosterMembership>,
        max_recurrence_days: i64,
    ) -> Self {
        Self {
            store: RosterStore::new(),
            directory,
            membership,
            max_recurrence_days,
        }
    }

    fn tiers_for(&self, pharmacy_id: &str) -> EngineResult<TierSequence> {
        let pharmacy = self.directory.pharmacy(pharmacy_id)?;
        TierSequence::for_pharmacy(&pharmacy)
    }

    fn validate_slots(&self, slots: &[SlotTemplate]) -> EngineResult<Vec<Occurrence>> {
        if slots.is_empty() {
            return Err(EngineError::validation("slots", "at least one slot is required"));
        }
        for (i, slot) in slots.iter().enumerate() {
            slot.validate(i, self.max_recurrence_days)?;
        }
        let occurrences = expand_all(slots);
        if occurrences.is_empty() {
            return Err(EngineError::validation("slots", "slots produce no occurrences"));
        }
        Ok(occurrences)
    }

    fn require_operator(&self, pharmacy_id: &str, user_id: &str) -> EngineResult<()> {
        if self.membership.is_operator(pharmacy_id, user_id) {
            Ok(())
        } else {
            Err(EngineError::forbidden(format!(
                "{} is not an operator of pharmacy {}",
                user_id, pharmacy_id
            )))
        }
    }

    // Shifts

    /// Creates a shift and its assignments or open shifts.
    ///
    /// With pinned users every occurrence gets one assignment per user;
    /// without, every occurrence becomes an open shift. Nothing is written
    /// unless every check passes.
    ///
    /// # Errors
    ///
    /// - `Validation` for bad slots, tiers, schedules or pinned users
    /// - `NotFound` for an unknown pharmacy
    /// - `Conflict` when a pinned user is already booked for an overlapping occurrence
    pub fn create_shift(&self, input: NewShift) -> EngineResult<ShiftView> {
        let occurrences = self.validate_slots(&input.slots)?;
        let tiers = self.tiers_for(&input.pharmacy_id)?;
        let current = initial_tier(&tiers, input.visibility)?;
        validate_schedule(&tiers, current, &input.escalate_to)?;
        self.validate_pinned_users(&input, &occurrences)?;

        let now = Utc::now();
        let shift = Shift {
            id: Uuid::new_v4(),
            pharmacy_id: input.pharmacy_id,
            role_needed: input.role_needed,
            employment_type: input.employment_type,
            slots: input.slots,
            current_visibility: current,
            escalation_schedule: input.escalate_to,
            single_user_only: input.single_user_only,
            created_at: now,
            updated_at: now,
        };

        let view = self.store.write(|state| {
            for user in &input.assign_users {
                for occurrence in &occurrences {
                    if let Some(existing) = state.overlapping_assignment(user, occurrence, None) {
                        return Err(EngineError::conflict(format!(
                            "{} is already booked for {} which overlaps {}",
                            user, existing.occurrence, occurrence
                        )));
                    }
                }
            }

            for occurrence in &occurrences {
                if input.assign_users.is_empty() {
                    state.insert_open_shift(OpenShift::new(shift.id, *occurrence, shift.role_needed));
                }
                for user in &input.assign_users {
                    state.insert_assignment(Assignment::new(shift.id, *occurrence, user.clone()));
                }
            }
            state.insert_shift(shift.clone());
            Ok(build_view(state, &shift))
        })?;

        info!(
            shift_id = %view.shift.id,
            pharmacy_id = %view.shift.pharmacy_id,
            occurrences = view.occurrences.len(),
            assignments = view.assignments.len(),
            open_shifts = view.open_shifts.len(),
            visibility = %view.shift.current_visibility,
            "Shift created"
        );

        Ok(view)
    }

    fn validate_pinned_users(&self, input: &NewShift, occurrences: &[Occurrence]) -> EngineResult<()> {
        if input.assign_users.is_empty() {
            return Ok(());
        }
        if input.single_user_only && input.assign_users.len() > 1 {
            return Err(EngineError::validation(
                "assign_users",
                "a single-user shift takes at most one assigned user",
            ));
        }
        let eligible = self
            .membership
            .eligible_users(&input.pharmacy_id, input.role_needed);
        for (i, user) in input.assign_users.iter().enumerate() {
            if input.assign_users[..i].contains(user) {
                return Err(EngineError::validation(
                    "assign_users",
                    format!("{} is listed more than once", user),
                ));
            }
            if !eligible.contains(user) {
                return Err(EngineError::validation(
                    "assign_users",
                    format!(
                        "{} cannot work {} at pharmacy {}",
                        user, input.role_needed, input.pharmacy_id
                    ),
                ));
            }
        }

        // One worker on every occurrence means occurrences must not overlap.
        for pair in occurrences.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(EngineError::validation(
                    "slots",
                    format!("occurrences {} and {} overlap", pair[0], pair[1]),
                ));
            }
        }
        Ok(())
    }

    /// Returns a shift with its occurrences, assignments and open shifts.
    pub fn get_shift(&self, id: Uuid) -> EngineResult<ShiftView> {
        self.store.read(|state| {
            let shift = state.shift(id)?;
            Ok(build_view(state, shift))
        })
    }

    /// Edits a shift.
    ///
    /// Occurrences kept by the edit keep their assignments and open shifts.
    /// New occurrences become open shifts. Removed occurrences lose theirs,
    /// unless an assignment on one has a pending leave or swap, which blocks
    /// the whole edit.
    ///
    /// # Errors
    ///
    /// - `Validation` for bad slots, a narrower audience or a bad schedule
    /// - `NotFound` for an unknown shift
    /// - `Conflict` when a removed occurrence has a pending request, or
    ///   `single_user_only` is set on a shift already held by several workers
    pub fn edit_shift(&self, id: Uuid, patch: ShiftPatch) -> EngineResult<ShiftView> {
        if let Some(slots) = &patch.slots {
            self.validate_slots(slots)?;
        }
        let pharmacy_id = self
            .store
            .read(|state| state.shift(id).map(|s| s.pharmacy_id.clone()))?;
        let tiers = self.tiers_for(&pharmacy_id)?;

        let (view, added, removed) = self.store.write(|state| {
            let original = state.shift(id)?.clone();
            let mut updated = original.clone();

            if let Some(slots) = &patch.slots {
                updated.slots = slots.clone();
            }
            if let Some(role) = patch.role_needed {
                updated.role_needed = role;
            }
            if let Some(employment_type) = patch.employment_type {
                updated.employment_type = employment_type;
            }
            if let Some(single) = patch.single_user_only {
                updated.single_user_only = single;
            }
            match (patch.visibility, &patch.escalate_to) {
                (Some(tier), schedule) => retarget(&mut updated, &tiers, tier, schedule.clone())?,
                (None, Some(schedule)) => {
                    validate_schedule(&tiers, updated.current_visibility, schedule)?;
                    updated.escalation_schedule = schedule.clone();
                }
                (None, None) => {}
            }

            let before = original.occurrences();
            let after = updated.occurrences();
            let removed: Vec<Occurrence> = before
                .iter()
                .filter(|o| after.binary_search(*o).is_err())
                .copied()
                .collect();
            let added: Vec<Occurrence> = after
                .iter()
                .filter(|o| before.binary_search(*o).is_err())
                .copied()
                .collect();

            let assignments: Vec<Assignment> = state
                .assignments_for_shift(id)
                .into_iter()
                .cloned()
                .collect();

            for assignment in assignments.iter().filter(|a| removed.contains(&a.occurrence)) {
                if state.has_pending_request(assignment) {
                    return Err(EngineError::conflict(format!(
                        "occurrence {} has a pending leave or swap request",
                        assignment.occurrence
                    )));
                }
                state.ensure_no_approved_leave(assignment)?;
            }

            if updated.single_user_only {
                let mut workers: Vec<&str> = assignments
                    .iter()
                    .filter(|a| !removed.contains(&a.occurrence))
                    .map(|a| a.user_id.as_str())
                    .collect();
                workers.sort_unstable();
                workers.dedup();
                if workers.len() > 1 {
                    return Err(EngineError::conflict(
                        "shift is already held by more than one worker",
                    ));
                }
            }

            for assignment in assignments.iter().filter(|a| removed.contains(&a.occurrence)) {
                state.remove_assignment(assignment.id);
            }
            let open_ids: Vec<(Uuid, Occurrence)> = state
                .open_shifts_for_shift(id)
                .into_iter()
                .map(|o| (o.id, o.occurrence))
                .collect();
            for (open_id, occurrence) in open_ids {
                if removed.contains(&occurrence) {
                    state.remove_open_shift(open_id);
                } else if updated.role_needed != original.role_needed {
                    if let Some(mut open) = state.remove_open_shift(open_id) {
                        open.role_needed = updated.role_needed;
                        state.insert_open_shift(open);
                    }
                }
            }
            for occurrence in &added {
                state.insert_open_shift(OpenShift::new(id, *occurrence, updated.role_needed));
            }

            updated.updated_at = Utc::now();
            state.insert_shift(updated.clone());
            Ok((build_view(state, &updated), added.len(), removed.len()))
        })?;

        info!(
            shift_id = %id,
            added,
            removed,
            visibility = %view.shift.current_visibility,
            "Shift edited"
        );

        Ok(view)
    }

    /// Deletes a shift with its assignments and open shifts.
    ///
    /// # Errors
    ///
    /// `Conflict` while any of its assignments has a pending leave or swap,
    /// or carries approved leave.
    pub fn delete_shift(&self, id: Uuid) -> EngineResult<()> {
        self.store.write(|state| {
            state.shift(id)?;
            let assignments = state.assignments_for_shift(id);
            if assignments.iter().any(|a| state.has_pending_request(a)) {
                return Err(EngineError::conflict(
                    "shift has assignments with pending leave or swap requests",
                ));
            }
            for assignment in assignments {
                state.ensure_no_approved_leave(assignment)?;
            }
            state.remove_shift(id);
            Ok(())
        })?;

        info!(shift_id = %id, "Shift deleted");
        Ok(())
    }

    /// Escalates a shift to a wider tier, optionally releasing one assignment.
    ///
    /// The released assignment's occurrence becomes an open shift exposed at
    /// the new tier.
    ///
    /// # Errors
    ///
    /// - `Validation` unless `target` is an allowed tier later than the current one
    /// - `Validation` if the assignment belongs to another shift
    /// - `Conflict` if the assignment has a pending leave or swap, or
    ///   approved leave
    pub fn escalate_shift(
        &self,
        id: Uuid,
        target: VisibilityTier,
        unassign: Option<Uuid>,
    ) -> EngineResult<AppliedEscalation> {
        let pharmacy_id = self
            .store
            .read(|state| state.shift(id).map(|s| s.pharmacy_id.clone()))?;
        let tiers = self.tiers_for(&pharmacy_id)?;

        self.store.write(|state| {
            let mut shift = state.shift(id)?.clone();

            if let Some(assignment_id) = unassign {
                let assignment = state.assignment(assignment_id)?;
                if assignment.shift_id != id {
                    return Err(EngineError::validation(
                        "unassign_assignment_id",
                        "assignment does not belong to this shift",
                    ));
                }
                if state.has_pending_request(assignment) {
                    return Err(EngineError::conflict(
                        "assignment has a pending leave or swap request",
                    ));
                }
                state.ensure_no_approved_leave(assignment)?;
            }

            let escalation = escalate(&mut shift, &tiers, target)?;
            shift.updated_at = Utc::now();
            state.insert_shift(shift);

            let released = match unassign {
                Some(assignment_id) => Some(state.release_assignment(assignment_id)?),
                None => None,
            };
            if let Some(open) = &released {
                info!(shift_id = %id, open_shift_id = %open.id, "Assignment released on escalation");
            }

            Ok(AppliedEscalation {
                shift_id: id,
                from: escalation.from,
                to: escalation.to,
                released,
            })
        })
    }

    /// Applies every escalation that has fallen due by `now`.
    ///
    /// Running it again with the same `now` applies nothing. Shifts whose
    /// pharmacy cannot be looked up are skipped and retried on the next run.
    pub fn run_due_escalations(&self, now: DateTime<Utc>) -> Vec<AppliedEscalation> {
        let candidates: Vec<(Uuid, PharmacyId)> = self.store.read(|state| {
            state
                .shifts()
                .filter(|s| !s.escalation_schedule.is_empty())
                .map(|s| (s.id, s.pharmacy_id.clone()))
                .collect()
        });

        let mut tiers_by_pharmacy: HashMap<PharmacyId, TierSequence> = HashMap::new();
        let mut applied = Vec::new();

        for (shift_id, pharmacy_id) in candidates {
            let tiers = match tiers_by_pharmacy.get(&pharmacy_id) {
                Some(tiers) => tiers.clone(),
                None => match self.tiers_for(&pharmacy_id) {
                    Ok(tiers) => {
                        tiers_by_pharmacy.insert(pharmacy_id.clone(), tiers.clone());
                        tiers
                    }
                    Err(e) => {
                        warn!(shift_id = %shift_id, pharmacy_id = %pharmacy_id, error = %e, "Skipping due escalation");
                        continue;
                    }
                },
            };

            let result = self.store.write(|state| {
                // The shift may have been deleted or escalated since the snapshot.
                let Ok(shift) = state.shift_mut(shift_id) else {
                    return Ok(None);
                };
                let Some(target) = due_tier(shift, &tiers, now) else {
                    return Ok(None);
                };
                let escalation = escalate(shift, &tiers, target)?;
                shift.updated_at = now;
                Ok(Some(escalation))
            });

            match result {
                Ok(Some(escalation)) => applied.push(AppliedEscalation {
                    shift_id,
                    from: escalation.from,
                    to: escalation.to,
                    released: None,
                }),
                Ok(None) => {}
                Err(e) => warn!(shift_id = %shift_id, error = %e, "Due escalation failed"),
            }
        }

        debug!(applied = applied.len(), "Due escalation sweep finished");
        applied
    }

    // Open shifts

    /// Claims an open shift for a worker.
    ///
    /// The availability check and the conversion into an assignment happen
    /// under one write lock: of any number of concurrent claimers exactly one
    /// succeeds and the rest get `Conflict`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the open shift was already claimed, the worker is
    ///   double-booked, the shift is reserved for another worker, or its
    ///   role changed mid-claim
    /// - `Forbidden` if the shift is not yet visible to the worker or the
    ///   worker cannot work the role
    /// - `NotFound` for an unknown open shift
    pub fn claim_open_shift(&self, open_shift_id: Uuid, user_id: &str) -> EngineResult<Assignment> {
        let (pharmacy_id, role) = self.store.read(|state| {
            let open = state.open_shift(open_shift_id)?;
            let shift = state.shift(open.shift_id)?;
            Ok::<_, EngineError>((shift.pharmacy_id.clone(), open.role_needed))
        })?;

        let tiers = self.tiers_for(&pharmacy_id)?;
        let member = self.membership.member(&pharmacy_id, user_id);
        if let Some(member) = &member {
            if !member.can_work(role) {
                return Err(EngineError::forbidden(format!(
                    "{} cannot work {}",
                    user_id, role
                )));
            }
        }
        let audience = member
            .map(|m| m.audience_tier)
            .unwrap_or(VisibilityTier::Platform);

        let assignment = self.store.write(|state| {
            let open = state.open_shift(open_shift_id)?.clone();
            let shift = state.shift(open.shift_id)?;

            // An edit may have changed the role since it was checked.
            if open.role_needed != role {
                return Err(EngineError::conflict(format!(
                    "open shift now needs {}; refresh and retry",
                    open.role_needed
                )));
            }

            if !tiers.exposes(shift.current_visibility, audience) {
                return Err(EngineError::forbidden(format!(
                    "shift is visible to {} only",
                    shift.current_visibility
                )));
            }

            if let Some(existing) = state.overlapping_assignment(user_id, &open.occurrence, None) {
                let on_leave = state.approved_leave_for(existing.id).is_some();
                return Err(if on_leave {
                    EngineError::conflict(format!(
                        "{} has approved leave over {}",
                        user_id, existing.occurrence
                    ))
                } else {
                    EngineError::conflict(format!(
                        "{} is already booked for {}",
                        user_id, existing.occurrence
                    ))
                });
            }

            if shift.single_user_only
                && state
                    .assignments_for_shift(shift.id)
                    .iter()
                    .any(|a| a.user_id != user_id)
            {
                return Err(EngineError::conflict(
                    "shift is reserved for the worker already holding it",
                ));
            }

            state.convert_open_shift(open_shift_id, user_id)
        })?;

        info!(
            open_shift_id = %open_shift_id,
            assignment_id = %assignment.id,
            shift_id = %assignment.shift_id,
            user_id = %user_id,
            "Open shift claimed"
        );

        Ok(assignment)
    }

    /// Returns the open shifts `user_id` can see and work, in date order.
    pub fn list_open_shifts(&self, user_id: &str) -> Vec<OpenShiftView> {
        let candidates: Vec<OpenShiftView> = self.store.read(|state| {
            state
                .open_shifts()
                .filter_map(|open| {
                    let shift = state.shift(open.shift_id).ok()?;
                    Some(OpenShiftView {
                        open_shift: open.clone(),
                        pharmacy_id: shift.pharmacy_id.clone(),
                        visibility: shift.current_visibility,
                    })
                })
                .collect()
        });

        let mut tiers_by_pharmacy: HashMap<String, Option<TierSequence>> = HashMap::new();
        let mut visible: Vec<OpenShiftView> = candidates
            .into_iter()
            .filter(|view| {
                let tiers = tiers_by_pharmacy
                    .entry(view.pharmacy_id.clone())
                    .or_insert_with(|| match self.tiers_for(&view.pharmacy_id) {
                        Ok(tiers) => Some(tiers),
                        Err(e) => {
                            warn!(pharmacy_id = %view.pharmacy_id, error = %e, "Hiding open shifts of unknown pharmacy");
                            None
                        }
                    });
                let Some(tiers) = tiers else {
                    return false;
                };
                match self.membership.member(&view.pharmacy_id, user_id) {
                    Some(member) => {
                        member.can_work(view.open_shift.role_needed)
                            && tiers.exposes(view.visibility, member.audience_tier)
                    }
                    None => tiers.exposes(view.visibility, VisibilityTier::Platform),
                }
            })
            .collect();

        visible.sort_by_key(|v| v.open_shift.occurrence);
        visible
    }

    /// Looks up an unclaimed open shift.
    ///
    /// # Errors
    ///
    /// `Conflict` once the open shift has been claimed, `NotFound` otherwise.
    pub fn open_shift(&self, id: Uuid) -> EngineResult<OpenShift> {
        self.store.read(|state| state.open_shift(id).cloned())
    }

    /// Returns a worker's assignments in date order.
    pub fn user_assignments(&self, user_id: &str) -> Vec<Assignment> {
        self.store.read(|state| {
            state
                .assignments_for_user(user_id)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    // Leave

    /// Raises a leave request against the caller's assignment.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller does not hold the assignment
    /// - `Conflict` if the assignment already has a pending or approved
    ///   leave, or a pending swap
    pub fn request_leave(&self, input: NewLeave) -> EngineResult<LeaveRequest> {
        let leave = self.store.write(|state| {
            let assignment = state.assignment(input.assignment_id)?;
            if assignment.user_id != input.user_id {
                return Err(EngineError::forbidden(
                    "leave can only be requested for your own assignment",
                ));
            }
            if state.active_leave_for(assignment.id).is_some() {
                return Err(EngineError::conflict(
                    "assignment already has a pending or approved leave request",
                ));
            }
            if state.pending_swap_for(assignment, None).is_some() {
                return Err(EngineError::conflict("assignment has a pending swap request"));
            }

            let leave = LeaveRequest {
                id: Uuid::new_v4(),
                assignment_id: input.assignment_id,
                user_id: input.user_id.clone(),
                leave_type: input.leave_type,
                note: input.note.clone(),
                status: LeaveStatus::Pending,
                created_at: Utc::now(),
                decided_at: None,
                decided_by: None,
            };
            state.assignment_mut(input.assignment_id)?.leave_request_id = Some(leave.id);
            state.insert_leave(leave.clone());
            Ok(leave)
        })?;

        info!(
            leave_id = %leave.id,
            assignment_id = %leave.assignment_id,
            user_id = %leave.user_id,
            "Leave requested"
        );
        Ok(leave)
    }

    /// Approves a pending leave request. The assignment is kept and the
    /// worker is blocked from that occurrence.
    pub fn approve_leave(&self, id: Uuid, operator_id: &str) -> EngineResult<LeaveRequest> {
        self.decide_leave(id, operator_id, LeaveStatus::Approved)
    }

    /// Rejects a pending leave request.
    pub fn reject_leave(&self, id: Uuid, operator_id: &str) -> EngineResult<LeaveRequest> {
        self.decide_leave(id, operator_id, LeaveStatus::Rejected)
    }

    fn decide_leave(&self, id: Uuid, operator_id: &str, status: LeaveStatus) -> EngineResult<LeaveRequest> {
        let pharmacy_id = self.store.read(|state| {
            let leave = state.leave(id)?;
            let assignment = state.assignment(leave.assignment_id)?;
            state.shift(assignment.shift_id).map(|s| s.pharmacy_id.clone())
        })?;
        self.require_operator(&pharmacy_id, operator_id)?;

        let leave = self.store.write(|state| {
            let leave = state.leave_mut(id)?;
            if leave.status.is_terminal() {
                return Err(EngineError::conflict("leave request has already been decided"));
            }
            leave.status = status;
            leave.decided_at = Some(Utc::now());
            leave.decided_by = Some(operator_id.to_string());
            Ok(leave.clone())
        })?;

        info!(leave_id = %id, status = ?leave.status, operator_id = %operator_id, "Leave decided");
        Ok(leave)
    }

    /// Withdraws a pending leave request.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the caller raised it, `Conflict` once it is decided.
    pub fn cancel_leave(&self, id: Uuid, user_id: &str) -> EngineResult<()> {
        self.store.write(|state| {
            let leave = state.leave(id)?;
            if leave.user_id != user_id {
                return Err(EngineError::forbidden("only the requester can cancel a leave request"));
            }
            if leave.status.is_terminal() {
                return Err(EngineError::conflict("leave request has already been decided"));
            }
            let assignment_id = leave.assignment_id;
            state.remove_leave(id);
            if let Ok(assignment) = state.assignment_mut(assignment_id) {
                if assignment.leave_request_id == Some(id) {
                    assignment.leave_request_id = None;
                }
            }
            Ok(())
        })?;

        info!(leave_id = %id, user_id = %user_id, "Leave cancelled");
        Ok(())
    }

    // Swaps

    /// Raises a request for someone to cover an occurrence.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown pharmacy
    /// - `Conflict` if the requester already has a pending swap for the
    ///   occurrence, or the matching assignment has a pending leave
    pub fn request_swap(&self, input: NewSwap) -> EngineResult<SwapRequest> {
        self.directory.pharmacy(&input.pharmacy_id)?;

        let swap = self.store.write(|state| {
            check_swap_target(
                state,
                &input.pharmacy_id,
                &input.requested_by,
                &input.occurrence,
                None,
            )?;

            let swap = SwapRequest {
                id: Uuid::new_v4(),
                pharmacy_id: input.pharmacy_id.clone(),
                role: input.role,
                occurrence: input.occurrence,
                note: input.note.clone(),
                requested_by: input.requested_by.clone(),
                status: SwapStatus::Pending,
                replacement_user_id: None,
                created_at: Utc::now(),
                decided_at: None,
            };
            state.insert_swap(swap.clone());
            Ok(swap)
        })?;

        info!(
            swap_id = %swap.id,
            pharmacy_id = %swap.pharmacy_id,
            occurrence = %swap.occurrence,
            requested_by = %swap.requested_by,
            "Swap requested"
        );
        Ok(swap)
    }

    /// Changes a pending swap request.
    pub fn update_swap(&self, id: Uuid, user_id: &str, patch: SwapPatch) -> EngineResult<SwapRequest> {
        let swap = self.store.write(|state| {
            let mut swap = state.swap(id)?.clone();
            if swap.requested_by != user_id {
                return Err(EngineError::forbidden("only the requester can change a swap request"));
            }
            if swap.status.is_terminal() {
                return Err(EngineError::conflict("swap request has already been decided"));
            }

            if let Some(occurrence) = patch.occurrence {
                if occurrence != swap.occurrence {
                    check_swap_target(state, &swap.pharmacy_id, user_id, &occurrence, Some(id))?;
                    swap.occurrence = occurrence;
                }
            }
            if let Some(role) = patch.role {
                swap.role = role;
            }
            if let Some(note) = &patch.note {
                swap.note = note.clone();
            }

            state.insert_swap(swap.clone());
            Ok(swap)
        })?;

        info!(swap_id = %id, "Swap updated");
        Ok(swap)
    }

    /// Withdraws a pending swap request.
    pub fn cancel_swap(&self, id: Uuid, user_id: &str) -> EngineResult<()> {
        self.store.write(|state| {
            let swap = state.swap(id)?;
            if swap.requested_by != user_id {
                return Err(EngineError::forbidden("only the requester can cancel a swap request"));
            }
            if swap.status.is_terminal() {
                return Err(EngineError::conflict("swap request has already been decided"));
            }
            state.remove_swap(id);
            Ok(())
        })?;

        info!(swap_id = %id, user_id = %user_id, "Swap cancelled");
        Ok(())
    }

    /// Approves a pending swap request.
    ///
    /// When the requester holds a matching assignment it is handed to
    /// `replacement`, or released as an open shift when no replacement is
    /// named. Without a matching assignment only the decision is recorded.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless `operator_id` operates the pharmacy
    /// - `Validation` if the replacement cannot work the role, or there is no
    ///   matching assignment to hand over
    /// - `Conflict` if the request is decided, the replacement is
    ///   double-booked, or the assignment carries approved leave
    pub fn approve_swap(
        &self,
        id: Uuid,
        operator_id: &str,
        replacement: Option<UserId>,
    ) -> EngineResult<SwapOutcome> {
        let (pharmacy_id, role) = self
            .store
            .read(|state| state.swap(id).map(|s| (s.pharmacy_id.clone(), s.role)))?;
        self.require_operator(&pharmacy_id, operator_id)?;

        if let Some(user) = &replacement {
            let eligible = self
                .membership
                .member(&pharmacy_id, user)
                .is_some_and(|m| m.can_work(role));
            if !eligible {
                return Err(EngineError::validation(
                    "replacement_user_id",
                    format!("{} cannot work {} at pharmacy {}", user, role, pharmacy_id),
                ));
            }
        }

        let outcome = self.store.write(|state| {
            let swap = state.swap(id)?.clone();
            if swap.status.is_terminal() {
                return Err(EngineError::conflict("swap request has already been decided"));
            }
            let assignment = state.assignment_for_swap(&swap).cloned();

            let mut outcome = SwapOutcome {
                swap,
                assignment: None,
                released: None,
            };

            match (&assignment, &replacement) {
                (Some(assignment), Some(user)) => {
                    if *user == assignment.user_id {
                        return Err(EngineError::validation(
                            "replacement_user_id",
                            "replacement must be a different worker",
                        ));
                    }
                    state.ensure_no_approved_leave(assignment)?;
                    if let Some(existing) =
                        state.overlapping_assignment(user, &assignment.occurrence, None)
                    {
                        return Err(EngineError::conflict(format!(
                            "{} is already booked for {}",
                            user, existing.occurrence
                        )));
                    }
                    // A fresh assignment so no leave carries over to the replacement.
                    let replaced =
                        Assignment::new(assignment.shift_id, assignment.occurrence, user.as_str());
                    state.remove_assignment(assignment.id);
                    state.insert_assignment(replaced.clone());
                    outcome.assignment = Some(replaced);
                }
                (Some(assignment), None) => {
                    outcome.released = Some(state.release_assignment(assignment.id)?);
                }
                (None, Some(_)) => {
                    return Err(EngineError::validation(
                        "replacement_user_id",
                        "no assignment matches the swap request to hand over",
                    ));
                }
                (None, None) => {}
            }

            outcome.swap.status = SwapStatus::Approved;
            outcome.swap.replacement_user_id = replacement.clone();
            outcome.swap.decided_at = Some(Utc::now());
            state.insert_swap(outcome.swap.clone());
            Ok(outcome)
        })?;

        info!(
            swap_id = %id,
            operator_id = %operator_id,
            reassigned = outcome.assignment.is_some(),
            released = outcome.released.is_some(),
            "Swap approved"
        );
        Ok(outcome)
    }

    /// Rejects a pending swap request. Roster state is unchanged.
    pub fn reject_swap(&self, id: Uuid, operator_id: &str) -> EngineResult<SwapRequest> {
        let pharmacy_id = self
            .store
            .read(|state| state.swap(id).map(|s| s.pharmacy_id.clone()))?;
        self.require_operator(&pharmacy_id, operator_id)?;

        let swap = self.store.write(|state| {
            let swap = state.swap_mut(id)?;
            if swap.status.is_terminal() {
                return Err(EngineError::conflict("swap request has already been decided"));
            }
            swap.status = SwapStatus::Rejected;
            swap.decided_at = Some(Utc::now());
            Ok(swap.clone())
        })?;

        info!(swap_id = %id, operator_id = %operator_id, "Swap rejected");
        Ok(swap)
    }

    /// Publishes a pending swap to the open market on behalf of an external
    /// policy. The matching assignment, if any, is released as an open shift.
    pub fn auto_publish_swap(&self, id: Uuid) -> EngineResult<SwapOutcome> {
        let outcome = self.store.write(|state| {
            let mut swap = state.swap(id)?.clone();
            if swap.status.is_terminal() {
                return Err(EngineError::conflict("swap request has already been decided"));
            }
            let released = match state.assignment_for_swap(&swap).map(|a| a.id) {
                Some(assignment_id) => Some(state.release_assignment(assignment_id)?),
                None => None,
            };
            swap.status = SwapStatus::AutoPublished;
            swap.decided_at = Some(Utc::now());
            state.insert_swap(swap.clone());
            Ok(SwapOutcome {
                swap,
                assignment: None,
                released,
            })
        })?;

        info!(swap_id = %id, released = outcome.released.is_some(), "Swap auto-published");
        Ok(outcome)
    }
}

fn check_swap_target(
    state: &RosterState,
    pharmacy_id: &str,
    user_id: &str,
    occurrence: &Occurrence,
    except: Option<Uuid>,
) -> EngineResult<()> {
    if state
        .pending_swap_matching(pharmacy_id, user_id, occurrence, except)
        .is_some()
    {
        return Err(EngineError::conflict(
            "a pending swap request already exists for this occurrence",
        ));
    }
    if let Some(assignment) = state.matching_assignment(pharmacy_id, user_id, occurrence) {
        if state.pending_leave_for(assignment.id).is_some() {
            return Err(EngineError::conflict("assignment has a pending leave request"));
        }
    }
    Ok(())
}

fn build_view(state: &RosterState, shift: &Shift) -> ShiftView {
    ShiftView {
        shift: shift.clone(),
        occurrences: shift.occurrences(),
        assignments: state
            .assignments_for_shift(shift.id)
            .into_iter()
            .cloned()
            .collect(),
        open_shifts: state
            .open_shifts_for_shift(shift.id)
            .into_iter()
            .cloned()
            .collect(),
    }
}
