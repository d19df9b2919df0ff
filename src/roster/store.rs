//! In-memory roster state.
//!
//! All shifts, assignments, open shifts and requests live in one
//! [`RosterState`] behind a single `parking_lot::RwLock`. Every lifecycle
//! operation runs as one closure under the write lock, so a check and the
//! write it guards can never be separated by another caller.
//!
//! Closures passed to [`RosterStore::write`] validate first and mutate last:
//! an `Err` must leave the state as it found it.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, LeaveRequest, LeaveStatus, Occurrence, OpenShift, Shift, SwapRequest, SwapStatus,
};

/// Everything the roster knows.
#[derive(Debug, Default)]
pub struct RosterState {
    shifts: HashMap<Uuid, Shift>,
    assignments: HashMap<Uuid, Assignment>,
    open_shifts: HashMap<Uuid, OpenShift>,
    /// Open shifts that were claimed, mapped to the assignment that replaced them.
    claimed: HashMap<Uuid, Uuid>,
    leaves: HashMap<Uuid, LeaveRequest>,
    swaps: HashMap<Uuid, SwapRequest>,
}

impl RosterState {
    // Shifts

    /// Returns the shift with `id`.
    pub fn shift(&self, id: Uuid) -> EngineResult<&Shift> {
        self.shifts.get(&id).ok_or_else(|| EngineError::not_found("Shift", id))
    }

    /// Returns the shift with `id` for mutation.
    pub fn shift_mut(&mut self, id: Uuid) -> EngineResult<&mut Shift> {
        self.shifts
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("Shift", id))
    }

    /// Returns all shifts.
    pub fn shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.values()
    }

    /// Stores a shift, replacing any with the same id.
    pub fn insert_shift(&mut self, shift: Shift) {
        self.shifts.insert(shift.id, shift);
    }

    /// Removes a shift with all of its assignments and open shifts.
    pub fn remove_shift(&mut self, id: Uuid) -> Option<Shift> {
        let shift = self.shifts.remove(&id)?;
        self.assignments.retain(|_, a| a.shift_id != id);
        self.open_shifts.retain(|_, o| o.shift_id != id);
        Some(shift)
    }

    // Assignments

    /// Returns the assignment with `id`.
    pub fn assignment(&self, id: Uuid) -> EngineResult<&Assignment> {
        self.assignments
            .get(&id)
            .ok_or_else(|| EngineError::not_found("Assignment", id))
    }

    /// Returns the assignment with `id` for mutation.
    pub fn assignment_mut(&mut self, id: Uuid) -> EngineResult<&mut Assignment> {
        self.assignments
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("Assignment", id))
    }

    /// Stores an assignment.
    pub fn insert_assignment(&mut self, assignment: Assignment) {
        self.assignments.insert(assignment.id, assignment);
    }

    /// Removes an assignment.
    pub fn remove_assignment(&mut self, id: Uuid) -> Option<Assignment> {
        self.assignments.remove(&id)
    }

    /// Returns a shift's assignments ordered by occurrence then user.
    pub fn assignments_for_shift(&self, shift_id: Uuid) -> Vec<&Assignment> {
        let mut assignments: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.shift_id == shift_id)
            .collect();
        assignments.sort_by(|a, b| {
            a.occurrence
                .cmp(&b.occurrence)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        assignments
    }

    /// Returns a worker's assignments ordered by occurrence.
    pub fn assignments_for_user(&self, user_id: &str) -> Vec<&Assignment> {
        let mut assignments: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .collect();
        assignments.sort_by_key(|a| a.occurrence);
        assignments
    }

    /// Returns an assignment of `user_id` overlapping `occurrence`, other than `except`.
    pub fn overlapping_assignment(
        &self,
        user_id: &str,
        occurrence: &Occurrence,
        except: Option<Uuid>,
    ) -> Option<&Assignment> {
        self.assignments.values().find(|a| {
            a.user_id == user_id && Some(a.id) != except && a.occurrence.overlaps(occurrence)
        })
    }

    /// Returns the assignment a swap request refers to, if one exists.
    ///
    /// Swaps are not bound to an assignment; they match the requester's
    /// assignment for the same occurrence at the same pharmacy.
    pub fn assignment_for_swap(&self, swap: &SwapRequest) -> Option<&Assignment> {
        self.matching_assignment(&swap.pharmacy_id, &swap.requested_by, &swap.occurrence)
    }

    /// Returns `user_id`'s assignment for `occurrence` at `pharmacy_id`.
    pub fn matching_assignment(
        &self,
        pharmacy_id: &str,
        user_id: &str,
        occurrence: &Occurrence,
    ) -> Option<&Assignment> {
        self.assignments.values().find(|a| {
            a.user_id == user_id
                && a.occurrence == *occurrence
                && self
                    .shifts
                    .get(&a.shift_id)
                    .is_some_and(|s| s.pharmacy_id == pharmacy_id)
        })
    }

    /// Turns an assignment back into an open shift for its occurrence.
    ///
    /// An assignment carrying approved leave stays put and this is a `Conflict`.
    pub fn release_assignment(&mut self, assignment_id: Uuid) -> EngineResult<OpenShift> {
        let assignment = self.assignment(assignment_id)?;
        self.ensure_no_approved_leave(assignment)?;
        let role = self.shift(assignment.shift_id)?.role_needed;
        let open = OpenShift::new(assignment.shift_id, assignment.occurrence, role);

        self.assignments.remove(&assignment_id);
        self.open_shifts.insert(open.id, open.clone());
        Ok(open)
    }

    // Open shifts

    /// Returns the open shift with `id`.
    ///
    /// A shift that was already claimed is a `Conflict`, not `NotFound`, so a
    /// late claimer knows to refresh rather than give up.
    pub fn open_shift(&self, id: Uuid) -> EngineResult<&OpenShift> {
        if let Some(open) = self.open_shifts.get(&id) {
            return Ok(open);
        }
        if self.claimed.contains_key(&id) {
            return Err(EngineError::conflict("open shift has already been claimed"));
        }
        Err(EngineError::not_found("OpenShift", id))
    }

    /// Stores an open shift.
    pub fn insert_open_shift(&mut self, open: OpenShift) {
        self.open_shifts.insert(open.id, open);
    }

    /// Removes an open shift without claiming it.
    pub fn remove_open_shift(&mut self, id: Uuid) -> Option<OpenShift> {
        self.open_shifts.remove(&id)
    }

    /// Returns all open shifts.
    pub fn open_shifts(&self) -> impl Iterator<Item = &OpenShift> {
        self.open_shifts.values()
    }

    /// Returns a shift's open shifts ordered by occurrence.
    pub fn open_shifts_for_shift(&self, shift_id: Uuid) -> Vec<&OpenShift> {
        let mut open: Vec<&OpenShift> = self
            .open_shifts
            .values()
            .filter(|o| o.shift_id == shift_id)
            .collect();
        open.sort_by_key(|o| o.occurrence);
        open
    }

    /// Converts an open shift into an assignment for `user_id`.
    ///
    /// This is the compare-and-swap at the heart of claiming: the open shift
    /// must still exist, and it is gone the moment this returns.
    pub fn convert_open_shift(&mut self, open_id: Uuid, user_id: &str) -> EngineResult<Assignment> {
        let open = self.open_shift(open_id)?.clone();
        let assignment = Assignment::new(open.shift_id, open.occurrence, user_id);

        self.open_shifts.remove(&open_id);
        self.claimed.insert(open_id, assignment.id);
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    // Leave

    /// Returns the leave request with `id`.
    pub fn leave(&self, id: Uuid) -> EngineResult<&LeaveRequest> {
        self.leaves
            .get(&id)
            .ok_or_else(|| EngineError::not_found("LeaveRequest", id))
    }

    /// Returns the leave request with `id` for mutation.
    pub fn leave_mut(&mut self, id: Uuid) -> EngineResult<&mut LeaveRequest> {
        self.leaves
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("LeaveRequest", id))
    }

    /// Stores a leave request.
    pub fn insert_leave(&mut self, leave: LeaveRequest) {
        self.leaves.insert(leave.id, leave);
    }

    /// Removes a leave request.
    pub fn remove_leave(&mut self, id: Uuid) -> Option<LeaveRequest> {
        self.leaves.remove(&id)
    }

    /// Returns the pending or approved leave on an assignment, if any.
    pub fn active_leave_for(&self, assignment_id: Uuid) -> Option<&LeaveRequest> {
        self.leaves.values().find(|l| {
            l.assignment_id == assignment_id
                && matches!(l.status, LeaveStatus::Pending | LeaveStatus::Approved)
        })
    }

    /// Returns the approved leave on an assignment, if any.
    pub fn approved_leave_for(&self, assignment_id: Uuid) -> Option<&LeaveRequest> {
        self.leaves
            .values()
            .find(|l| l.assignment_id == assignment_id && l.status == LeaveStatus::Approved)
    }

    /// Fails with `Conflict` if the assignment carries approved leave.
    ///
    /// The assignment is the record the leave points at, so it cannot be
    /// released, handed to another worker or removed.
    pub fn ensure_no_approved_leave(&self, assignment: &Assignment) -> EngineResult<()> {
        if self.approved_leave_for(assignment.id).is_some() {
            return Err(EngineError::conflict(format!(
                "assignment for {} has approved leave",
                assignment.occurrence
            )));
        }
        Ok(())
    }

    /// Returns the pending leave on an assignment, if any.
    pub fn pending_leave_for(&self, assignment_id: Uuid) -> Option<&LeaveRequest> {
        self.leaves
            .values()
            .find(|l| l.assignment_id == assignment_id && l.status == LeaveStatus::Pending)
    }

    // Swaps

    /// Returns the swap request with `id`.
    pub fn swap(&self, id: Uuid) -> EngineResult<&SwapRequest> {
        self.swaps
            .get(&id)
            .ok_or_else(|| EngineError::not_found("SwapRequest", id))
    }

    /// Returns the swap request with `id` for mutation.
    pub fn swap_mut(&mut self, id: Uuid) -> EngineResult<&mut SwapRequest> {
        self.swaps
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("SwapRequest", id))
    }

    /// Stores a swap request.
    pub fn insert_swap(&mut self, swap: SwapRequest) {
        self.swaps.insert(swap.id, swap);
    }

    /// Removes a swap request.
    pub fn remove_swap(&mut self, id: Uuid) -> Option<SwapRequest> {
        self.swaps.remove(&id)
    }

    /// Returns a pending swap by `user_id` for `occurrence` at `pharmacy_id`, other than `except`.
    pub fn pending_swap_matching(
        &self,
        pharmacy_id: &str,
        user_id: &str,
        occurrence: &Occurrence,
        except: Option<Uuid>,
    ) -> Option<&SwapRequest> {
        self.swaps.values().find(|s| {
            s.status == SwapStatus::Pending
                && Some(s.id) != except
                && s.pharmacy_id == pharmacy_id
                && s.requested_by == user_id
                && s.occurrence == *occurrence
        })
    }

    /// Returns a pending swap for this assignment, other than `except`.
    pub fn pending_swap_for(&self, assignment: &Assignment, except: Option<Uuid>) -> Option<&SwapRequest> {
        let pharmacy_id = self.shifts.get(&assignment.shift_id)?.pharmacy_id.as_str();
        self.pending_swap_matching(pharmacy_id, &assignment.user_id, &assignment.occurrence, except)
    }

    /// Returns true if the assignment has a pending leave or swap.
    pub fn has_pending_request(&self, assignment: &Assignment) -> bool {
        self.pending_leave_for(assignment.id).is_some()
            || self.pending_swap_for(assignment, None).is_some()
    }
}

/// Thread-safe owner of the [`RosterState`].
#[derive(Debug, Default)]
pub struct RosterStore {
    state: RwLock<RosterState>,
}

impl RosterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&RosterState) -> R) -> R {
        f(&self.state.read())
    }

    /// Runs `f` with exclusive access.
    ///
    /// The lock is held for the whole closure, so whatever `f` checks still
    /// holds when it writes.
    pub fn write<R>(&self, f: impl FnOnce(&mut RosterState) -> EngineResult<R>) -> EngineResult<R> {
        f(&mut self.state.write())
    }
}
