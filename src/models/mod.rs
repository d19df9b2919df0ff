//! Core data models for the shift engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod employee;
mod holiday;
mod pharmacy;
mod requests;
mod shift;
mod slot;
mod visibility;

pub use assignment::{Assignment, OpenShift, OpenShiftView};
pub use employee::{EmploymentType, PharmacyId, Role, RosterMember, UserId};
pub use holiday::{HolidayCalendar, PublicHoliday};
pub use pharmacy::{Pharmacy, RateConfig};
pub use requests::{LeaveRequest, LeaveStatus, LeaveType, SwapRequest, SwapStatus};
pub use shift::{EscalationSchedule, Shift};
pub use slot::{Occurrence, SlotTemplate};
pub use visibility::VisibilityTier;
