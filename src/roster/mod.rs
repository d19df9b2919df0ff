//! Roster state and the assignment lifecycle.
//!
//! - [`store`]: the lock-protected roster state
//! - [`service`]: every lifecycle operation on shifts, open shifts, leave and swaps

pub mod service;
pub mod store;

pub use service::{
    AppliedEscalation, NewLeave, NewShift, NewSwap, RosterService, ShiftPatch, ShiftView,
    SwapOutcome, SwapPatch,
};
pub use store::{RosterState, RosterStore};
