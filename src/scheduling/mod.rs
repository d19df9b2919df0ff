//! Occurrence expansion and visibility escalation.
//!
//! - [`recurrence`]: turns slot templates into dated occurrences
//! - [`escalation`]: tier sequences and the transitions between tiers
//! - [`sweeper`]: the background loop that applies scheduled escalations

pub mod escalation;
pub mod recurrence;
pub mod sweeper;

pub use escalation::{
    Escalation, TierSequence, due_tier, escalate, initial_tier, retarget, validate_schedule,
};
pub use recurrence::{expand, expand_all};
pub use sweeper::{EscalationScheduler, SchedulerError, SchedulerResult};
