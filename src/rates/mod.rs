//! Hourly rate lookup for shift occurrences.
//!
//! - [`contract`]: the request/response shapes and the [`RateResolver`] trait
//! - [`table`]: a resolver backed by the configured rate tables
//! - [`session`]: last-request-wins bookkeeping for callers authoring a shift
//!
//! Responses are matched to occurrences by position, so requests always carry
//! occurrences in [`expand_all`](crate::scheduling::expand_all) order.

pub mod contract;
pub mod session;
pub mod table;

pub use contract::{RateEntry, RateRequest, RateResolver};
pub use session::{ApplyOutcome, RateRow, RateSession, RateState, RateTicket};
pub use table::{RateDayType, TableRateResolver, classify};
