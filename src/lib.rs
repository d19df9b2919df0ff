//! Shift scheduling engine for pharmacy staffing.
//!
//! This crate expands shift slot templates into dated occurrences, widens
//! the audience of unfilled shifts through per-pharmacy visibility tiers, and
//! runs the roster lifecycle: claiming open shifts, leave requests and
//! swap/cover requests. Hourly rates for occurrences come from a pluggable
//! [`rates::RateResolver`].
//!
//! The [`api`] module serves all of this over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod models;
pub mod rates;
pub mod roster;
pub mod scheduling;
