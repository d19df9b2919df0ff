//! Caller-side rate resolution state.
//!
//! A [`RateSession`] holds one rate row per occurrence of a shift being
//! authored and keeps it consistent while inputs change under it:
//!
//! - every input change or new lookup starts a new generation and cancels the
//!   lookup in flight, so only the latest request can ever be applied;
//! - a row the operator has edited by hand is dirty and no response touches it;
//! - a failed, mismatched or timed-out lookup becomes per-row errors, never a
//!   session-wide failure.

use std::time::Duration;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmploymentType, Occurrence, PharmacyId, RateConfig, Role};

use super::contract::{RateEntry, RateRequest, RateResolver};

/// Resolution state of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RateState {
    /// No lookup has been made since the inputs last changed.
    Unresolved,
    /// A lookup is in flight.
    Pending,
    /// The resolver supplied a rate.
    Resolved {
        /// Hourly rate.
        rate: Decimal,
    },
    /// The lookup failed for this row.
    Failed {
        /// Why the row could not be rated.
        error: String,
    },
    /// The operator entered a rate.
    Manual {
        /// Hourly rate.
        rate: Decimal,
    },
}

impl RateState {
    /// Returns the rate, if one is known.
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            RateState::Resolved { rate } | RateState::Manual { rate } => Some(*rate),
            _ => None,
        }
    }
}

/// One occurrence and its rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRow {
    /// The occurrence being rated.
    pub occurrence: Occurrence,
    /// Where its rate stands.
    pub state: RateState,
    /// Set once the operator overrides the rate; responses never overwrite it.
    pub dirty: bool,
}

impl RateRow {
    fn unresolved(occurrence: Occurrence) -> Self {
        Self {
            occurrence,
            state: RateState::Unresolved,
            dirty: false,
        }
    }
}

/// A lookup issued by [`RateSession::begin`].
#[derive(Debug, Clone)]
pub struct RateTicket {
    generation: u64,
    request: RateRequest,
    token: CancellationToken,
}

impl RateTicket {
    /// The generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The request to send to the resolver.
    pub fn request(&self) -> &RateRequest {
        &self.request
    }

    /// Cancelled as soon as a newer generation starts.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// What [`RateSession::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response was written.
    Applied {
        /// Rows whose state changed.
        updated: usize,
        /// Rows left alone because the operator had overridden them.
        skipped_dirty: usize,
    },
    /// The ticket was stale; nothing was written.
    Superseded,
}

#[derive(Debug)]
struct SessionState {
    generation: u64,
    pharmacy_id: PharmacyId,
    role: Role,
    employment_type: EmploymentType,
    rate_config: Option<RateConfig>,
    rows: Vec<RateRow>,
    in_flight: Option<CancellationToken>,
}

impl SessionState {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation
    }
}

/// Rate rows for one shift being authored.
///
/// # Example
///
/// ```
/// use shift_engine::models::{EmploymentType, Role};
/// use shift_engine::rates::{RateEntry, RateSession, ApplyOutcome};
/// use rust_decimal::Decimal;
///
/// let session = RateSession::new("ph-1", Role::Assistant, EmploymentType::PartTime);
/// let stale = session.begin();
/// let fresh = session.begin();
///
/// assert_eq!(session.apply(&stale, Ok(vec![])), ApplyOutcome::Superseded);
/// assert!(matches!(session.apply(&fresh, Ok(vec![])), ApplyOutcome::Applied { .. }));
/// ```
#[derive(Debug)]
pub struct RateSession {
    state: Mutex<SessionState>,
}

impl RateSession {
    /// Creates an empty session.
    pub fn new(pharmacy_id: impl Into<PharmacyId>, role: Role, employment_type: EmploymentType) -> Self {
        Self {
            state: Mutex::new(SessionState {
                generation: 0,
                pharmacy_id: pharmacy_id.into(),
                role,
                employment_type,
                rate_config: None,
                rows: Vec::new(),
                in_flight: None,
            }),
        }
    }

    /// Replaces the inputs the rates depend on.
    ///
    /// Starts a new generation and cancels any lookup in flight. Rows for
    /// occurrences that survive the change keep a manual override; every
    /// other row starts over as unresolved.
    pub fn set_inputs(
        &self,
        occurrences: Vec<Occurrence>,
        role: Role,
        employment_type: EmploymentType,
        rate_config: Option<RateConfig>,
    ) {
        let mut state = self.state.lock();
        let generation = state.next_generation();

        let rows: Vec<RateRow> = occurrences
            .into_iter()
            .map(|occurrence| {
                state
                    .rows
                    .iter()
                    .find(|r| r.dirty && r.occurrence == occurrence)
                    .cloned()
                    .unwrap_or_else(|| RateRow::unresolved(occurrence))
            })
            .collect();

        state.rows = rows;
        state.role = role;
        state.employment_type = employment_type;
        state.rate_config = rate_config;

        debug!(generation, rows = state.rows.len(), "Rate inputs changed");
    }

    /// Issues a lookup for the current inputs.
    ///
    /// Any earlier ticket is cancelled and will be discarded by [`apply`](Self::apply).
    pub fn begin(&self) -> RateTicket {
        let mut state = self.state.lock();
        let generation = state.next_generation();
        let token = CancellationToken::new();
        state.in_flight = Some(token.clone());

        for row in state.rows.iter_mut().filter(|r| !r.dirty) {
            row.state = RateState::Pending;
        }

        let request = RateRequest::new(
            state.pharmacy_id.clone(),
            state.role,
            state.employment_type,
            state.rows.iter().map(|r| r.occurrence).collect(),
            state.rate_config.clone(),
        );

        RateTicket {
            generation,
            request,
            token,
        }
    }

    /// Writes a lookup result into the rows.
    ///
    /// Stale tickets are ignored. Entries are matched to rows by position; a
    /// response of the wrong length or a failed call marks every clean row as
    /// failed.
    pub fn apply(&self, ticket: &RateTicket, result: EngineResult<Vec<RateEntry>>) -> ApplyOutcome {
        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            debug!(
                ticket = ticket.generation,
                current = state.generation,
                "Discarding superseded rate response"
            );
            return ApplyOutcome::Superseded;
        }
        state.in_flight = None;

        let row_count = state.rows.len();
        let new_states: Vec<RateState> = match result {
            Ok(entries) if entries.len() == row_count => entries
                .into_iter()
                .map(|entry| match entry {
                    RateEntry::Rate { rate } => RateState::Resolved { rate },
                    RateEntry::Error { error } => RateState::Failed { error },
                })
                .collect(),
            Ok(entries) => {
                warn!(
                    expected = row_count,
                    received = entries.len(),
                    "Rate response length mismatch"
                );
                let error = format!(
                    "rate response had {} entries for {} occurrences",
                    entries.len(),
                    row_count
                );
                vec![RateState::Failed { error }; row_count]
            }
            Err(e) => {
                warn!(error = %e, "Rate lookup failed");
                vec![RateState::Failed { error: e.to_string() }; row_count]
            }
        };

        let mut updated = 0;
        let mut skipped_dirty = 0;
        for (row, new_state) in state.rows.iter_mut().zip(new_states) {
            if row.dirty {
                skipped_dirty += 1;
                continue;
            }
            row.state = new_state;
            updated += 1;
        }

        ApplyOutcome::Applied {
            updated,
            skipped_dirty,
        }
    }

    /// Sets a row's rate by hand and marks it dirty.
    ///
    /// # Errors
    ///
    /// `Validation` when `index` is out of range or `rate` is negative.
    pub fn override_rate(&self, index: usize, rate: Decimal) -> EngineResult<()> {
        if rate.is_sign_negative() {
            return Err(EngineError::validation(
                format!("rates[{}]", index),
                "rate cannot be negative",
            ));
        }
        let mut state = self.state.lock();
        let row_count = state.rows.len();
        let row = state.rows.get_mut(index).ok_or_else(|| {
            EngineError::validation(
                format!("rates[{}]", index),
                format!("no occurrence at index {} of {}", index, row_count),
            )
        })?;
        row.state = RateState::Manual { rate };
        row.dirty = true;
        Ok(())
    }

    /// Runs a lookup against `resolver`, giving up after `timeout`.
    ///
    /// Returns [`ApplyOutcome::Superseded`] if a newer generation started
    /// while waiting. A timeout is written as per-row errors.
    pub async fn resolve(&self, resolver: &dyn RateResolver, timeout: Duration) -> ApplyOutcome {
        let ticket = self.begin();
        let token = ticket.token.clone();

        let result = tokio::select! {
            _ = token.cancelled() => return ApplyOutcome::Superseded,
            outcome = tokio::time::timeout(timeout, resolver.resolve(&ticket.request)) => match outcome {
                Ok(result) => result,
                Err(_) => Err(EngineError::UpstreamUnavailable {
                    message: format!("rate lookup timed out after {}ms", timeout.as_millis()),
                }),
            },
        };

        self.apply(&ticket, result)
    }

    /// Returns a snapshot of the rows.
    pub fn rows(&self) -> Vec<RateRow> {
        self.state.lock().rows.clone()
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Returns the rate to submit for each row.
    ///
    /// `None` means the operator must supply the rate by hand; it does not
    /// block submission.
    pub fn submission_rates(&self) -> Vec<Option<Decimal>> {
        self.state.lock().rows.iter().map(|r| r.state.rate()).collect()
    }
}
