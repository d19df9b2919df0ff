//! Slot templates and the occurrences derived from them.
//!
//! A [`SlotTemplate`] is what an operator authors: a date, a time window and
//! an optional weekly recurrence. An [`Occurrence`] is one concrete dated
//! instance of that template. Occurrences are never stored on their own;
//! they are regenerated from their template whenever they are needed.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An authored slot, possibly recurring on a weekly pattern.
///
/// # Example
///
/// ```
/// use shift_engine::models::SlotTemplate;
/// use chrono::{NaiveDate, NaiveTime, Weekday};
///
/// let slot = SlotTemplate {
///     date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     is_recurring: true,
///     recurring_days: vec![Weekday::Mon, Weekday::Wed],
///     recurring_end_date: Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
/// };
/// assert!(slot.validate(0, 366).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTemplate {
    /// The first (or only) date of the slot.
    pub date: NaiveDate,
    /// Local start time.
    pub start_time: NaiveTime,
    /// Local end time, strictly after `start_time` on the same day.
    pub end_time: NaiveTime,
    /// Whether the slot repeats weekly until `recurring_end_date`.
    #[serde(default)]
    pub is_recurring: bool,
    /// Weekdays the slot repeats on.
    #[serde(default)]
    pub recurring_days: Vec<Weekday>,
    /// Last date (inclusive) a recurring slot may produce an occurrence on.
    #[serde(default)]
    pub recurring_end_date: Option<NaiveDate>,
}

impl SlotTemplate {
    /// Creates a single, non-recurring slot.
    pub fn single(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
            is_recurring: false,
            recurring_days: Vec::new(),
            recurring_end_date: None,
        }
    }

    /// Returns true if `weekday` is one of the recurrence days.
    pub fn repeats_on(&self, weekday: Weekday) -> bool {
        self.recurring_days.contains(&weekday)
    }

    /// Checks the slot before it is expanded.
    ///
    /// `index` is the slot's position in the owning shift and only shapes the
    /// field path in the error. `max_days` caps the recurrence window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if:
    /// - `end_time` is not strictly after `start_time` (overnight slots are unsupported)
    /// - a recurring slot has no end date or no recurrence days
    /// - a recurring slot ends before it starts
    /// - the recurrence window spans more than `max_days` days
    pub fn validate(&self, index: usize, max_days: i64) -> EngineResult<()> {
        let field = |name: &str| format!("slots[{}].{}", index, name);

        if self.end_time <= self.start_time {
            return Err(EngineError::validation(
                field("end_time"),
                format!(
                    "end time {} must be after start time {}; overnight slots are not supported",
                    self.end_time, self.start_time
                ),
            ));
        }

        if !self.is_recurring {
            return Ok(());
        }

        let end_date = self.recurring_end_date.ok_or_else(|| {
            EngineError::validation(
                field("recurring_end_date"),
                "recurring slots require an end date",
            )
        })?;

        if self.recurring_days.is_empty() {
            return Err(EngineError::validation(
                field("recurring_days"),
                "recurring slots require at least one weekday",
            ));
        }

        if end_date < self.date {
            return Err(EngineError::validation(
                field("recurring_end_date"),
                format!("end date {} is before slot date {}", end_date, self.date),
            ));
        }

        let span = (end_date - self.date).num_days() + 1;
        if span > max_days {
            return Err(EngineError::validation(
                field("recurring_end_date"),
                format!("recurrence spans {} days, limit is {}", span, max_days),
            ));
        }

        Ok(())
    }
}

/// One concrete dated instance of a slot.
///
/// Ordering is by date, then start time, then end time. That ordering is the
/// positional key used to correlate rate lookups with occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Occurrence {
    /// The calendar date.
    pub date: NaiveDate,
    /// Local start time.
    pub start_time: NaiveTime,
    /// Local end time.
    pub end_time: NaiveTime,
}

impl Occurrence {
    /// Creates an occurrence.
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
        }
    }

    /// Returns the weekday of the occurrence.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Returns true if both occurrences share a date and their times intersect.
    ///
    /// Touching windows (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

impl std::fmt::Display for Occurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.date,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}
