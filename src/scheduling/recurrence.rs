//! Slot recurrence expansion.
//!
//! Turns [`SlotTemplate`]s into the concrete [`Occurrence`]s they describe.
//! Expansion is pure and restartable: the same template always yields the
//! same occurrences, so callers regenerate rather than cache them.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::{Occurrence, SlotTemplate};

/// Expands a single slot into its occurrences, in date order.
///
/// - A non-recurring slot yields exactly one occurrence on `slot.date`.
/// - A recurring slot walks every day from `slot.date` to
///   `slot.recurring_end_date` inclusive and yields the days whose weekday is
///   in `slot.recurring_days`.
/// - A recurring slot whose end date is missing or before its start date
///   yields nothing. [`SlotTemplate::validate`] rejects such slots up front.
///
/// # Example
///
/// ```
/// use shift_engine::models::SlotTemplate;
/// use shift_engine::scheduling::expand;
/// use chrono::{NaiveDate, NaiveTime, Weekday};
///
/// let slot = SlotTemplate {
///     date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), // Monday
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     is_recurring: true,
///     recurring_days: vec![Weekday::Mon, Weekday::Wed],
///     recurring_end_date: Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
/// };
///
/// let dates: Vec<_> = expand(&slot).iter().map(|o| o.date.to_string()).collect();
/// assert_eq!(dates, vec!["2024-06-03", "2024-06-05", "2024-06-10"]);
/// ```
pub fn expand(slot: &SlotTemplate) -> Vec<Occurrence> {
    if !slot.is_recurring {
        return vec![Occurrence::new(slot.date, slot.start_time, slot.end_time)];
    }

    let Some(end_date) = slot.recurring_end_date else {
        return Vec::new();
    };

    days_between(slot.date, end_date)
        .filter(|day| slot.repeats_on(day.weekday()))
        .map(|day| Occurrence::new(day, slot.start_time, slot.end_time))
        .collect()
}

/// Expands every slot of a shift into one sorted list.
///
/// The result is sorted ascending by (date, start time, end time) regardless
/// of slot order, with exact duplicates removed. Rate lookups correlate by
/// position in this list, so it must not be reordered afterwards.
pub fn expand_all(slots: &[SlotTemplate]) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = slots.iter().flat_map(expand).collect();
    occurrences.sort();
    occurrences.dedup();
    debug!(
        slots = slots.len(),
        occurrences = occurrences.len(),
        "Expanded slots"
    );
    occurrences
}

/// Iterates the days from `start` to `end` inclusive; empty when `end < start`.
fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
