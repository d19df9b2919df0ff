//! Public holiday calendar used when rating occurrences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A public holiday.
///
/// # Example
///
/// ```
/// use shift_engine::models::PublicHoliday;
/// use chrono::NaiveDate;
///
/// let holiday = PublicHoliday {
///     date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
///     name: "King's Birthday".to_string(),
///     region: "national".to_string(),
/// };
/// assert_eq!(holiday.region, "national");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// The date of the public holiday.
    pub date: NaiveDate,
    /// The name of the public holiday.
    pub name: String,
    /// The region where this holiday applies (e.g., "national", "VIC", "NSW").
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "national".to_string()
}

/// A set of public holidays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    holidays: Vec<PublicHoliday>,
}

impl HolidayCalendar {
    /// Creates a calendar from a list of holidays.
    pub fn new(holidays: Vec<PublicHoliday>) -> Self {
        Self { holidays }
    }

    /// Checks if a given date is a public holiday in any region.
    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.date == date)
    }

    /// Returns the holidays.
    pub fn holidays(&self) -> &[PublicHoliday] {
        &self.holidays
    }
}
