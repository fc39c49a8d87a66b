use chrono::{Datelike, NaiveDate};

/// A date of birth. Validity is guaranteed by `NaiveDate`; only the month
/// and day take part in greeting matching, the year is carried along for
/// display and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    pub fn new(date: NaiveDate) -> BirthDate {
        Self(date)
    }

    /// Year-blind match against a calendar day.
    pub fn matches_month_day(&self, month: u32, day: u32) -> bool {
        self.0.month() == month && self.0.day() == day
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}
