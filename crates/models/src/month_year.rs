//! Calendar month value type.
//!
//! Subscriptions are billed per calendar month, so every date the service
//! deals with is reduced to a `MonthYear`. The textual form is `MM-YYYY`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A calendar month. Field order (year, then month) gives chronological `Ord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Result<Self, ModelError> {
        if !(1..=12).contains(&month) {
            return Err(ModelError::Validation(format!("month must be within 01..12, got {month}")));
        }
        if !(1..=9999).contains(&year) {
            return Err(ModelError::Validation(format!("year must be within 0001..9999, got {year}")));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 { self.year }

    pub fn month(&self) -> u32 { self.month }

    /// Months since year 0; consecutive months differ by exactly one.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// First day of the month, the representation stored in the database.
    pub fn first_day(&self) -> NaiveDate {
        // year/month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Truncate a date to its month; the day is discarded.
    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Number of months in `self..=end`, zero when `end` precedes `self`.
    pub fn months_through(&self, end: &MonthYear) -> i64 {
        (end.ordinal() - self.ordinal() + 1).max(0)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for MonthYear {
    type Err = ModelError;

    /// Strict `MM-YYYY`: two digits, dash, four digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::Validation(format!("invalid month-year '{s}', expected MM-YYYY"));
        let (mm, yyyy) = s.split_once('-').ok_or_else(invalid)?;
        if mm.len() != 2 || yyyy.len() != 4 {
            return Err(invalid());
        }
        if !mm.bytes().chain(yyyy.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year: i32 = yyyy.parse().map_err(|_| invalid())?;
        MonthYear::new(month, year)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}
