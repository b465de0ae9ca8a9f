//! Store-local calendar dates, shift status and week boundaries
//!
//! All "today" computations go through a [`Clock`] pinned to the store's
//! single fixed UTC offset. Two week conventions coexist on purpose:
//! the owner's week view uses ISO weeks (Monday start) and the personal
//! weekly-hours total uses Sunday-start weeks.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SchedulerError};

use super::clock::{duration_hours, ClockTime};

/// Source of the store-local current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated in the store's fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct StoreClock {
    offset: FixedOffset,
}

impl StoreClock {
    pub fn new(offset: FixedOffset) -> Self {
        StoreClock { offset }
    }

    /// Build a store clock from an offset in minutes east of UTC
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = store_offset(minutes)?;
        Ok(StoreClock { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for StoreClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// A clock frozen on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Convert an offset in minutes east of UTC into a [`FixedOffset`]
pub fn store_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            SchedulerError::ConfigError(format!(
                "UTC offset of {} minutes is out of range",
                minutes
            ))
        })
}

/// Parse a shift date.
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp; timestamps
/// are converted into the store offset before the calendar date is taken.
pub fn parse_shift_date(input: &str, offset: FixedOffset) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.with_timezone(&offset).date_naive())
        .map_err(|_| {
            SchedulerError::Validation(format!(
                "Invalid date '{}', expected YYYY-MM-DD or an RFC 3339 timestamp",
                input
            ))
        })
}

/// Status of a shift relative to the store-local current date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Completed,
    Today,
    Upcoming,
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftStatus::Completed => write!(f, "completed"),
            ShiftStatus::Today => write!(f, "today"),
            ShiftStatus::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// Classify a shift date against today
pub fn classify(date: NaiveDate, today: NaiveDate) -> ShiftStatus {
    if date == today {
        ShiftStatus::Today
    } else if date < today {
        ShiftStatus::Completed
    } else {
        ShiftStatus::Upcoming
    }
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate every date in the range, both ends included
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Number of days in the range, both ends included
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// ISO week (Monday through Sunday) containing `today`. Used by the owner week view.
pub fn iso_week(today: NaiveDate) -> DateRange {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    DateRange::new(start, start + Duration::days(6))
}

/// Sunday-start week (Sunday through Saturday) containing `today`.
/// Used by the personal weekly-hours total.
pub fn sunday_week(today: NaiveDate) -> DateRange {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    DateRange::new(start, start + Duration::days(6))
}

/// Sum shift durations whose date falls inside `week`
pub fn weekly_hours<I>(shifts: I, week: &DateRange) -> f64
where
    I: IntoIterator<Item = (NaiveDate, ClockTime, ClockTime)>,
{
    shifts
        .into_iter()
        .filter(|(date, _, _)| week.contains(*date))
        .map(|(_, start, end)| duration_hours(start, end))
        .sum()
}
