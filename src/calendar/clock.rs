//! Wall-clock shift times and duration math

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Result, SchedulerError};

lazy_static! {
    static ref CLOCK_TIME_REGEX: Regex =
        Regex::new(r"^(?P<hour>[01]\d|2[0-3]):(?P<minute>[0-5]\d)$").unwrap();
}

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day with minute precision, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Build a clock time from hour and minute, rejecting out-of-range values
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(SchedulerError::Validation(format!(
                "Time out of range: {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(ClockTime {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes) / 60
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes) % 60
    }

    /// Minutes since midnight
    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.minutes)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = CLOCK_TIME_REGEX.captures(s.trim()).ok_or_else(|| {
            SchedulerError::Validation(format!("Invalid time '{}', expected HH:MM", s))
        })?;
        // The regex guarantees two ASCII digits per group
        let hour: u32 = caps["hour"].parse().unwrap_or_default();
        let minute: u32 = caps["minute"].parse().unwrap_or_default();
        ClockTime::new(hour, minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an `HH:MM` string into a [`ClockTime`].
pub fn parse_clock_time(input: &str) -> Result<ClockTime> {
    input.parse()
}

/// Length of a shift in fractional hours.
///
/// When `end <= start` the shift crosses midnight and 24h is added to the end
/// before subtracting, so `22:00 -> 06:00` is 8 hours.
pub fn duration_hours(start: ClockTime, end: ClockTime) -> f64 {
    let s = start.minutes_since_midnight();
    let mut e = end.minutes_since_midnight();
    if e <= s {
        e += MINUTES_PER_DAY;
    }
    f64::from(e - s) / 60.0
}

/// Reject shift windows that have no length.
///
/// Every other pair is valid: a backwards pair is an overnight shift.
pub fn validate_shift_window(start: ClockTime, end: ClockTime) -> Result<()> {
    if start == end {
        return Err(SchedulerError::Validation(format!(
            "Shift start and end are both {}; a shift must have a non-zero length",
            start
        )));
    }
    Ok(())
}
