//! Shift schema - A block of time assigned to one worker on one date

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{classify, duration_hours, ClockTime, ShiftStatus};

/// A stored shift record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift
    pub id: String,

    /// Staff member currently assigned. Only final approval of a
    /// substitution changes this after creation.
    pub worker_id: String,

    /// Store-local calendar date
    pub date: NaiveDate,

    pub start_time: ClockTime,

    /// May be earlier than `start_time` for overnight shifts
    pub end_time: ClockTime,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Shift {
    /// Create a new shift with a fresh id
    pub fn new(
        worker_id: impl Into<String>,
        date: NaiveDate,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Self {
        let now = Utc::now();
        Shift {
            id: uuid::Uuid::new_v4().to_string(),
            worker_id: worker_id.into(),
            date,
            start_time,
            end_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration in fractional hours, overnight shifts wrap
    pub fn hours(&self) -> f64 {
        duration_hours(self.start_time, self.end_time)
    }

    pub fn status_on(&self, today: NaiveDate) -> ShiftStatus {
        classify(self.date, today)
    }

    /// Return a new Shift with the schedule fields replaced, updating the timestamp
    pub fn with_window(mut self, date: NaiveDate, start_time: ClockTime, end_time: ClockTime) -> Self {
        self.date = date;
        self.start_time = start_time;
        self.end_time = end_time;
        self.touch_returning()
    }

    /// Return a new Shift assigned to another worker, updating the timestamp
    pub fn with_worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = worker_id.into();
        self.touch_returning()
    }

    fn touch_returning(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}

/// A shift enriched for display; never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftView {
    #[serde(flatten)]
    pub shift: Shift,

    /// Worker display name, `"unknown"` when the directory entry is gone
    pub worker_name: String,

    pub status: ShiftStatus,

    pub hours: f64,
}

impl ShiftView {
    pub fn new(shift: Shift, worker_name: impl Into<String>, today: NaiveDate) -> Self {
        let status = shift.status_on(today);
        let hours = shift.hours();
        ShiftView {
            shift,
            worker_name: worker_name.into(),
            status,
            hours,
        }
    }
}

/// Partial update of a shift's schedule fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftPatch {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,
}

/// Personal schedule totals for the staff schedule screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalSummary {
    /// Hours in the current Sunday-start week
    pub weekly_hours: f64,

    /// Shifts dated today or later
    pub upcoming_shifts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_shift_has_unique_id() {
        let a = Shift::new("s1", d("2024-06-01"), t("09:00"), t("18:00"));
        let b = Shift::new("s1", d("2024-06-01"), t("09:00"), t("18:00"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn test_shift_hours_and_status() {
        let shift = Shift::new("s1", d("2024-06-01"), t("22:00"), t("06:00"));
        assert_eq!(shift.hours(), 8.0);
        assert_eq!(shift.status_on(d("2024-06-01")), ShiftStatus::Today);
        assert_eq!(shift.status_on(d("2024-06-02")), ShiftStatus::Completed);
    }

    #[test]
    fn test_with_worker_is_immutable() {
        let shift = Shift::new("s1", d("2024-06-01"), t("09:00"), t("18:00"));
        let moved = shift.clone().with_worker("t1");
        assert_eq!(moved.worker_id, "t1");
        assert_eq!(shift.worker_id, "s1");
        assert!(moved.updated_at >= shift.updated_at);
    }

    #[test]
    fn test_shift_view_serializes_flat() {
        let shift = Shift::new("s1", d("2024-06-01"), t("09:00"), t("18:00"));
        let view = ShiftView::new(shift, "Sam", d("2024-05-30"));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["worker_id"], "s1");
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["hours"], 9.0);
        assert_eq!(json["worker_name"], "Sam");
    }

    #[test]
    fn test_patch_fields_default_to_none() {
        let patch: ShiftPatch = serde_json::from_str(r#"{"end_time":"20:00"}"#).unwrap();
        assert!(patch.date.is_none());
        assert!(patch.start_time.is_none());
        assert_eq!(patch.end_time.as_deref(), Some("20:00"));
    }
}
