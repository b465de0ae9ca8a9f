//! Schedule store
//!
//! Owns shift records: creation (single and templated), edits, deletion,
//! and the enriched read paths. The assigned worker is only ever changed by
//! [`reassign_worker`], which the workflow coordinator calls inside its
//! finalize transaction.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::auth::{authorize, Caller, Operation};
use crate::calendar::{
    iso_week, parse_clock_time, parse_shift_date, sunday_week, validate_shift_window, weekly_hours,
    Clock, ClockTime, DateRange,
};
use crate::directory::UNKNOWN_USER_NAME;
use crate::errors::{Result, SchedulerError};
use crate::schemas::{PersonalSummary, Shift, ShiftPatch, ShiftView};
use crate::store::{Store, Tables};

/// Input for a single shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShift {
    pub worker_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Input for templated generation over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub worker_id: String,
    pub start_date: String,
    pub end_date: String,
    /// ISO weekdays, 1 = Monday ... 7 = Sunday
    pub days: Vec<u32>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutcome {
    pub created: usize,
}

pub struct ScheduleService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    max_template_days: u32,
}

impl ScheduleService {
    pub fn new(
        store: Arc<Store>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
        max_template_days: u32,
    ) -> Self {
        ScheduleService {
            store,
            clock,
            offset,
            max_template_days,
        }
    }

    pub fn create_shift(&self, caller: &Caller, input: NewShift) -> Result<ShiftView> {
        authorize(caller, Operation::CreateShift)?;
        let date = parse_shift_date(&input.date, self.offset)?;
        let (start, end) = parse_window(&input.start_time, &input.end_time)?;

        let shift = self.store.transaction(|t| {
            require_worker(t, &input.worker_id)?;
            let shift = Shift::new(input.worker_id.clone(), date, start, end);
            t.insert_shift(shift.clone())?;
            Ok(shift)
        })?;

        tracing::info!(shift_id = %shift.id, worker_id = %shift.worker_id, date = %shift.date, "shift created");
        self.view_of(shift)
    }

    /// Create one shift per day in the range whose ISO weekday is listed.
    ///
    /// Each shift commits on its own; a failure part-way keeps the shifts
    /// created before it.
    pub fn create_from_template(
        &self,
        caller: &Caller,
        template: ShiftTemplate,
    ) -> Result<TemplateOutcome> {
        authorize(caller, Operation::CreateFromTemplate)?;

        let start_date = parse_shift_date(&template.start_date, self.offset)?;
        let end_date = parse_shift_date(&template.end_date, self.offset)?;
        if end_date < start_date {
            return Err(SchedulerError::Validation(
                "Template end date is before its start date".to_string(),
            ));
        }
        let range = DateRange::new(start_date, end_date);
        if range.len_days() > i64::from(self.max_template_days) {
            return Err(SchedulerError::Validation(format!(
                "Template range spans {} days; the limit is {}",
                range.len_days(),
                self.max_template_days
            )));
        }
        if let Some(bad) = template.days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(SchedulerError::Validation(format!(
                "Weekday {} is not an ISO weekday (1 = Monday ... 7 = Sunday)",
                bad
            )));
        }
        let (start, end) = parse_window(&template.start_time, &template.end_time)?;
        self.store.read(|t| require_worker(t, &template.worker_id))?;

        let mut created = 0;
        for date in range.days().filter(|d| template.days.contains(&iso_weekday(*d))) {
            let shift = Shift::new(template.worker_id.clone(), date, start, end);
            if let Err(e) = self.store.transaction(|t| t.insert_shift(shift)) {
                tracing::error!(created, date = %date, error = %e, "template generation stopped");
                return Err(e);
            }
            created += 1;
        }

        tracing::info!(worker_id = %template.worker_id, created, "template shifts created");
        Ok(TemplateOutcome { created })
    }

    pub fn update_shift(&self, caller: &Caller, id: &str, patch: ShiftPatch) -> Result<ShiftView> {
        authorize(caller, Operation::UpdateShift)?;

        let date = patch
            .date
            .as_deref()
            .map(|d| parse_shift_date(d, self.offset))
            .transpose()?;
        let start = patch.start_time.as_deref().map(parse_clock_time).transpose()?;
        let end = patch.end_time.as_deref().map(parse_clock_time).transpose()?;

        let shift = self.store.transaction(|t| {
            let current = t
                .shift(id)
                .cloned()
                .ok_or_else(|| SchedulerError::NotFound(format!("Shift {}", id)))?;
            let date = date.unwrap_or(current.date);
            let start = start.unwrap_or(current.start_time);
            let end = end.unwrap_or(current.end_time);
            validate_shift_window(start, end)?;

            let updated = current.with_window(date, start, end);
            t.put_shift(updated.clone())?;
            Ok(updated)
        })?;

        tracing::info!(shift_id = %shift.id, "shift updated");
        self.view_of(shift)
    }

    /// Hard delete. Blocked while any open substitution request references the shift.
    pub fn delete_shift(&self, caller: &Caller, id: &str) -> Result<()> {
        authorize(caller, Operation::DeleteShift)?;

        self.store.transaction(|t| {
            if t.shift(id).is_none() {
                return Err(SchedulerError::NotFound(format!("Shift {}", id)));
            }
            let open = t.requests_for_shift(id).filter(|r| r.status.is_open()).count();
            if open > 0 {
                return Err(SchedulerError::Conflict(format!(
                    "Shift {} has {} open substitution request(s); resolve or cancel them first",
                    id, open
                )));
            }
            t.remove_shift(id)?;
            Ok(())
        })?;

        tracing::info!(shift_id = %id, "shift deleted");
        Ok(())
    }

    /// Owner view of every shift in the ISO week containing `date` (default today)
    pub fn list_week(&self, caller: &Caller, date: Option<&str>) -> Result<Vec<ShiftView>> {
        authorize(caller, Operation::ListWeek)?;
        let anchor = match date {
            Some(d) => parse_shift_date(d, self.offset)?,
            None => self.clock.today(),
        };
        self.list_by_week(iso_week(anchor))
    }

    /// Shifts in a date range, enriched and sorted by date then start time
    pub fn list_by_week(&self, range: DateRange) -> Result<Vec<ShiftView>> {
        let today = self.clock.today();
        let mut views = self.store.read(|t| {
            Ok(t.shifts()
                .filter(|s| range.contains(s.date))
                .map(|s| enrich(t, s.clone(), today))
                .collect::<Vec<_>>())
        })?;
        sort_by_schedule(&mut views);
        tracing::debug!(start = %range.start, end = %range.end, count = views.len(), "week listed");
        Ok(views)
    }

    /// Every shift assigned to the caller
    pub fn list_mine(&self, caller: &Caller) -> Result<Vec<ShiftView>> {
        let user = authorize(caller, Operation::ListMine)?;
        self.list_by_worker(&user.id)
    }

    pub fn list_by_worker(&self, worker_id: &str) -> Result<Vec<ShiftView>> {
        let today = self.clock.today();
        let mut views = self.store.read(|t| {
            Ok(t.shifts()
                .filter(|s| s.worker_id == worker_id)
                .map(|s| enrich(t, s.clone(), today))
                .collect::<Vec<_>>())
        })?;
        sort_by_schedule(&mut views);
        Ok(views)
    }

    /// Weekly hours (Sunday-start week) and upcoming shift count for the caller
    pub fn personal_summary(&self, caller: &Caller) -> Result<PersonalSummary> {
        let user = authorize(caller, Operation::ListMine)?;
        let today = self.clock.today();
        let mine = self.list_by_worker(&user.id)?;

        let week = sunday_week(today);
        let hours = weekly_hours(
            mine.iter()
                .map(|v| (v.shift.date, v.shift.start_time, v.shift.end_time)),
            &week,
        );
        let upcoming = mine.iter().filter(|v| v.shift.date >= today).count();

        Ok(PersonalSummary {
            weekly_hours: hours,
            upcoming_shifts: upcoming,
        })
    }

    fn view_of(&self, shift: Shift) -> Result<ShiftView> {
        let today = self.clock.today();
        self.store.read(|t| Ok(enrich(t, shift, today)))
    }
}

/// Move a shift to another worker. The only write path for `worker_id`.
pub(crate) fn reassign_worker(tables: &mut Tables, shift_id: &str, worker_id: &str) -> Result<Shift> {
    let shift = tables
        .shift(shift_id)
        .cloned()
        .ok_or_else(|| SchedulerError::NotFound(format!("Shift {}", shift_id)))?
        .with_worker(worker_id);
    tables.put_shift(shift.clone())?;
    Ok(shift)
}

fn parse_window(start: &str, end: &str) -> Result<(ClockTime, ClockTime)> {
    let start = parse_clock_time(start)?;
    let end = parse_clock_time(end)?;
    validate_shift_window(start, end)?;
    Ok((start, end))
}

fn require_worker(tables: &Tables, worker_id: &str) -> Result<()> {
    if tables.user(worker_id).is_none() {
        return Err(SchedulerError::Validation(format!(
            "Worker {} is not in the staff directory",
            worker_id
        )));
    }
    Ok(())
}

fn iso_weekday(date: NaiveDate) -> u32 {
    use chrono::Datelike;
    date.weekday().number_from_monday()
}

fn enrich(tables: &Tables, shift: Shift, today: NaiveDate) -> ShiftView {
    let name = tables
        .user(&shift.worker_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
    ShiftView::new(shift, name, today)
}

fn sort_by_schedule(views: &mut [ShiftView]) {
    views.sort_by(|a, b| {
        (a.shift.date, a.shift.start_time).cmp(&(b.shift.date, b.shift.start_time))
    });
}
