//! In-memory tables with storage-level constraints

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SchedulerError};
use crate::schemas::{Shift, SubstitutionRequest, User};

/// Key of the unique index over open requests
type PairKey = (String, String);

/// Serialized form of the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub shifts: Vec<Shift>,

    #[serde(default)]
    pub substitutions: Vec<SubstitutionRequest>,
}

fn default_schema_version() -> u32 {
    1
}

/// Every record in the store plus the open-request index.
///
/// Mutations go through methods that keep the index consistent; the index
/// is the uniqueness constraint for open (shift, requester) pairs.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    users: BTreeMap<String, User>,
    shifts: BTreeMap<String, Shift>,
    substitutions: BTreeMap<String, SubstitutionRequest>,
    open_pairs: HashMap<PairKey, String>,
}

fn pair_key(request: &SubstitutionRequest) -> PairKey {
    (request.shift_id.clone(), request.requester_id.clone())
}

impl Tables {
    /// Rebuild tables from a snapshot, re-checking the unique index
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut tables = Tables::default();
        for user in snapshot.users {
            tables.upsert_user(user);
        }
        for shift in snapshot.shifts {
            tables.insert_shift(shift)?;
        }
        for request in snapshot.substitutions {
            tables.insert_request(request).map_err(|e| {
                SchedulerError::Storage(format!("Snapshot violates request uniqueness: {}", e))
            })?;
        }
        Ok(tables)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            schema_version: default_schema_version(),
            users: self.users.values().cloned().collect(),
            shifts: self.shifts.values().cloned().collect(),
            substitutions: self.substitutions.values().cloned().collect(),
        }
    }

    // ===== USERS =====

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn upsert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    // ===== SHIFTS =====

    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.shifts.get(id)
    }

    pub fn shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.values()
    }

    pub fn insert_shift(&mut self, shift: Shift) -> Result<()> {
        if self.shifts.contains_key(&shift.id) {
            return Err(SchedulerError::Conflict(format!("Shift {} already exists", shift.id)));
        }
        self.shifts.insert(shift.id.clone(), shift);
        Ok(())
    }

    /// Replace an existing shift record
    pub fn put_shift(&mut self, shift: Shift) -> Result<()> {
        match self.shifts.get_mut(&shift.id) {
            Some(slot) => {
                *slot = shift;
                Ok(())
            }
            None => Err(SchedulerError::NotFound(format!("Shift {}", shift.id))),
        }
    }

    pub fn remove_shift(&mut self, id: &str) -> Result<Shift> {
        self.shifts
            .remove(id)
            .ok_or_else(|| SchedulerError::NotFound(format!("Shift {}", id)))
    }

    // ===== SUBSTITUTIONS =====

    pub fn request(&self, id: &str) -> Option<&SubstitutionRequest> {
        self.substitutions.get(id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &SubstitutionRequest> {
        self.substitutions.values()
    }

    pub fn requests_for_shift<'a>(
        &'a self,
        shift_id: &'a str,
    ) -> impl Iterator<Item = &'a SubstitutionRequest> + 'a {
        self.substitutions
            .values()
            .filter(move |r| r.shift_id == shift_id)
    }

    /// Conditional insert: fails `Conflict` if the (shift, requester) pair
    /// already has an open request.
    pub fn insert_request(&mut self, request: SubstitutionRequest) -> Result<()> {
        if self.substitutions.contains_key(&request.id) {
            return Err(SchedulerError::Conflict(format!(
                "Substitution request {} already exists",
                request.id
            )));
        }
        if request.status.is_open() {
            let key = pair_key(&request);
            if self.open_pairs.contains_key(&key) {
                return Err(SchedulerError::Conflict(
                    "A substitution request for this shift is already in progress".to_string(),
                ));
            }
            self.open_pairs.insert(key, request.id.clone());
        }
        self.substitutions.insert(request.id.clone(), request);
        Ok(())
    }

    /// Replace an existing request, releasing its index slot once it closes
    pub fn put_request(&mut self, request: SubstitutionRequest) -> Result<()> {
        let previous = self
            .substitutions
            .get(&request.id)
            .ok_or_else(|| SchedulerError::NotFound(format!("Substitution request {}", request.id)))?;

        if pair_key(previous) != pair_key(&request) {
            return Err(SchedulerError::Storage(
                "Shift and requester of a request are immutable".to_string(),
            ));
        }
        if !previous.status.is_open() && request.status.is_open() {
            return Err(SchedulerError::Storage(format!(
                "Substitution request {} cannot be reopened",
                request.id
            )));
        }

        if previous.status.is_open() && !request.status.is_open() {
            self.open_pairs.remove(&pair_key(&request));
        }
        self.substitutions.insert(request.id.clone(), request);
        Ok(())
    }

    /// Id of the open request for a (shift, requester) pair, if any
    pub fn open_request_for(&self, shift_id: &str, requester_id: &str) -> Option<&str> {
        self.open_pairs
            .get(&(shift_id.to_string(), requester_id.to_string()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ClockTime;
    use crate::schemas::{Role, SubstitutionStatus};
    use chrono::NaiveDate;

    fn make_shift(worker: &str) -> Shift {
        Shift::new(
            worker,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            "09:00".parse::<ClockTime>().unwrap(),
            "18:00".parse::<ClockTime>().unwrap(),
        )
    }

    #[test]
    fn test_second_open_request_for_pair_conflicts() {
        let mut tables = Tables::default();
        let shift = make_shift("s1");
        tables.insert_shift(shift.clone()).unwrap();

        tables
            .insert_request(SubstitutionRequest::new(&shift.id, "s1", "Sam", "sick"))
            .unwrap();
        let err = tables
            .insert_request(SubstitutionRequest::new(&shift.id, "s1", "Sam", "sick again"))
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn test_closing_request_releases_pair() {
        let mut tables = Tables::default();
        let request = SubstitutionRequest::new("shift-1", "s1", "Sam", "sick");
        tables.insert_request(request.clone()).unwrap();
        assert_eq!(tables.open_request_for("shift-1", "s1"), Some(request.id.as_str()));

        tables
            .put_request(request.with_status(SubstitutionStatus::Cancelled))
            .unwrap();
        assert!(tables.open_request_for("shift-1", "s1").is_none());

        tables
            .insert_request(SubstitutionRequest::new("shift-1", "s1", "Sam", "retry"))
            .unwrap();
    }

    #[test]
    fn test_final_approval_releases_pair() {
        let mut tables = Tables::default();
        let request = SubstitutionRequest::new("shift-1", "s1", "Sam", "sick");
        tables.insert_request(request.clone()).unwrap();

        tables
            .put_request(request.with_status(SubstitutionStatus::ApprovedFinal))
            .unwrap();
        assert!(tables.open_request_for("shift-1", "s1").is_none());
    }

    #[test]
    fn test_closed_request_cannot_reopen() {
        let mut tables = Tables::default();
        let request = SubstitutionRequest::new("shift-1", "s1", "Sam", "sick")
            .with_status(SubstitutionStatus::Cancelled);
        tables.insert_request(request.clone()).unwrap();

        let err = tables
            .put_request(request.with_status(SubstitutionStatus::Requested))
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_put_missing_records_not_found() {
        let mut tables = Tables::default();
        assert_eq!(tables.put_shift(make_shift("s1")).unwrap_err().code(), "NOT_FOUND");
        assert_eq!(tables.remove_shift("nope").unwrap_err().code(), "NOT_FOUND");
        let request = SubstitutionRequest::new("shift-1", "s1", "Sam", "sick");
        assert_eq!(tables.put_request(request).unwrap_err().code(), "NOT_FOUND");
    }

    #[test]
    fn test_snapshot_rebuilds_index() {
        let mut tables = Tables::default();
        tables.upsert_user(User::new("s1", "Sam", Role::Staff));
        let shift = make_shift("s1");
        tables.insert_shift(shift.clone()).unwrap();
        tables
            .insert_request(SubstitutionRequest::new(&shift.id, "s1", "Sam", "sick"))
            .unwrap();

        let restored = Tables::from_snapshot(tables.to_snapshot()).unwrap();
        assert!(restored.user("s1").is_some());
        assert!(restored.shift(&shift.id).is_some());
        assert!(restored.open_request_for(&shift.id, "s1").is_some());
    }

    #[test]
    fn test_snapshot_with_duplicate_open_pairs_is_rejected() {
        let snapshot = Snapshot {
            substitutions: vec![
                SubstitutionRequest::new("shift-1", "s1", "Sam", "a"),
                SubstitutionRequest::new("shift-1", "s1", "Sam", "b"),
            ],
            ..Default::default()
        };
        let err = Tables::from_snapshot(snapshot).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
