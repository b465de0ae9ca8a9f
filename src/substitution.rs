//! Substitution request engine
//!
//! Records requests and drives them through the state machine in
//! [`crate::domain`]. Every mutation is a single store transaction, so the
//! guard check and the write see the same state. Final approval lives in
//! [`crate::workflow`] because it also touches the shift.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{authorize, authorize_covering, authorize_requester, Caller, Operation};
use crate::domain::{apply_action, can_open_request, SubstitutionAction, ValidationContext};
use crate::errors::{Result, SchedulerError};
use crate::schemas::{
    sort_newest_first, ShiftSummary, SubstitutionRequest, SubstitutionStatus, SubstitutionView,
};
use crate::store::{Store, Tables};

/// Filtered list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// Owner: every request still in flight
    Pending,
    /// Owner: finalized requests
    Approved,
    /// Caller's own non-cancelled requests
    Mine,
}

impl FromStr for ListMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ListMode::Pending),
            "approved" => Ok(ListMode::Approved),
            "mine" => Ok(ListMode::Mine),
            other => Err(SchedulerError::Validation(format!(
                "Unknown list mode '{}' (expected pending, approved or mine)",
                other
            ))),
        }
    }
}

pub struct SubstitutionService {
    store: Arc<Store>,
}

impl SubstitutionService {
    pub fn new(store: Arc<Store>) -> Self {
        SubstitutionService { store }
    }

    /// Open a request to hand off `shift_id`.
    ///
    /// The duplicate check and the insert are the same constrained write,
    /// so of two concurrent requests for one pair exactly one succeeds.
    pub fn request(
        &self,
        caller: &Caller,
        shift_id: &str,
        reason: &str,
    ) -> Result<SubstitutionRequest> {
        let user = authorize(caller, Operation::RequestSubstitution)?;

        let request = self.store.transaction(|t| {
            let shift = t
                .shift(shift_id)
                .ok_or_else(|| SchedulerError::NotFound(format!("Shift {}", shift_id)))?;
            let reason = can_open_request(shift, &user.id, reason)?;
            let request = SubstitutionRequest::new(shift_id, &user.id, &user.name, reason);
            t.insert_request(request.clone())?;
            Ok(request)
        })?;

        tracing::info!(request_id = %request.id, shift_id = %shift_id, requester = %user.id, "substitution requested");
        Ok(request)
    }

    /// Replace the reason while the request is still `requested`
    pub fn edit_reason(&self, caller: &Caller, id: &str, reason: &str) -> Result<SubstitutionRequest> {
        let user = authorize(caller, Operation::EditRequest)?;
        let ctx = ValidationContext::with_reason(reason);

        let request = self.store.transaction(|t| {
            let current = load_request(t, id)?;
            authorize_requester(user, &current)?;
            let next = apply_action(&current, SubstitutionAction::EditReason, &ctx).into_result()?;
            t.put_request(next.clone())?;
            Ok(next)
        })?;

        tracing::info!(request_id = %id, "substitution reason edited");
        Ok(request)
    }

    /// Withdraw a request. The record stays, marked `cancelled`.
    pub fn cancel(&self, caller: &Caller, id: &str) -> Result<SubstitutionRequest> {
        let user = authorize(caller, Operation::CancelRequest)?;

        let request = self.store.transaction(|t| {
            let current = load_request(t, id)?;
            authorize_requester(user, &current)?;
            let next = apply_action(&current, SubstitutionAction::Cancel, &ValidationContext::default())
                .into_result()?;
            t.put_request(next.clone())?;
            Ok(next)
        })?;

        tracing::info!(request_id = %id, "substitution cancelled");
        Ok(request)
    }

    /// Owner opens the request to covering staff
    pub fn approve_recruit(&self, caller: &Caller, id: &str) -> Result<SubstitutionRequest> {
        let user = authorize(caller, Operation::ApproveRecruit)?;

        let request = self.store.transaction(|t| {
            let current = load_request(t, id)?;
            let next = apply_action(
                &current,
                SubstitutionAction::ApproveRecruit,
                &ValidationContext::default(),
            )
            .into_result()?;
            t.put_request(next.clone())?;
            Ok(next)
        })?;

        tracing::info!(request_id = %id, owner = %user.id, "recruitment approved");
        Ok(request)
    }

    /// The caller volunteers to cover the shift
    pub fn accept(&self, caller: &Caller, id: &str) -> Result<SubstitutionRequest> {
        let user = authorize(caller, Operation::AcceptSubstitution)?;

        let request = self.store.transaction(|t| {
            let current = load_request(t, id)?;
            authorize_covering(user, &current)?;
            let covering = t.user(&user.id).ok_or_else(|| {
                SchedulerError::NotFound(format!("User {} is not in the directory", user.id))
            })?;
            let ctx = ValidationContext::with_covering_worker(&covering.id, &covering.name);
            let next = apply_action(&current, SubstitutionAction::Accept, &ctx).into_result()?;
            t.put_request(next.clone())?;
            Ok(next)
        })?;

        tracing::info!(request_id = %id, covering = %user.id, "substitution accepted");
        Ok(request)
    }

    /// A filtered view, or the staff board when `mode` is `None`
    pub fn list(&self, caller: &Caller, mode: Option<ListMode>) -> Result<Vec<SubstitutionView>> {
        let operation = match mode {
            Some(ListMode::Pending) => Operation::ListPending,
            Some(ListMode::Approved) => Operation::ListApproved,
            Some(ListMode::Mine) => Operation::ListOwnRequests,
            None => Operation::ListBoard,
        };
        let user = authorize(caller, operation)?;

        let mut views = self.store.read(|t| {
            Ok(t.requests()
                .filter(|r| match mode {
                    Some(ListMode::Pending) => r.status.is_open(),
                    Some(ListMode::Approved) => r.status == SubstitutionStatus::ApprovedFinal,
                    Some(ListMode::Mine) => {
                        r.requester_id == user.id && r.status != SubstitutionStatus::Cancelled
                    }
                    None => r.status != SubstitutionStatus::Cancelled,
                })
                .map(|r| join_shift(t, r.clone()))
                .collect::<Vec<_>>())
        })?;
        sort_newest_first(&mut views);

        tracing::debug!(?mode, count = views.len(), "substitutions listed");
        Ok(views)
    }

    pub fn get(&self, id: &str) -> Result<SubstitutionRequest> {
        self.store.read(|t| load_request(t, id))
    }
}

pub(crate) fn load_request(tables: &Tables, id: &str) -> Result<SubstitutionRequest> {
    tables
        .request(id)
        .cloned()
        .ok_or_else(|| SchedulerError::NotFound(format!("Substitution request {}", id)))
}

fn join_shift(tables: &Tables, request: SubstitutionRequest) -> SubstitutionView {
    let shift = tables.shift(&request.shift_id).map(ShiftSummary::from);
    SubstitutionView { request, shift }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ClockTime;
    use crate::schemas::{Role, Shift, User};
    use chrono::NaiveDate;

    struct Fixture {
        svc: SubstitutionService,
        store: Arc<Store>,
        shift_id: String,
    }

    fn owner() -> Caller {
        Caller::Authenticated(User::new("o1", "Olive", Role::Owner))
    }

    fn sam() -> Caller {
        Caller::Authenticated(User::new("s1", "Sam", Role::Staff))
    }

    fn toni() -> Caller {
        Caller::Authenticated(User::new("t1", "Toni", Role::Staff))
    }

    fn fixture() -> Fixture {
        let store = Arc::new(Store::in_memory());
        let shift = Shift::new(
            "s1",
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            "09:00".parse::<ClockTime>().unwrap(),
            "18:00".parse::<ClockTime>().unwrap(),
        );
        let shift_id = shift.id.clone();
        store
            .transaction(|t| {
                t.upsert_user(User::new("o1", "Olive", Role::Owner));
                t.upsert_user(User::new("s1", "Sam", Role::Staff));
                t.upsert_user(User::new("t1", "Toni", Role::Staff));
                t.insert_shift(shift)
            })
            .unwrap();
        Fixture {
            svc: SubstitutionService::new(store.clone()),
            store,
            shift_id,
        }
    }

    #[test]
    fn test_request_records_requester_name() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "  sick  ").unwrap();
        assert_eq!(req.status, SubstitutionStatus::Requested);
        assert_eq!(req.requester_name, "Sam");
        assert_eq!(req.reason, "sick");
        assert!(req.covering_worker_id.is_none());
    }

    #[test]
    fn test_request_guards() {
        let f = fixture();
        assert_eq!(
            f.svc.request(&Caller::Anonymous, &f.shift_id, "sick").unwrap_err().code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            f.svc.request(&sam(), &f.shift_id, " ").unwrap_err().code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            f.svc.request(&sam(), "missing", "sick").unwrap_err().code(),
            "NOT_FOUND"
        );
        assert_eq!(
            f.svc.request(&toni(), &f.shift_id, "sick").unwrap_err().code(),
            "FORBIDDEN"
        );
    }

    #[test]
    fn test_duplicate_request_conflicts() {
        let f = fixture();
        f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        let err = f.svc.request(&sam(), &f.shift_id, "still sick").unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(f.store.read(|t| Ok(t.requests().count())).unwrap(), 1);
    }

    #[test]
    fn test_cancel_then_rerequest() {
        let f = fixture();
        let first = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        let cancelled = f.svc.cancel(&sam(), &first.id).unwrap();
        assert_eq!(cancelled.status, SubstitutionStatus::Cancelled);

        let second = f.svc.request(&sam(), &f.shift_id, "sick again").unwrap();
        assert_ne!(first.id, second.id);

        let err = f.svc.cancel(&sam(), &first.id).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn test_only_requester_edits_or_cancels() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        assert_eq!(f.svc.cancel(&owner(), &req.id).unwrap_err().code(), "FORBIDDEN");
        assert_eq!(
            f.svc.edit_reason(&toni(), &req.id, "other").unwrap_err().code(),
            "FORBIDDEN"
        );
        assert_eq!(f.svc.cancel(&sam(), "missing").unwrap_err().code(), "NOT_FOUND");
    }

    #[test]
    fn test_edit_only_while_requested() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        let edited = f.svc.edit_reason(&sam(), &req.id, " family ").unwrap();
        assert_eq!(edited.reason, "family");
        assert_eq!(
            f.svc.edit_reason(&sam(), &req.id, "").unwrap_err().code(),
            "VALIDATION_ERROR"
        );

        f.svc.approve_recruit(&owner(), &req.id).unwrap();
        assert_eq!(
            f.svc.edit_reason(&sam(), &req.id, "late").unwrap_err().code(),
            "INVALID_STATE"
        );
    }

    #[test]
    fn test_recruit_requires_owner_and_changes_nothing_otherwise() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        assert_eq!(
            f.svc.approve_recruit(&toni(), &req.id).unwrap_err().code(),
            "FORBIDDEN"
        );
        assert_eq!(f.svc.get(&req.id).unwrap(), req);
    }

    #[test]
    fn test_accept_flow() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();
        assert_eq!(f.svc.accept(&toni(), &req.id).unwrap_err().code(), "INVALID_STATE");

        f.svc.approve_recruit(&owner(), &req.id).unwrap();
        assert_eq!(f.svc.accept(&sam(), &req.id).unwrap_err().code(), "FORBIDDEN");

        let accepted = f.svc.accept(&toni(), &req.id).unwrap();
        assert_eq!(accepted.status, SubstitutionStatus::AcceptedBySub);
        assert_eq!(accepted.covering_worker_id.as_deref(), Some("t1"));
        assert_eq!(accepted.covering_worker_name.as_deref(), Some("Toni"));

        assert_eq!(f.svc.cancel(&sam(), &req.id).unwrap_err().code(), "INVALID_STATE");
    }

    #[test]
    fn test_list_modes() {
        let f = fixture();
        let req = f.svc.request(&sam(), &f.shift_id, "sick").unwrap();

        let pending = f.svc.list(&owner(), Some(ListMode::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].shift.as_ref().unwrap().worker_id, "s1");
        assert!(f.svc.list(&owner(), Some(ListMode::Approved)).unwrap().is_empty());
        assert_eq!(f.svc.list(&sam(), Some(ListMode::Mine)).unwrap().len(), 1);
        assert!(f.svc.list(&toni(), Some(ListMode::Mine)).unwrap().is_empty());
        assert_eq!(f.svc.list(&toni(), None).unwrap().len(), 1);

        assert_eq!(
            f.svc.list(&sam(), Some(ListMode::Pending)).unwrap_err().code(),
            "FORBIDDEN"
        );
        assert_eq!(f.svc.list(&Caller::Anonymous, None).unwrap_err().code(), "UNAUTHORIZED");

        f.svc.cancel(&sam(), &req.id).unwrap();
        assert!(f.svc.list(&toni(), None).unwrap().is_empty());
        assert!(f.svc.list(&sam(), Some(ListMode::Mine)).unwrap().is_empty());
    }

    #[test]
    fn test_list_is_newest_first() {
        let f = fixture();
        let other = Shift::new(
            "s1",
            NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
            "09:00".parse::<ClockTime>().unwrap(),
            "18:00".parse::<ClockTime>().unwrap(),
        );
        let other_id = other.id.clone();
        f.store.transaction(|t| t.insert_shift(other)).unwrap();

        let first = f.svc.request(&sam(), &f.shift_id, "a").unwrap();
        let second = f.svc.request(&sam(), &other_id, "b").unwrap();

        let board = f.svc.list(&toni(), None).unwrap();
        let expected = if second.created_at == first.created_at {
            std::cmp::max(first.id.clone(), second.id.clone())
        } else {
            second.id.clone()
        };
        assert_eq!(board[0].request.id, expected);
    }

    #[test]
    fn test_list_mode_parsing() {
        assert_eq!("pending".parse::<ListMode>().unwrap(), ListMode::Pending);
        assert_eq!("mine".parse::<ListMode>().unwrap(), ListMode::Mine);
        assert_eq!(
            "everything".parse::<ListMode>().unwrap_err().code(),
            "VALIDATION_ERROR"
        );
    }
}
