//! Substitution request schema - A tracked handoff of one shift to another worker

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::ClockTime;

use super::Shift;

/// Lifecycle status of a substitution request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionStatus {
    /// Initial state - requester asked for a swap
    Requested,
    /// Owner opened the request for other staff
    ApprovedByOwner,
    /// A covering worker volunteered
    AcceptedBySub,
    /// Owner confirmed; the shift now belongs to the covering worker
    ApprovedFinal,
    /// Withdrawn by the requester
    Cancelled,
}

impl SubstitutionStatus {
    /// Pending statuses hold the (shift, requester) slot and block shift deletion
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            SubstitutionStatus::Requested
                | SubstitutionStatus::ApprovedByOwner
                | SubstitutionStatus::AcceptedBySub
        )
    }
}

impl std::fmt::Display for SubstitutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstitutionStatus::Requested => write!(f, "requested"),
            SubstitutionStatus::ApprovedByOwner => write!(f, "approved_by_owner"),
            SubstitutionStatus::AcceptedBySub => write!(f, "accepted_by_sub"),
            SubstitutionStatus::ApprovedFinal => write!(f, "approved_final"),
            SubstitutionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SubstitutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(SubstitutionStatus::Requested),
            "approved_by_owner" => Ok(SubstitutionStatus::ApprovedByOwner),
            "accepted_by_sub" => Ok(SubstitutionStatus::AcceptedBySub),
            "approved_final" => Ok(SubstitutionStatus::ApprovedFinal),
            "cancelled" => Ok(SubstitutionStatus::Cancelled),
            _ => Err(format!("Unknown substitution status: {}", s)),
        }
    }
}

/// A substitution request against one shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRequest {
    /// Unique identifier for the request
    pub id: String,

    /// Shift being handed off (non-owning reference)
    pub shift_id: String,

    pub requester_id: String,

    /// Copied from the directory at creation and never resynchronized
    pub requester_name: String,

    pub reason: String,

    /// Set when a covering worker accepts
    #[serde(default)]
    pub covering_worker_id: Option<String>,

    /// Copied from the directory at accept time
    #[serde(default)]
    pub covering_worker_name: Option<String>,

    pub status: SubstitutionStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl SubstitutionRequest {
    /// Create a new request in the `requested` state
    pub fn new(
        shift_id: impl Into<String>,
        requester_id: impl Into<String>,
        requester_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        SubstitutionRequest {
            id: uuid::Uuid::new_v4().to_string(),
            shift_id: shift_id.into(),
            requester_id: requester_id.into(),
            requester_name: requester_name.into(),
            reason: reason.into(),
            covering_worker_id: None,
            covering_worker_name: None,
            status: SubstitutionStatus::Requested,
            created_at: now,
            updated_at: now,
        }
    }

    // ===== IMMUTABLE BUILDER METHODS =====

    /// Return a new request with the given status, updating the timestamp
    pub fn with_status(mut self, status: SubstitutionStatus) -> Self {
        self.status = status;
        self.touch_returning()
    }

    /// Return a new request with the given reason, updating the timestamp
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self.touch_returning()
    }

    /// Return a new request with the covering worker recorded, updating the timestamp
    pub fn with_covering_worker(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.covering_worker_id = Some(id.into());
        self.covering_worker_name = Some(name.into());
        self.touch_returning()
    }

    fn touch_returning(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}

/// Date and time of the referenced shift, joined in for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub worker_id: String,
}

impl From<&Shift> for ShiftSummary {
    fn from(shift: &Shift) -> Self {
        ShiftSummary {
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            worker_id: shift.worker_id.clone(),
        }
    }
}

/// A request joined with its shift. `shift` is `None` when the shift was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionView {
    #[serde(flatten)]
    pub request: SubstitutionRequest,

    pub shift: Option<ShiftSummary>,
}

/// Sort requests newest first by creation time
pub fn sort_newest_first(requests: &mut [SubstitutionView]) {
    requests.sort_by(|a, b| {
        b.request
            .created_at
            .cmp(&a.request.created_at)
            .then_with(|| b.request.id.cmp(&a.request.id))
    });
}
