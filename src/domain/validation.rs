//! Guard checks for opening and advancing substitution requests

use crate::errors::{Result, SchedulerError};
use crate::schemas::{Shift, SubstitutionRequest, SubstitutionStatus};

use super::states::{target_state, SubstitutionAction};

/// A directory user volunteering to cover a shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveringWorker {
    pub id: String,
    pub name: String,
}

/// Inputs some actions need beyond the request itself
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Resolved covering worker, required by `Accept`
    pub covering_worker: Option<CoveringWorker>,

    /// Replacement reason, required by `EditReason`
    pub reason: Option<String>,
}

impl ValidationContext {
    pub fn with_covering_worker(id: impl Into<String>, name: impl Into<String>) -> Self {
        ValidationContext {
            covering_worker: Some(CoveringWorker {
                id: id.into(),
                name: name.into(),
            }),
            ..Default::default()
        }
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        ValidationContext {
            reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// Normalize a reason, rejecting blank input
pub fn validate_reason(reason: &str) -> Result<String> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(SchedulerError::Validation("A reason is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validate opening a request on `shift` by `requester_id`.
///
/// Only the shift's currently assigned worker may ask to hand it off.
/// Uniqueness per (shift, requester) is enforced by the store, not here.
pub fn can_open_request(shift: &Shift, requester_id: &str, reason: &str) -> Result<String> {
    let reason = validate_reason(reason)?;
    if shift.worker_id != requester_id {
        return Err(SchedulerError::Forbidden(format!(
            "Shift {} is not assigned to you",
            shift.id
        )));
    }
    Ok(reason)
}

/// Validate an action against the current request.
///
/// Returns the status the request moves to.
pub fn validate_action(
    request: &SubstitutionRequest,
    action: SubstitutionAction,
    ctx: &ValidationContext,
) -> Result<SubstitutionStatus> {
    let target = target_state(request.status, action)
        .ok_or_else(|| SchedulerError::invalid_state(action, request.status))?;

    match action {
        SubstitutionAction::Accept => {
            let worker = ctx.covering_worker.as_ref().ok_or_else(|| {
                SchedulerError::NotFound("Covering worker could not be resolved".to_string())
            })?;
            if worker.id == request.requester_id {
                return Err(SchedulerError::Forbidden(
                    "You cannot cover your own substitution request".to_string(),
                ));
            }
        }
        SubstitutionAction::FinalApprove => {
            if request.covering_worker_id.is_none() {
                return Err(SchedulerError::MissingCoveringWorker);
            }
        }
        SubstitutionAction::EditReason => {
            validate_reason(ctx.reason.as_deref().unwrap_or_default())?;
        }
        SubstitutionAction::ApproveRecruit | SubstitutionAction::Cancel => {}
    }

    Ok(target)
}
