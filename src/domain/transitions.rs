//! State transition logic
//!
//! Pure functions for applying substitution actions to requests.

use crate::errors::{Result, SchedulerError};
use crate::schemas::SubstitutionRequest;

use super::states::SubstitutionAction;
use super::validation::{validate_action, ValidationContext};

/// Result of a transition attempt
#[derive(Debug)]
pub enum TransitionResult {
    /// Successful transition with the new request state
    Success {
        /// The request with updated status and timestamp
        next_request: SubstitutionRequest,
    },
    /// Rejected transition
    Rejected {
        /// Why the guard refused
        error: SchedulerError,
    },
}

impl TransitionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionResult::Success { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, TransitionResult::Rejected { .. })
    }

    /// Convert into a `Result` for `?` propagation
    pub fn into_result(self) -> Result<SubstitutionRequest> {
        match self {
            TransitionResult::Success { next_request } => Ok(next_request),
            TransitionResult::Rejected { error } => Err(error),
        }
    }
}

/// Pure function that applies an action to a request.
///
/// This function:
/// - Never mutates the input request
/// - Validates the action against the transition table and its guard
/// - Returns a new request with the new status and `updated_at`
pub fn apply_action(
    request: &SubstitutionRequest,
    action: SubstitutionAction,
    ctx: &ValidationContext,
) -> TransitionResult {
    let target = match validate_action(request, action, ctx) {
        Ok(target) => target,
        Err(error) => return TransitionResult::Rejected { error },
    };

    let next_request = match action {
        SubstitutionAction::Accept => match &ctx.covering_worker {
            Some(worker) => request
                .clone()
                .with_covering_worker(worker.id.clone(), worker.name.clone())
                .with_status(target),
            // validate_action already rejected a missing worker
            None => {
                return TransitionResult::Rejected {
                    error: SchedulerError::NotFound("Covering worker could not be resolved".into()),
                }
            }
        },
        SubstitutionAction::EditReason => {
            let reason = ctx.reason.as_deref().unwrap_or_default().trim();
            request.clone().with_reason(reason)
        }
        SubstitutionAction::ApproveRecruit
        | SubstitutionAction::FinalApprove
        | SubstitutionAction::Cancel => request.clone().with_status(target),
    };

    TransitionResult::Success { next_request }
}
