//! Workflow coordinator
//!
//! Final approval is the one step that spans both record types: the
//! request closes and the shift moves to the covering worker. Both writes
//! happen in one store transaction.

use std::sync::Arc;

use crate::auth::{authorize, Caller, Operation};
use crate::domain::{apply_action, SubstitutionAction, ValidationContext};
use crate::errors::{Result, SchedulerError};
use crate::schedule::reassign_worker;
use crate::schemas::{Shift, SubstitutionRequest};
use crate::store::Store;
use crate::substitution::load_request;

/// Outcome of a committed final approval
#[derive(Debug, Clone)]
pub struct Finalized {
    pub request: SubstitutionRequest,
    pub shift: Shift,
}

pub struct WorkflowCoordinator {
    store: Arc<Store>,
}

impl WorkflowCoordinator {
    pub fn new(store: Arc<Store>) -> Self {
        WorkflowCoordinator { store }
    }

    /// Close the request as `approved_final` and hand the shift to the
    /// covering worker. Either both changes commit or neither does.
    pub fn finalize(&self, caller: &Caller, id: &str) -> Result<Finalized> {
        let owner = authorize(caller, Operation::FinalApprove)?;

        let finalized = self.store.transaction(|t| {
            let current = load_request(t, id)?;
            let next = apply_action(
                &current,
                SubstitutionAction::FinalApprove,
                &ValidationContext::default(),
            )
            .into_result()?;

            let covering_id = next
                .covering_worker_id
                .clone()
                .ok_or(SchedulerError::MissingCoveringWorker)?;
            if t.user(&covering_id).is_none() {
                return Err(SchedulerError::NotFound(format!(
                    "Covering worker {} is no longer in the directory",
                    covering_id
                )));
            }

            t.put_request(next.clone())?;
            let shift = reassign_worker(t, &next.shift_id, &covering_id)?;
            Ok(Finalized {
                request: next,
                shift,
            })
        })?;

        tracing::info!(
            request_id = %finalized.request.id,
            shift_id = %finalized.shift.id,
            worker_id = %finalized.shift.worker_id,
            owner = %owner.id,
            "substitution finalized"
        );
        Ok(finalized)
    }
}
