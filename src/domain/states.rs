//! Substitution state machine definitions
//!
//! The forward progression is linear:
//! requested → approved_by_owner → accepted_by_sub → approved_final
//!
//! `cancelled` sits outside the progression and is reachable only from
//! `requested` and `approved_by_owner`.

use crate::schemas::SubstitutionStatus;

/// The canonical ordering of forward substitution states.
///
/// IMPORTANT: This is the source of truth for status ordering.
pub const SUBSTITUTION_STATES: &[SubstitutionStatus] = &[
    SubstitutionStatus::Requested,
    SubstitutionStatus::ApprovedByOwner,
    SubstitutionStatus::AcceptedBySub,
    SubstitutionStatus::ApprovedFinal,
];

/// Actions that move an existing request through the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstitutionAction {
    /// Owner opens the request for covering staff
    ApproveRecruit,
    /// A covering worker volunteers
    Accept,
    /// Owner confirms the handoff
    FinalApprove,
    /// Requester rewrites the reason
    EditReason,
    /// Requester withdraws the request
    Cancel,
}

pub const SUBSTITUTION_ACTIONS: &[SubstitutionAction] = &[
    SubstitutionAction::ApproveRecruit,
    SubstitutionAction::Accept,
    SubstitutionAction::FinalApprove,
    SubstitutionAction::EditReason,
    SubstitutionAction::Cancel,
];

impl std::fmt::Display for SubstitutionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstitutionAction::ApproveRecruit => write!(f, "approve recruitment for"),
            SubstitutionAction::Accept => write!(f, "accept"),
            SubstitutionAction::FinalApprove => write!(f, "finalize"),
            SubstitutionAction::EditReason => write!(f, "edit"),
            SubstitutionAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Get the 0-based index of a status in the forward progression.
///
/// Returns usize::MAX for `cancelled`, which is not part of the progression.
pub fn get_state_index(status: SubstitutionStatus) -> usize {
    SUBSTITUTION_STATES
        .iter()
        .position(|&s| s == status)
        .unwrap_or(usize::MAX)
}

/// Status an action leads to from `current`, or None if the action is not
/// allowed from that status.
pub fn target_state(
    current: SubstitutionStatus,
    action: SubstitutionAction,
) -> Option<SubstitutionStatus> {
    use SubstitutionAction as A;
    use SubstitutionStatus as S;

    match (current, action) {
        (S::Requested, A::ApproveRecruit) => Some(S::ApprovedByOwner),
        (S::ApprovedByOwner, A::Accept) => Some(S::AcceptedBySub),
        (S::AcceptedBySub, A::FinalApprove) => Some(S::ApprovedFinal),
        (S::Requested, A::EditReason) => Some(S::Requested),
        (S::Requested | S::ApprovedByOwner, A::Cancel) => Some(S::Cancelled),
        _ => None,
    }
}

/// Actions allowed from a status
pub fn get_allowed_actions(current: SubstitutionStatus) -> Vec<SubstitutionAction> {
    SUBSTITUTION_ACTIONS
        .iter()
        .copied()
        .filter(|action| target_state(current, *action).is_some())
        .collect()
}

/// Check if a status is terminal (approved_final or cancelled).
pub fn is_terminal_state(status: SubstitutionStatus) -> bool {
    matches!(
        status,
        SubstitutionStatus::ApprovedFinal | SubstitutionStatus::Cancelled
    )
}
