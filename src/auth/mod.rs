//! Authorization gate
//!
//! Pure role and ownership predicates. Every schedule and substitution
//! operation asks this module before touching the store. The gate never
//! authenticates anyone: it consumes an identity the caller already
//! resolved against the directory.

use crate::errors::{Result, SchedulerError};
use crate::schemas::{Role, SubstitutionRequest, User};

/// Identity attached to an incoming call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No identity, or an identity the directory does not know
    Anonymous,
    Authenticated(User),
}

impl Caller {
    pub fn from_user(user: Option<User>) -> Self {
        match user {
            Some(user) => Caller::Authenticated(user),
            None => Caller::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Authenticated(user) => Some(user),
            Caller::Anonymous => None,
        }
    }
}

/// Operations guarded by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateShift,
    CreateFromTemplate,
    UpdateShift,
    DeleteShift,
    ListWeek,
    ListMine,
    RequestSubstitution,
    EditRequest,
    CancelRequest,
    ApproveRecruit,
    AcceptSubstitution,
    FinalApprove,
    ListPending,
    ListApproved,
    ListOwnRequests,
    ListBoard,
}

/// Who may invoke an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    OwnerOnly,
    /// Any authenticated identity; ownership is checked against the record
    RequesterOnly,
    AnyAuthenticated,
}

/// The rule that governs an operation
pub fn rule_for(operation: Operation) -> Rule {
    use Operation::*;
    match operation {
        CreateShift | CreateFromTemplate | UpdateShift | DeleteShift | ListWeek
        | ApproveRecruit | FinalApprove | ListPending | ListApproved => Rule::OwnerOnly,
        EditRequest | CancelRequest => Rule::RequesterOnly,
        ListMine | RequestSubstitution | AcceptSubstitution | ListOwnRequests | ListBoard => {
            Rule::AnyAuthenticated
        }
    }
}

/// Require an authenticated identity
pub fn require_authenticated(caller: &Caller) -> Result<&User> {
    caller.user().ok_or(SchedulerError::Unauthorized)
}

/// Check the role rule for an operation and return the acting user.
///
/// Requester-only operations pass here for any authenticated caller;
/// follow up with [`authorize_requester`] once the record is loaded.
pub fn authorize(caller: &Caller, operation: Operation) -> Result<&User> {
    let user = require_authenticated(caller)?;
    match rule_for(operation) {
        Rule::OwnerOnly if user.role != Role::Owner => {
            tracing::warn!(user_id = %user.id, ?operation, "owner-only operation refused");
            Err(SchedulerError::Forbidden("Only the owner can do this".to_string()))
        }
        _ => Ok(user),
    }
}

/// Only the requester may edit or cancel their request, regardless of role
pub fn authorize_requester(user: &User, request: &SubstitutionRequest) -> Result<()> {
    if user.id != request.requester_id {
        tracing::warn!(user_id = %user.id, request_id = %request.id, "requester check refused");
        return Err(SchedulerError::Forbidden(
            "Only the requester can change this request".to_string(),
        ));
    }
    Ok(())
}

/// The requester may not cover their own shift
pub fn authorize_covering(user: &User, request: &SubstitutionRequest) -> Result<()> {
    if user.id == request.requester_id {
        tracing::warn!(user_id = %user.id, request_id = %request.id, "self-acceptance refused");
        return Err(SchedulerError::Forbidden(
            "You cannot cover your own substitution request".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Caller {
        Caller::Authenticated(User::new("o1", "Olive", Role::Owner))
    }

    fn staff(id: &str) -> Caller {
        Caller::Authenticated(User::new(id, "Staff", Role::Staff))
    }

    fn request_by(requester: &str) -> SubstitutionRequest {
        SubstitutionRequest::new("shift-1", requester, "Sam", "sick")
    }

    #[test]
    fn test_anonymous_is_unauthorized_everywhere() {
        for op in [Operation::CreateShift, Operation::ListMine, Operation::EditRequest] {
            let err = authorize(&Caller::Anonymous, op).unwrap_err();
            assert_eq!(err.code(), "UNAUTHORIZED");
        }
    }

    #[test]
    fn test_owner_only_operations() {
        for op in [
            Operation::CreateShift,
            Operation::CreateFromTemplate,
            Operation::UpdateShift,
            Operation::DeleteShift,
            Operation::ListWeek,
            Operation::ApproveRecruit,
            Operation::FinalApprove,
            Operation::ListPending,
            Operation::ListApproved,
        ] {
            assert_eq!(rule_for(op), Rule::OwnerOnly);
            assert!(authorize(&owner(), op).is_ok());
            assert_eq!(authorize(&staff("s1"), op).unwrap_err().code(), "FORBIDDEN");
        }
    }

    #[test]
    fn test_any_authenticated_operations() {
        for op in [
            Operation::ListMine,
            Operation::RequestSubstitution,
            Operation::AcceptSubstitution,
            Operation::ListOwnRequests,
            Operation::ListBoard,
        ] {
            assert!(authorize(&staff("s1"), op).is_ok());
            assert!(authorize(&owner(), op).is_ok());
        }
    }

    #[test]
    fn test_requester_check_ignores_role() {
        let request = request_by("s1");
        let owner = owner();
        let err = authorize_requester(owner.user().unwrap(), &request).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");

        let requester = staff("s1");
        assert!(authorize_requester(requester.user().unwrap(), &request).is_ok());
    }

    #[test]
    fn test_covering_check_refuses_self() {
        let request = request_by("s1");
        assert_eq!(
            authorize_covering(staff("s1").user().unwrap(), &request).unwrap_err().code(),
            "FORBIDDEN"
        );
        assert!(authorize_covering(staff("t1").user().unwrap(), &request).is_ok());
    }

    #[test]
    fn test_caller_from_user() {
        assert_eq!(Caller::from_user(None), Caller::Anonymous);
        assert!(Caller::from_user(Some(User::new("s1", "Sam", Role::Staff))).user().is_some());
    }
}
