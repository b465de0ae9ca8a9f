//! Staff directory
//!
//! Read access to users for identity resolution and display names, plus the
//! operator-side upsert used by the CLI. User management itself lives
//! outside this service.

use std::sync::Arc;

use crate::auth::Caller;
use crate::errors::{Result, SchedulerError};
use crate::schemas::User;
use crate::store::Store;

/// Display name used when a referenced user no longer exists
pub const UNKNOWN_USER_NAME: &str = "unknown";

#[derive(Debug, Clone)]
pub struct Directory {
    store: Arc<Store>,
}

impl Directory {
    pub fn new(store: Arc<Store>) -> Self {
        Directory { store }
    }

    pub fn find(&self, id: &str) -> Result<Option<User>> {
        self.store.read(|t| Ok(t.user(id).cloned()))
    }

    /// Resolve an authenticated user id into a caller.
    ///
    /// A missing id or one the directory does not know is anonymous.
    pub fn resolve_caller(&self, user_id: Option<&str>) -> Result<Caller> {
        let user = match user_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self.find(id)?,
            None => None,
        };
        if user.is_none() {
            if let Some(id) = user_id {
                tracing::debug!(user_id = %id, "identity not in directory");
            }
        }
        Ok(Caller::from_user(user))
    }

    pub fn list(&self) -> Result<Vec<User>> {
        self.store.read(|t| Ok(t.users().cloned().collect()))
    }

    /// Add or replace a directory entry
    pub fn upsert(&self, user: User) -> Result<User> {
        if user.id.trim().is_empty() || user.name.trim().is_empty() {
            return Err(SchedulerError::Validation(
                "User id and name must not be empty".to_string(),
            ));
        }
        self.store.transaction(|t| {
            t.upsert_user(user.clone());
            Ok(())
        })?;
        tracing::info!(user_id = %user.id, role = %user.role, "directory entry saved");
        Ok(user)
    }
}
