//! User command - Manage directory entries in the store

use std::path::Path;
use std::sync::Arc;

use crate::directory::Directory;
use crate::errors::{Result, SchedulerError};
use crate::schemas::{Role, User};
use crate::store::Store;

use super::load_context;

/// Add or replace a directory entry
pub async fn add(
    cwd: Option<&Path>,
    config: Option<&Path>,
    id: &str,
    name: &str,
    role: Role,
) -> Result<()> {
    let directory = open_directory(cwd, config)?;
    let user = directory.upsert(User::new(id.trim(), name.trim(), role))?;
    println!("Saved {} ({}, {})", user.id, user.name, user.role);
    Ok(())
}

/// Print directory entries
pub async fn list(cwd: Option<&Path>, config: Option<&Path>, json: bool) -> Result<()> {
    let users = open_directory(cwd, config)?.list()?;

    if json {
        let out = serde_json::to_string_pretty(&users)
            .map_err(|e| SchedulerError::InvalidJson(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users in the directory");
        return Ok(());
    }
    for user in users {
        println!("{:<24} {:<8} {}", user.id, user.role.to_string(), user.name);
    }
    Ok(())
}

fn open_directory(cwd: Option<&Path>, config: Option<&Path>) -> Result<Directory> {
    let ctx = load_context(cwd, config)?;
    let store = Store::open(&ctx.data_path)?;
    Ok(Directory::new(Arc::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_add_persists_user() {
        let temp = TempDir::new().unwrap();
        add(Some(temp.path()), None, "s1", "Sam", Role::Staff)
            .await
            .unwrap();

        let directory = open_directory(Some(temp.path()), None).unwrap();
        let found = directory.find("s1").unwrap().unwrap();
        assert_eq!(found.name, "Sam");
        assert_eq!(found.role, Role::Staff);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        let temp = TempDir::new().unwrap();
        let err = add(Some(temp.path()), None, "s1", "  ", Role::Staff)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
