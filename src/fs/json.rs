//! JSON file operations with schema validation
//!
//! Provides functions to read and write JSON files with serde validation.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Result, SchedulerError};
use crate::schemas::Config;

/// Read and deserialize a JSON file.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidJson` - If the file contains invalid JSON or does not match the schema
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SchedulerError::FileNotFound(format!("File not found: {}", path.display()))
        } else {
            SchedulerError::Io(e)
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        SchedulerError::InvalidJson(format!("Invalid JSON in file {}: {}", path.display(), e))
    })
}

/// Write a value to a JSON file with pretty formatting.
///
/// Uses atomic write (write to temp file, then rename) to avoid partial writes.
/// A failed write leaves the previous file contents in place.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(data).map_err(|e| SchedulerError::InvalidJson(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(SchedulerError::Io(e));
    }

    Ok(())
}

/// Read the service configuration, falling back to defaults when the file is absent.
pub fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Role, User};
    use tempfile::TempDir;

    #[test]
    fn test_read_json_file_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.json");

        let result: Result<User> = read_json(&path);
        assert!(matches!(result.unwrap_err(), SchedulerError::FileNotFound(_)));
    }

    #[test]
    fn test_read_json_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("invalid.json");
        fs::write(&path, "not valid json {").unwrap();

        let result: Result<User> = read_json(&path);
        assert!(matches!(result.unwrap_err(), SchedulerError::InvalidJson(_)));
    }

    #[test]
    fn test_write_and_read_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("user.json");
        let user = User::new("s1", "Sam", Role::Staff);

        write_json(&path, &user).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let read: User = read_json(&path).unwrap();
        assert_eq!(read, user);
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("user.json");

        write_json(&path, &User::new("s1", "Sam", Role::Staff)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_rename_keeps_target_and_cleans_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blocked.json");
        // A directory at the target path makes the rename fail
        fs::create_dir(&path).unwrap();

        let result = write_json(&path, &User::new("s1", "Sam", Role::Staff));
        assert!(result.is_err());
        assert!(path.is_dir());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_read_config_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let config = read_config(&temp.path().join("shiftswap.json")).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
    }
}
