//! Persisted client state: identity, language preference, token balance.
//!
//! A single JSON document. Scan results are never persisted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eco_core::Identity;
use eco_core::enums::Language;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Schema version written by this build.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PersistedState {
    pub version: u32,
    pub identity: Option<Identity>,
    pub language: Language,
    pub token_balance: Option<u64>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            identity: None,
            language: Language::default(),
            token_balance: None,
            saved_at: None,
        }
    }
}

/// Load the state at `path`.
///
/// A missing file yields the default state. A file written by an unknown
/// schema version is ignored with a warning.
///
/// # Errors
///
/// Returns [`PersistError`] if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<PersistedState, PersistError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PersistedState::default());
        }
        Err(e) => return Err(PersistError::io(path, e)),
    };
    if raw.trim().is_empty() {
        return Ok(PersistedState::default());
    }
    let state: PersistedState = serde_json::from_str(&raw)?;
    if state.version != STATE_VERSION {
        tracing::warn!(
            found = state.version,
            expected = STATE_VERSION,
            path = %path.display(),
            "ignoring state file with unknown version"
        );
        return Ok(PersistedState::default());
    }
    Ok(state)
}

/// Write `state` to `path` atomically (temp file + rename), owner-only on unix.
///
/// # Errors
///
/// Returns [`PersistError`] if the directory, temp file, or rename fails.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| PersistError::io(&tmp, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
            .map_err(|e| PersistError::io(&tmp, e))?;
    }

    fs::rename(&tmp, path).map_err(|e| PersistError::io(path, e))?;
    tracing::debug!(path = %path.display(), "session state saved");
    Ok(())
}

/// Remove the state file. Missing files are not an error.
///
/// # Errors
///
/// Returns [`PersistError`] if the file exists but cannot be removed.
pub fn clear(path: &Path) -> Result<(), PersistError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PersistError::io(path, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> PersistedState {
        PersistedState {
            identity: Some(Identity::new(
                "673fc7f4f1867ab46b0a8c01",
                "Test User",
                "+919876543210",
            )),
            language: Language::Hi,
            token_balance: Some(120),
            saved_at: Some(Utc::now()),
            ..PersistedState::default()
        }
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let state = load(&tmp.path().join("state.json")).unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("nested").join("state.json");
        let state = sample();
        save(&path, &state).unwrap();
        assert_eq!(load(&path).unwrap(), state);
        assert!(!temp_path(&path).exists(), "temp file should be renamed away");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
            assert_eq!(mode, 0o600, "state file should be 0600");
        }
    }

    #[test]
    fn unknown_version_is_ignored() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("state.json");
        fs::write(&path, r#"{"version": 99, "language": "hi", "token_balance": 5}"#).unwrap();
        assert_eq!(load(&path).unwrap(), PersistedState::default());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(PersistError::Json(_))));
    }

    #[test]
    fn clear_is_idempotent() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("state.json");
        save(&path, &sample()).unwrap();
        clear(&path).unwrap();
        clear(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn schema_validates_saved_document() {
        let schema = serde_json::to_value(schemars::schema_for!(PersistedState)).unwrap();
        let instance = serde_json::to_value(sample()).unwrap();
        let validator = jsonschema::validator_for(&schema).expect("valid schema");
        assert!(validator.is_valid(&instance));
    }
}
