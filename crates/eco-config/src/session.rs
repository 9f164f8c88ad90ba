//! Session workflow settings.

use std::path::PathBuf;

use eco_core::enums::OverlapPolicy;
use serde::{Deserialize, Serialize};

const fn default_max_recording_secs() -> u64 {
    60
}

const fn default_persist() -> bool {
    true
}

const fn default_history_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// What to do when a capture completes while another is submitting.
    #[serde(default)]
    pub overlap: OverlapPolicy,

    /// Safety cap on a single voice recording.
    #[serde(default = "default_max_recording_secs")]
    pub max_recording_secs: u64,

    /// Persisted state file. Empty means `<data_dir>/ecosort/state.json`.
    #[serde(default)]
    pub state_path: String,

    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Number of recent results kept in memory.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            overlap: OverlapPolicy::default(),
            max_recording_secs: default_max_recording_secs(),
            state_path: String::new(),
            persist: default_persist(),
            history_limit: default_history_limit(),
        }
    }
}

impl SessionConfig {
    /// Resolve the persisted state path.
    #[must_use]
    pub fn state_path(&self) -> Option<PathBuf> {
        if !self.state_path.trim().is_empty() {
            return Some(PathBuf::from(self.state_path.trim()));
        }
        dirs::data_dir().map(|dir| dir.join("ecosort").join("state.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = SessionConfig::default();
        assert_eq!(config.overlap, OverlapPolicy::Reject);
        assert_eq!(config.max_recording_secs, 60);
        assert_eq!(config.history_limit, 10);
        assert!(config.persist);
    }

    #[test]
    fn explicit_state_path_wins() {
        let config = SessionConfig {
            state_path: "/tmp/eco/state.json".into(),
            ..SessionConfig::default()
        };
        assert_eq!(config.state_path(), Some(PathBuf::from("/tmp/eco/state.json")));
    }
}
