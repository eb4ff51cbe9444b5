//! Persistence for the access token and lightweight UI state.

use crate::nav::View;
use leadpilot_core::EnrichmentFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub active_view: View,
    pub show_unassigned: bool,
    #[serde(default)]
    pub enrichment: EnrichmentFilter,
}

/// On-disk shape of the token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn load(path: &Path) -> Result<Option<PersistedState>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let state = serde_json::from_str::<PersistedState>(&contents)?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    write_json(path, state)
}

/// Stored bearer token, `None` when absent or blank.
pub fn load_token(path: &Path) -> Result<Option<String>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let stored = serde_json::from_str::<StoredToken>(&contents)?;
    let token = stored.access_token.trim().to_string();
    Ok((!token.is_empty()).then_some(token))
}

pub fn save_token(path: &Path, token: &str) -> Result<(), PersistenceError> {
    write_json(
        path,
        &StoredToken {
            access_token: token.to_string(),
        },
    )
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");
        assert!(load(&path).expect("load").is_none());

        let state = PersistedState {
            active_view: View::Campaigns,
            show_unassigned: true,
            enrichment: EnrichmentFilter::NotEnriched,
        };
        save(&path, &state).expect("save");
        assert_eq!(load(&path).expect("load"), Some(state));
    }

    #[test]
    fn older_state_files_default_the_enrichment_filter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"active_view":"Leads","show_unassigned":false}"#)
            .expect("write");
        let state = load(&path).expect("load").expect("state");
        assert_eq!(state.active_view, View::Leads);
        assert_eq!(state.enrichment, EnrichmentFilter::All);
    }

    #[test]
    fn token_file_uses_access_token_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("token.json");
        assert_eq!(load_token(&path).expect("load"), None);

        save_token(&path, "abc123").expect("save");
        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"access_token\""));
        assert_eq!(load_token(&path).expect("load"), Some("abc123".to_string()));

        std::fs::write(&path, r#"{"access_token":"  "}"#).expect("write");
        assert_eq!(load_token(&path).expect("load"), None);
    }

    #[test]
    fn corrupt_state_is_a_serde_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(load(&path), Err(PersistenceError::Serde(_))));
    }
}
