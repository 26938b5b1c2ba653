//! Stored environment resources.
//!
//! An environment is a named, project-scoped resource whose status records
//! the materials it currently runs and a short promotion history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::materials::{EnvironmentState, MaterialsHasher};

/// Maximum number of history entries kept per environment.
pub const MAX_HISTORY: usize = 10;

/// A stored environment resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Project (namespace) the environment belongs to.
    pub project: String,
    /// Environment name, unique within the project.
    pub name: String,
    /// Observed status.
    #[serde(default)]
    pub status: EnvironmentStatus,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last written.
    pub updated_at: DateTime<Utc>,
}

/// Observed status of an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    /// Materials currently deployed, if any were ever promoted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<EnvironmentState>,
    /// Fingerprint of `current`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Previously promoted states, newest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// When a reconcile pass last promoted this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<DateTime<Utc>>,
}

/// A single promotion recorded in an environment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The promoted materials.
    pub state: EnvironmentState,
    /// Fingerprint of `state`.
    pub fingerprint: String,
    /// When the promotion happened.
    pub promoted_at: DateTime<Utc>,
}

impl Environment {
    /// Creates a new environment with an empty status.
    #[must_use]
    pub fn new(project: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            project: project.to_string(),
            name: name.to_string(),
            status: EnvironmentStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `project/name`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }

    /// Records a promotion to `state`.
    ///
    /// The state becomes current and is pushed to the front of the history,
    /// which is trimmed to [`MAX_HISTORY`] entries.
    pub fn promote(&mut self, state: EnvironmentState) {
        let now = Utc::now();
        let fingerprint = MaterialsHasher::new().hash_state(&state);

        self.status.history.insert(
            0,
            HistoryEntry {
                state: state.clone(),
                fingerprint: fingerprint.clone(),
                promoted_at: now,
            },
        );
        self.status.history.truncate(MAX_HISTORY);

        self.status.current = Some(state);
        self.status.fingerprint = Some(fingerprint);
        self.status.last_reconciled = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Image;

    #[test]
    fn test_promote_sets_current_and_history() {
        let mut env = Environment::new("demo", "prod");
        let state = EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"));

        env.promote(state.clone());

        assert_eq!(env.status.current, Some(state.clone()));
        assert_eq!(env.status.history.len(), 1);
        assert_eq!(env.status.history[0].state, state);
        assert_eq!(
            env.status.fingerprint.as_deref(),
            Some(env.status.history[0].fingerprint.as_str())
        );
        assert!(env.status.last_reconciled.is_some());
    }

    #[test]
    fn test_history_is_capped_newest_first() {
        let mut env = Environment::new("demo", "prod");
        for i in 0..(MAX_HISTORY + 3) {
            env.promote(EnvironmentState::new().with_image(Image::new("app", i.to_string())));
        }

        assert_eq!(env.status.history.len(), MAX_HISTORY);
        let newest = (MAX_HISTORY + 2).to_string();
        assert_eq!(env.status.history[0].state.images[0].tag, newest);
    }

    #[test]
    fn test_key() {
        assert_eq!(Environment::new("demo", "prod").key(), "demo/prod");
    }
}
