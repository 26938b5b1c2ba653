//! Wire-level representations of stored resources.

use serde::{Deserialize, Serialize};

use crate::materials::EnvironmentState;
use crate::store::{Environment, HistoryEntry};

/// Wire representation of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentView {
    /// Project the environment belongs to.
    pub project: String,
    /// Environment name.
    pub name: String,
    /// Materials currently deployed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<EnvironmentState>,
    /// Fingerprint of the current materials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Promotion history, newest first.
    pub history: Vec<HistoryView>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 last update time.
    pub updated_at: String,
    /// RFC 3339 time of the last reconcile promotion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<String>,
}

/// Wire representation of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    /// The promoted materials.
    pub state: EnvironmentState,
    /// Fingerprint of the promoted materials.
    pub fingerprint: String,
    /// RFC 3339 promotion time.
    pub promoted_at: String,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            state: entry.state.clone(),
            fingerprint: entry.fingerprint.clone(),
            promoted_at: entry.promoted_at.to_rfc3339(),
        }
    }
}

impl From<&Environment> for EnvironmentView {
    fn from(env: &Environment) -> Self {
        Self {
            project: env.project.clone(),
            name: env.name.clone(),
            current: env.status.current.clone(),
            fingerprint: env.status.fingerprint.clone(),
            history: env.status.history.iter().map(HistoryView::from).collect(),
            created_at: env.created_at.to_rfc3339(),
            updated_at: env.updated_at.to_rfc3339(),
            last_reconciled: env.status.last_reconciled.map(|t| t.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Image;

    #[test]
    fn test_view_from_environment() {
        let mut env = Environment::new("demo", "prod");
        env.promote(EnvironmentState::new().with_image(Image::new("nginx", "1.23.3")));

        let view = EnvironmentView::from(&env);

        assert_eq!(view.project, "demo");
        assert_eq!(view.current, env.status.current);
        assert_eq!(view.history.len(), 1);
        assert_eq!(view.created_at, env.created_at.to_rfc3339());
        assert!(view.last_reconciled.is_some());
    }

    #[test]
    fn test_view_json_shape() {
        let view = EnvironmentView::from(&Environment::new("demo", "prod"));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["name"], "prod");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("current").is_none());
        assert_eq!(json["history"], serde_json::json!([]));
    }
}
