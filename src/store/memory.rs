//! In-memory environment store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::EnvironmentStore;
use super::types::Environment;
use crate::error::{Result, StoreError};

/// In-memory store keyed by project, then environment name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Environment>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnvironmentStore for MemoryStore {
    async fn namespace_exists(&self, project: &str) -> Result<bool> {
        Ok(self.namespaces.read().await.contains_key(project))
    }

    async fn create_namespace(&self, project: &str) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if !namespaces.contains_key(project) {
            debug!("Creating namespace: {project}");
            namespaces.insert(project.to_string(), BTreeMap::new());
        }
        Ok(())
    }

    async fn get(&self, project: &str, name: &str) -> Result<Option<Environment>> {
        Ok(self
            .namespaces
            .read()
            .await
            .get(project)
            .and_then(|envs| envs.get(name))
            .cloned())
    }

    async fn put(&self, environment: &Environment) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        let envs = namespaces.get_mut(&environment.project).ok_or_else(|| {
            StoreError::NamespaceNotFound {
                project: environment.project.clone(),
            }
        })?;
        envs.insert(environment.name.clone(), environment.clone());
        Ok(())
    }

    async fn list_names(&self, project: &str) -> Result<Vec<String>> {
        Ok(self
            .namespaces
            .read()
            .await
            .get(project)
            .map(|envs| envs.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
