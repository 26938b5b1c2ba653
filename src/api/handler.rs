//! Get-environment handler.
//!
//! Maps a request for a named environment to a lookup in the environment
//! store and translates the result into its wire representation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::wire::EnvironmentView;
use crate::error::ApiError;
use crate::store::EnvironmentStore;

/// Result type for the API boundary.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Request for a single environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEnvironmentRequest {
    /// Project (namespace) to look in.
    pub project: String,
    /// Environment name.
    pub name: String,
}

/// Response carrying a single environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEnvironmentResponse {
    /// The environment in wire form.
    pub environment: EnvironmentView,
}

/// Read-only handler for single environments.
#[derive(Debug)]
pub struct GetEnvironmentHandler<'a, S: EnvironmentStore> {
    store: &'a S,
}

impl GetEnvironmentRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl<'a, S: EnvironmentStore> GetEnvironmentHandler<'a, S> {
    /// Creates a handler backed by `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetches one environment.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the project or name is empty
    /// - `NotFound` if the project or the environment does not exist
    /// - `Internal` for any other store failure
    pub async fn get_environment(
        &self,
        request: &GetEnvironmentRequest,
    ) -> ApiResult<GetEnvironmentResponse> {
        if request.project.is_empty() {
            return Err(ApiError::InvalidArgument(String::from(
                "project should not be empty",
            )));
        }
        if request.name.is_empty() {
            return Err(ApiError::InvalidArgument(String::from(
                "name should not be empty",
            )));
        }

        debug!("Getting environment {}/{}", request.project, request.name);

        let exists = self
            .store
            .namespace_exists(&request.project)
            .await
            .map_err(|e| {
                warn!("Namespace lookup failed for {}: {e}", request.project);
                ApiError::Internal(e.to_string())
            })?;
        if !exists {
            return Err(ApiError::NotFound(format!(
                "project {:?} not found",
                request.project
            )));
        }

        let environment = self
            .store
            .get(&request.project, &request.name)
            .await
            .map_err(|e| {
                warn!(
                    "Environment lookup failed for {}/{}: {e}",
                    request.project, request.name
                );
                ApiError::Internal(e.to_string())
            })?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "environment {:?} not found in project {:?}",
                    request.name, request.project
                ))
            })?;

        Ok(GetEnvironmentResponse {
            environment: EnvironmentView::from(&environment),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StoreError};
    use crate::materials::{EnvironmentState, GitCommit};
    use crate::store::{Environment, MemoryStore};
    use async_trait::async_trait;

    /// Store whose every operation fails at the backend.
    struct BrokenStore {
        namespace_ok: bool,
    }

    #[async_trait]
    impl EnvironmentStore for BrokenStore {
        async fn namespace_exists(&self, _project: &str) -> Result<bool> {
            if self.namespace_ok {
                Ok(true)
            } else {
                Err(StoreError::backend("connection refused").into())
            }
        }

        async fn create_namespace(&self, _project: &str) -> Result<()> {
            Err(StoreError::backend("connection refused").into())
        }

        async fn get(&self, _project: &str, _name: &str) -> Result<Option<Environment>> {
            Err(StoreError::backend("connection refused").into())
        }

        async fn put(&self, _environment: &Environment) -> Result<()> {
            Err(StoreError::backend("connection refused").into())
        }

        async fn list_names(&self, _project: &str) -> Result<Vec<String>> {
            Err(StoreError::backend("connection refused").into())
        }

        fn backend_type(&self) -> &'static str {
            "broken"
        }
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_namespace("demo").await.unwrap();
        let mut env = Environment::new("demo", "prod");
        env.promote(EnvironmentState::new().with_commit(GitCommit::new("fake-url", "abc")));
        store.put(&env).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_environment() {
        let store = seeded_store().await;
        let handler = GetEnvironmentHandler::new(&store);

        let response = handler
            .get_environment(&GetEnvironmentRequest::new("demo", "prod"))
            .await
            .unwrap();

        assert_eq!(response.environment.name, "prod");
        assert_eq!(
            response.environment.current.and_then(|s| s.git_commit),
            Some(GitCommit::new("fake-url", "abc"))
        );
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = MemoryStore::new();
        let handler = GetEnvironmentHandler::new(&store);

        let err = handler
            .get_environment(&GetEnvironmentRequest::new("", ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::InvalidArgument(String::from("project should not be empty"))
        );

        let err = handler
            .get_environment(&GetEnvironmentRequest::new("demo", ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::InvalidArgument(String::from("name should not be empty"))
        );
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let store = seeded_store().await;
        let handler = GetEnvironmentHandler::new(&store);

        let err = handler
            .get_environment(&GetEnvironmentRequest::new("other", "prod"))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::NotFound(String::from("project \"other\" not found")));
    }

    #[tokio::test]
    async fn test_unknown_environment() {
        let store = seeded_store().await;
        let handler = GetEnvironmentHandler::new(&store);

        let err = handler
            .get_environment(&GetEnvironmentRequest::new("demo", "qa"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "not_found");
        assert!(err.message().contains("\"qa\""));
        assert!(err.message().contains("\"demo\""));
    }

    #[tokio::test]
    async fn test_store_failures_are_internal() {
        let broken = BrokenStore {
            namespace_ok: false,
        };
        let err = GetEnvironmentHandler::new(&broken)
            .get_environment(&GetEnvironmentRequest::new("demo", "prod"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "internal");

        let broken = BrokenStore { namespace_ok: true };
        let err = GetEnvironmentHandler::new(&broken)
            .get_environment(&GetEnvironmentRequest::new("demo", "prod"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "internal");
    }
}
