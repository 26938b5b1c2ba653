//! Environment store trait definition.
//!
//! This module defines the common interface for environment storage backends.

use async_trait::async_trait;

use super::types::Environment;
use crate::error::Result;

/// Trait for environment storage backends.
///
/// Resources are scoped to a project namespace; a namespace must exist
/// before environments can be written into it.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    /// Checks if a project namespace exists.
    async fn namespace_exists(&self, project: &str) -> Result<bool>;

    /// Creates a project namespace. Creating an existing namespace is a no-op.
    async fn create_namespace(&self, project: &str) -> Result<()>;

    /// Gets an environment by project and name.
    ///
    /// Returns `None` if the environment does not exist.
    async fn get(&self, project: &str, name: &str) -> Result<Option<Environment>>;

    /// Creates or replaces an environment.
    async fn put(&self, environment: &Environment) -> Result<()>;

    /// Lists the names of all environments in a project, sorted.
    ///
    /// Names are listed without loading the resources, so one unreadable
    /// environment does not hide the others. A missing project has no
    /// environments.
    async fn list_names(&self, project: &str) -> Result<Vec<String>>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl EnvironmentStore for Box<dyn EnvironmentStore> {
    async fn namespace_exists(&self, project: &str) -> Result<bool> {
        (**self).namespace_exists(project).await
    }

    async fn create_namespace(&self, project: &str) -> Result<()> {
        (**self).create_namespace(project).await
    }

    async fn get(&self, project: &str, name: &str) -> Result<Option<Environment>> {
        (**self).get(project, name).await
    }

    async fn put(&self, environment: &Environment) -> Result<()> {
        (**self).put(environment).await
    }

    async fn list_names(&self, project: &str) -> Result<Vec<String>> {
        (**self).list_names(project).await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}
