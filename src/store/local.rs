//! Local file-based environment store.
//!
//! Each project namespace is a directory under the base directory and each
//! environment a JSON file inside it: `<base>/<project>/<name>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::backend::EnvironmentStore;
use super::types::Environment;
use crate::error::{EnvStateError, Result, StoreError};

/// Default store directory name under the user data directory.
const STORE_DIR: &str = "envstate";

/// File extension of stored environments.
const RESOURCE_EXT: &str = "json";

/// Local file-based environment store.
#[derive(Debug)]
pub struct LocalStore {
    /// Base directory holding one directory per project.
    base_dir: PathBuf,
}

impl LocalStore {
    /// Creates a store under the user data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined.
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| EnvStateError::internal("Cannot determine user data directory"))?
            .join(STORE_DIR);

        Ok(Self::with_base_dir(base_dir))
    }

    /// Creates a store with a custom base directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn namespace_path(&self, project: &str) -> Result<PathBuf> {
        validate_key(project)?;
        Ok(self.base_dir.join(project))
    }

    fn resource_path(&self, project: &str, name: &str) -> Result<PathBuf> {
        validate_key(name)?;
        Ok(self
            .namespace_path(project)?
            .join(format!("{name}.{RESOURCE_EXT}")))
    }

    async fn read_resource(path: &Path) -> Result<Environment> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            StoreError::corrupted(format!("Failed to read {}: {e}", path.display()))
        })?;

        let environment: Environment = serde_json::from_str(&content).map_err(|e| {
            StoreError::corrupted(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(environment)
    }

    async fn write_then_rename(temp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
        let mut file = fs::File::create(temp_path)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to create temp file: {e}")))?;

        file.write_all(content)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to write environment file: {e}")))?;

        file.sync_all()
            .await
            .map_err(|e| StoreError::backend(format!("Failed to sync environment file: {e}")))?;

        fs::rename(temp_path, path)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to rename environment file: {e}")))?;

        Ok(())
    }
}

/// Rejects keys that would escape their directory or collide with temp files.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.contains(['/', '\\'])
        && !key.contains("..");

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        }
        .into())
    }
}

#[async_trait]
impl EnvironmentStore for LocalStore {
    async fn namespace_exists(&self, project: &str) -> Result<bool> {
        let path = self.namespace_path(project)?;
        Ok(fs::metadata(&path).await.is_ok_and(|m| m.is_dir()))
    }

    async fn create_namespace(&self, project: &str) -> Result<()> {
        let path = self.namespace_path(project)?;
        if !path.exists() {
            info!("Creating namespace directory: {}", path.display());
            fs::create_dir_all(&path).await.map_err(|e| {
                StoreError::backend(format!("Failed to create namespace directory: {e}"))
            })?;
        }
        Ok(())
    }

    async fn get(&self, project: &str, name: &str) -> Result<Option<Environment>> {
        let path = self.resource_path(project, name)?;
        if !path.exists() {
            debug!("Environment file does not exist: {}", path.display());
            return Ok(None);
        }

        debug!("Loading environment from: {}", path.display());
        Self::read_resource(&path).await.map(Some)
    }

    async fn put(&self, environment: &Environment) -> Result<()> {
        if !self.namespace_exists(&environment.project).await? {
            return Err(StoreError::NamespaceNotFound {
                project: environment.project.clone(),
            }
            .into());
        }

        let path = self.resource_path(&environment.project, &environment.name)?;
        info!("Saving environment to: {}", path.display());

        let content = serde_json::to_string_pretty(environment)
            .map_err(|e| StoreError::serialization(format!("Failed to serialize environment: {e}")))?;

        // Each writer gets its own temp file; the leading dot keeps it out
        // of the key space.
        let temp_path = path.with_file_name(format!(
            ".{}.{}.tmp",
            environment.name,
            Uuid::new_v4().simple()
        ));

        if let Err(err) = Self::write_then_rename(&temp_path, &path, content.as_bytes()).await {
            // Best effort; the write error is what matters.
            let _ = fs::remove_file(&temp_path).await;
            return Err(err);
        }

        debug!("Environment saved successfully");
        Ok(())
    }

    async fn list_names(&self, project: &str) -> Result<Vec<String>> {
        let dir = self.namespace_path(project)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to read namespace directory: {e}")))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::backend(format!("Failed to read namespace entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RESOURCE_EXT) {
                continue;
            }

            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) if validate_key(name).is_ok() => names.push(name.to_string()),
                _ => warn!("Ignoring unexpected file in namespace: {}", path.display()),
            }
        }

        names.sort();
        Ok(names)
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}
