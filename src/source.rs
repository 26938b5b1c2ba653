//! Desired-materials sources.
//!
//! A source resolves the materials an environment should run. Resolution
//! itself (git fetch, image discovery, chart lookup) happens elsewhere;
//! sources here read its output.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EnvStateError, ReconcileError, Result};
use crate::materials::EnvironmentState;

/// File extensions tried, in order, when looking up a desired-state file.
const STATE_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Resolves the desired materials of an environment.
#[async_trait]
pub trait MaterialsSource: Send + Sync {
    /// Resolves a fresh desired state for `project/name`.
    async fn resolve(&self, project: &str, name: &str) -> Result<EnvironmentState>;
}

/// Reads desired states from `<root>/<project>/<name>.yaml` (or `.yml`, `.json`).
#[derive(Debug, Clone)]
pub struct FileMaterialsSource {
    root: PathBuf,
}

/// Returns the same state for every environment.
#[derive(Debug, Clone, Default)]
pub struct StaticMaterialsSource {
    state: EnvironmentState,
}

impl FileMaterialsSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, project: &str, name: &str) -> Option<PathBuf> {
        let dir = self.root.join(project);
        STATE_FILE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|path| path.exists())
    }
}

impl StaticMaterialsSource {
    /// Creates a source that always resolves to `state`.
    #[must_use]
    pub const fn new(state: EnvironmentState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl MaterialsSource for FileMaterialsSource {
    async fn resolve(&self, project: &str, name: &str) -> Result<EnvironmentState> {
        let path = self.locate(project, name).ok_or_else(|| EnvStateError::StateFile {
            path: self.root.join(project).join(format!("{name}.yaml")),
            message: String::from("no desired state file found"),
        })?;

        debug!("Resolving {project}/{name} from {}", path.display());
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ReconcileError::ResolveFailed {
                project: project.to_string(),
                name: name.to_string(),
                reason: format!("failed to read {}: {e}", path.display()),
            }
        })?;
        parse_state(&content, &path)
    }
}

#[async_trait]
impl MaterialsSource for StaticMaterialsSource {
    async fn resolve(&self, _project: &str, _name: &str) -> Result<EnvironmentState> {
        Ok(self.state.clone())
    }
}

/// Reads an environment state from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a state.
pub fn read_state_file(path: impl AsRef<Path>) -> Result<EnvironmentState> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| EnvStateError::StateFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_state(&content, path)
}

/// JSON documents are valid YAML, so one parser covers both formats.
fn parse_state(content: &str, path: &Path) -> Result<EnvironmentState> {
    serde_yaml::from_str(content).map_err(|e| EnvStateError::StateFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{GitCommit, Image};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_source_resolves_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("demo")).unwrap();
        std::fs::write(
            dir.path().join("demo").join("prod.yaml"),
            "images:\n  - repoURL: nginx\n    tag: 1.23.3\n",
        )
        .unwrap();

        let source = FileMaterialsSource::new(dir.path());
        let state = source.resolve("demo", "prod").await.unwrap();

        assert_eq!(state.images, vec![Image::new("nginx", "1.23.3")]);
    }

    #[tokio::test]
    async fn test_file_source_resolves_json() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("demo")).unwrap();
        std::fs::write(
            dir.path().join("demo").join("prod.json"),
            r#"{"commit": {"repoURL": "fake-url", "id": "abc"}}"#,
        )
        .unwrap();

        let state = FileMaterialsSource::new(dir.path())
            .resolve("demo", "prod")
            .await
            .unwrap();

        assert_eq!(state.git_commit, Some(GitCommit::new("fake-url", "abc")));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = FileMaterialsSource::new(dir.path()).resolve("demo", "prod").await;

        assert!(matches!(result, Err(EnvStateError::StateFile { .. })));
    }

    #[tokio::test]
    async fn test_file_source_unreadable_file_is_retryable() {
        let dir = TempDir::new().unwrap();
        // A directory where the state file should be cannot be read as text.
        std::fs::create_dir_all(dir.path().join("demo").join("prod.yaml")).unwrap();

        let err = FileMaterialsSource::new(dir.path())
            .resolve("demo", "prod")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EnvStateError::Reconcile(ReconcileError::ResolveFailed { .. })
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_read_state_file_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yaml");
        std::fs::write(&path, "images: 42\n").unwrap();

        assert!(read_state_file(&path).is_err());
    }

    #[tokio::test]
    async fn test_static_source() {
        let state = EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"));
        let source = StaticMaterialsSource::new(state.clone());

        assert_eq!(source.resolve("any", "thing").await.unwrap(), state);
    }
}
