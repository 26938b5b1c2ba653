//! Material descriptors and the environment state aggregate.
//!
//! These types describe one fully resolved snapshot of an environment:
//! the git revision it is pinned to (if any) plus the container images and
//! packaged charts it deploys. They are built by producers and only ever
//! read afterwards.

use serde::{Deserialize, Serialize};

/// A single resolved source revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitCommit {
    /// URL of the git repository.
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    /// Commit identifier (usually a full SHA).
    pub id: String,
}

/// A single resolved container image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    /// Image repository URL.
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    /// Image tag.
    pub tag: String,
}

/// A single resolved packaged chart reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chart {
    /// Chart registry URL.
    #[serde(rename = "registryURL")]
    pub registry_url: String,
    /// Chart name within the registry.
    pub name: String,
    /// Chart version.
    pub version: String,
}

/// One complete resolved snapshot of an environment.
///
/// `images` and `charts` are multisets: their order carries no meaning but
/// repeated entries do. Use [`EnvironmentState::same_materials`] rather than
/// `==` to compare two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Commit the environment is pinned to, if any.
    #[serde(default, rename = "commit", skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<GitCommit>,
    /// Container images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Packaged charts.
    #[serde(default)]
    pub charts: Vec<Chart>,
}

impl GitCommit {
    /// Creates a new commit descriptor.
    #[must_use]
    pub fn new(repo_url: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            id: id.into(),
        }
    }
}

impl Image {
    /// Creates a new image descriptor.
    #[must_use]
    pub fn new(repo_url: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            tag: tag.into(),
        }
    }
}

impl Chart {
    /// Creates a new chart descriptor.
    #[must_use]
    pub fn new(
        registry_url: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            registry_url: registry_url.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl EnvironmentState {
    /// Creates an empty state with no commit, images or charts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            git_commit: None,
            images: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// Pins the state to a commit.
    #[must_use]
    pub fn with_commit(mut self, commit: GitCommit) -> Self {
        self.git_commit = Some(commit);
        self
    }

    /// Adds an image.
    #[must_use]
    pub fn with_image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// Adds a chart.
    #[must_use]
    pub fn with_chart(mut self, chart: Chart) -> Self {
        self.charts.push(chart);
        self
    }

    /// Returns true if the state carries no material at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.git_commit.is_none() && self.images.is_empty() && self.charts.is_empty()
    }

    /// Total number of materials (commit, images and charts).
    #[must_use]
    pub fn material_count(&self) -> usize {
        usize::from(self.git_commit.is_some()) + self.images.len() + self.charts.len()
    }
}

impl std::fmt::Display for GitCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.repo_url, self.id)
    }
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.repo_url, self.tag)
    }
}

impl std::fmt::Display for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.registry_url, self.name, self.version)
    }
}
