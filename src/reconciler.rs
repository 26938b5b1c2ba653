//! Reconciler for promoting environments to their desired materials.
//!
//! Each pass resolves the desired state of an environment, compares it with
//! the state recorded in the store, and writes a promotion only when the two
//! are not materially the same. A pass that finds nothing to change has no
//! side effects.

use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, Result};
use crate::materials::{EnvironmentState, MaterialsHasher};
use crate::source::MaterialsSource;
use crate::store::EnvironmentStore;

/// Reconciler for environments in an environment store.
pub struct Reconciler<'a, S: EnvironmentStore, M: MaterialsSource> {
    /// Environment store.
    store: &'a S,
    /// Source of desired materials.
    source: &'a M,
    /// Materials hasher.
    hasher: MaterialsHasher,
    /// Maximum resolve attempts per pass.
    max_attempts: u32,
    /// Delay between resolve attempts.
    retry_delay: Duration,
}

/// Outcome of a single reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Observed and desired materials are the same; nothing was written.
    Unchanged {
        /// Fingerprint of the current materials.
        fingerprint: String,
    },
    /// The environment was promoted to new materials.
    Promoted {
        /// Fingerprint of the materials before the promotion, if any.
        previous: Option<String>,
        /// Fingerprint of the promoted materials.
        current: String,
    },
}

/// Summary of reconciling every environment in a project.
#[derive(Debug, Default, serde::Serialize)]
pub struct ReconcileSummary {
    /// Project that was reconciled.
    pub project: String,
    /// Environments that were promoted.
    pub promoted: Vec<String>,
    /// Environments that were already up to date.
    pub unchanged: Vec<String>,
    /// Environments whose pass failed, with the error message.
    pub failed: Vec<ReconcileFailure>,
}

/// A failed reconcile pass.
#[derive(Debug, serde::Serialize)]
pub struct ReconcileFailure {
    /// Environment name.
    pub name: String,
    /// Error message.
    pub error: String,
}

impl<'a, S: EnvironmentStore, M: MaterialsSource> Reconciler<'a, S, M> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(store: &'a S, source: &'a M) -> Self {
        Self {
            store,
            source,
            hasher: MaterialsHasher::new(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }

    /// Applies retry settings from configuration.
    #[must_use]
    pub const fn with_config(mut self, config: &ReconcileConfig) -> Self {
        self.max_attempts = config.max_attempts;
        self.retry_delay = config.retry_delay();
        self
    }

    /// Sets the maximum resolve attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between resolve attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Runs one reconcile pass for a single environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment does not exist, its desired
    /// materials cannot be resolved, or the store fails.
    pub async fn reconcile(&self, project: &str, name: &str) -> Result<ReconcileOutcome> {
        let pass_id = Uuid::new_v4();
        let span = tracing::info_span!("reconcile", %pass_id, project, name);
        self.reconcile_once(project, name).instrument(span).await
    }

    async fn reconcile_once(&self, project: &str, name: &str) -> Result<ReconcileOutcome> {
        let mut environment = self.store.get(project, name).await?.ok_or_else(|| {
            ReconcileError::EnvironmentNotFound {
                project: project.to_string(),
                name: name.to_string(),
            }
        })?;

        let desired = self.resolve_with_retry(project, name).await?;

        if EnvironmentState::same_materials(environment.status.current.as_ref(), Some(&desired)) {
            let fingerprint = self.hasher.hash_state(&desired);
            info!(
                "No changes required - materials unchanged ({})",
                MaterialsHasher::short_hash(&fingerprint)
            );
            return Ok(ReconcileOutcome::Unchanged { fingerprint });
        }

        let previous = self.hasher.hash_optional(environment.status.current.as_ref());
        let current = self.hasher.hash_state(&desired);
        environment.promote(desired);
        self.store.put(&environment).await?;

        info!(
            "Promoted {}: {} -> {}",
            environment.key(),
            previous
                .as_deref()
                .map_or_else(|| String::from("none"), MaterialsHasher::short_hash),
            MaterialsHasher::short_hash(&current)
        );

        Ok(ReconcileOutcome::Promoted { previous, current })
    }

    /// Resolves desired materials, retrying transient failures.
    async fn resolve_with_retry(&self, project: &str, name: &str) -> Result<EnvironmentState> {
        for attempt in 1..=self.max_attempts {
            debug!("Resolve attempt {}/{}", attempt, self.max_attempts);

            match self.source.resolve(project, name).await {
                Ok(state) => return Ok(state),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!("Resolve attempt {attempt} failed: {err}, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) if err.is_retryable() => {
                    error!("Resolve attempt {attempt} failed: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        Err(ReconcileError::MaxRetriesExceeded {
            attempts: self.max_attempts,
            resource: format!("{project}/{name}"),
        }
        .into())
    }

    /// Runs one pass for every environment in a project, concurrently.
    ///
    /// A failing environment, including one whose stored resource cannot be
    /// read, does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns an error only if the project's environments cannot be listed.
    pub async fn reconcile_all(&self, project: &str) -> Result<ReconcileSummary> {
        let names = self.store.list_names(project).await?;
        info!("Reconciling {} environments in {project}", names.len());

        let passes = names.into_iter().map(|name| async move {
            let result = self.reconcile(project, &name).await;
            (name, result)
        });

        let mut summary = ReconcileSummary {
            project: project.to_string(),
            ..ReconcileSummary::default()
        };

        for (name, result) in join_all(passes).await {
            match result {
                Ok(ReconcileOutcome::Promoted { .. }) => summary.promoted.push(name),
                Ok(ReconcileOutcome::Unchanged { .. }) => summary.unchanged.push(name),
                Err(err) => {
                    error!("Reconcile of {project}/{name} failed: {err}");
                    summary.failed.push(ReconcileFailure {
                        name,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }
}

impl ReconcileOutcome {
    /// Returns true if the pass wrote a promotion.
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        matches!(self, Self::Promoted { .. })
    }
}

impl ReconcileSummary {
    /// Returns true if every pass succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged { fingerprint } => write!(
                f,
                "unchanged ({})",
                MaterialsHasher::short_hash(fingerprint)
            ),
            Self::Promoted { previous, current } => write!(
                f,
                "promoted {} -> {}",
                previous
                    .as_deref()
                    .map_or_else(|| String::from("none"), MaterialsHasher::short_hash),
                MaterialsHasher::short_hash(current)
            ),
        }
    }
}

impl std::fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.is_success() { "successful" } else { "failed" };
        writeln!(f, "Reconciliation of {} {status}:", self.project)?;
        writeln!(f, "  Promoted: {}", self.promoted.len())?;
        writeln!(f, "  Unchanged: {}", self.unchanged.len())?;

        if !self.failed.is_empty() {
            writeln!(f, "  Errors:")?;
            for failure in &self.failed {
                writeln!(f, "    - {}: {}", failure.name, failure.error)?;
            }
        }

        Ok(())
    }
}
