//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::api::EnvironmentView;
use crate::materials::{EnvironmentState, MaterialsHasher};
use crate::reconciler::{ReconcileOutcome, ReconcileSummary};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Material row for table display.
#[derive(Tabled)]
struct MaterialRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Reference")]
    reference: String,
}

/// History row for table display.
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
    #[tabled(rename = "Materials")]
    materials: usize,
    #[tabled(rename = "Promoted At")]
    promoted_at: String,
}

/// JSON shape of a comparison.
#[derive(Serialize)]
struct ComparisonJson<'a> {
    same: bool,
    lhs: &'a str,
    rhs: &'a str,
}

/// JSON shape of a single reconcile pass.
#[derive(Serialize)]
struct OutcomeJson<'a> {
    project: &'a str,
    name: &'a str,
    #[serde(flatten)]
    outcome: &'a ReconcileOutcome,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of comparing two states.
    #[must_use]
    pub fn format_comparison(&self, same: bool, lhs: &EnvironmentState, rhs: &EnvironmentState) -> String {
        let hasher = MaterialsHasher::new();
        let lhs_hash = hasher.hash_state(lhs);
        let rhs_hash = hasher.hash_state(rhs);

        match self.format {
            OutputFormat::Json => to_json(&ComparisonJson {
                same,
                lhs: &lhs_hash,
                rhs: &rhs_hash,
            }),
            OutputFormat::Text => {
                if same {
                    format!(
                        "{} Materials are the same ({})\n",
                        "✓".green(),
                        MaterialsHasher::short_hash(&lhs_hash)
                    )
                } else {
                    format!(
                        "{} Materials differ ({} vs {})\n",
                        "✗".red(),
                        MaterialsHasher::short_hash(&lhs_hash),
                        MaterialsHasher::short_hash(&rhs_hash)
                    )
                }
            }
        }
    }

    /// Formats a fingerprint.
    #[must_use]
    pub fn format_fingerprint(&self, fingerprint: &str) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({ "fingerprint": fingerprint })),
            OutputFormat::Text => format!("{fingerprint}\n"),
        }
    }

    /// Formats an environment for display.
    #[must_use]
    pub fn format_environment(&self, env: &EnvironmentView) -> String {
        match self.format {
            OutputFormat::Json => to_json(env),
            OutputFormat::Text => Self::format_environment_text(env),
        }
    }

    /// Formats an environment as text.
    fn format_environment_text(env: &EnvironmentView) -> String {
        let mut output = String::new();

        let _ = write!(output, "\nEnvironment: {}/{}\n", env.project, env.name);
        let _ = writeln!(output, "   Created: {}", env.created_at);
        let _ = writeln!(output, "   Updated: {}", env.updated_at);
        if let Some(fingerprint) = &env.fingerprint {
            let _ = writeln!(
                output,
                "   Fingerprint: {}",
                MaterialsHasher::short_hash(fingerprint)
            );
        }
        output.push('\n');

        match &env.current {
            Some(state) if !state.is_empty() => {
                output.push_str(&Table::new(Self::material_rows(state)).to_string());
                output.push('\n');
            }
            Some(_) => output.push_str("   Promoted with no materials.\n"),
            None => {
                let _ = writeln!(output, "   {}", "Never promoted.".yellow());
            }
        }

        if !env.history.is_empty() {
            output.push_str("\nHistory:\n");
            let rows: Vec<HistoryRow> = env
                .history
                .iter()
                .enumerate()
                .map(|(i, h)| HistoryRow {
                    index: i + 1,
                    fingerprint: MaterialsHasher::short_hash(&h.fingerprint),
                    materials: h.state.material_count(),
                    promoted_at: h.promoted_at.clone(),
                })
                .collect();
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        output
    }

    fn material_rows(state: &EnvironmentState) -> Vec<MaterialRow> {
        let commit = state.git_commit.iter().map(|c| MaterialRow {
            kind: "commit",
            source: c.repo_url.clone(),
            reference: c.id.clone(),
        });
        let images = state.images.iter().map(|i| MaterialRow {
            kind: "image",
            source: i.repo_url.clone(),
            reference: i.tag.clone(),
        });
        let charts = state.charts.iter().map(|c| MaterialRow {
            kind: "chart",
            source: format!("{}/{}", c.registry_url, c.name),
            reference: c.version.clone(),
        });

        commit.chain(images).chain(charts).collect()
    }

    /// Formats the outcome of a single reconcile pass.
    #[must_use]
    pub fn format_outcome(&self, project: &str, name: &str, outcome: &ReconcileOutcome) -> String {
        match self.format {
            OutputFormat::Json => to_json(&OutcomeJson {
                project,
                name,
                outcome,
            }),
            OutputFormat::Text => {
                let marker = if outcome.is_promoted() {
                    "↑".yellow()
                } else {
                    "✓".green()
                };
                format!("{marker} {project}/{name}: {outcome}\n")
            }
        }
    }

    /// Formats a project-wide reconcile summary.
    #[must_use]
    pub fn format_summary(&self, summary: &ReconcileSummary) -> String {
        match self.format {
            OutputFormat::Json => to_json(summary),
            OutputFormat::Text => {
                let status = if summary.is_success() {
                    format!("{} Reconciliation successful", "✓".green())
                } else {
                    format!("{} Reconciliation failed", "✗".red())
                };

                let mut output = format!("{status}\n\n");
                let _ = writeln!(output, "   Promoted: {}", summary.promoted.len());
                for name in &summary.promoted {
                    let _ = writeln!(output, "     - {name}");
                }
                let _ = writeln!(output, "   Unchanged: {}", summary.unchanged.len());

                if !summary.failed.is_empty() {
                    let _ = write!(output, "\n{} Errors:\n", "⚠".yellow());
                    for failure in &summary.failed {
                        let _ = writeln!(output, "   - {}: {}", failure.name, failure.error);
                    }
                }

                output
            }
        }
    }
}

/// Pretty-prints `value` as one JSON document followed by a newline.
fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Chart, GitCommit, Image};
    use crate::store::Environment;

    fn no_color() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_comparison_text() {
        no_color();
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let state = EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"));

        let output = formatter.format_comparison(true, &state, &state);
        assert!(output.contains("Materials are the same"));
    }

    #[test]
    fn test_format_comparison_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let lhs = EnvironmentState::new();
        let rhs = EnvironmentState::new().with_image(Image::new("nginx", "1.23.3"));

        let output = formatter.format_comparison(false, &lhs, &rhs);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["same"], false);
        assert_ne!(json["lhs"], json["rhs"]);
    }

    #[test]
    fn test_format_environment_text() {
        no_color();
        let mut env = Environment::new("demo", "prod");
        env.promote(
            EnvironmentState::new()
                .with_commit(GitCommit::new("https://github.com/example/app", "abc123"))
                .with_image(Image::new("nginx", "1.23.3"))
                .with_chart(Chart::new("oci://charts", "app", "0.4.1")),
        );
        let view = EnvironmentView::from(&env);

        let output = OutputFormatter::new(OutputFormat::Text).format_environment(&view);

        assert!(output.contains("Environment: demo/prod"));
        assert!(output.contains("nginx"));
        assert!(output.contains("oci://charts/app"));
        assert!(output.contains("History:"));
    }

    #[test]
    fn test_format_never_promoted() {
        no_color();
        let view = EnvironmentView::from(&Environment::new("demo", "prod"));

        let output = OutputFormatter::new(OutputFormat::Text).format_environment(&view);

        assert!(output.contains("Never promoted."));
        assert!(!output.contains("History:"));
    }

    #[test]
    fn test_format_outcome_json() {
        let outcome = ReconcileOutcome::Unchanged {
            fingerprint: String::from("abcdef1234567890"),
        };

        let output = OutputFormatter::new(OutputFormat::Json).format_outcome("demo", "prod", &outcome);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["outcome"], "unchanged");
        assert_eq!(json["name"], "prod");
    }
}
