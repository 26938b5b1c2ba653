//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// envstate - Materials-aware environment promotion.
#[derive(Parser, Debug)]
#[command(name = "envstate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file.
    #[arg(short, long, global = true, env = "ENVSTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether two state files carry the same materials.
    ///
    /// Exits with status 0 when they do, 1 when they do not and 2 when a
    /// file cannot be read.
    Compare {
        /// First state file (YAML or JSON).
        lhs: PathBuf,

        /// Second state file (YAML or JSON).
        rhs: PathBuf,
    },

    /// Print the materials fingerprint of a state file.
    Fingerprint {
        /// State file (YAML or JSON).
        file: PathBuf,

        /// Print only the first 8 characters.
        #[arg(short, long)]
        short: bool,
    },

    /// Show a single environment.
    Get {
        /// Project the environment belongs to.
        #[arg(short, long)]
        project: String,

        /// Environment name.
        #[arg(short, long)]
        name: String,
    },

    /// Create a project namespace and, optionally, environments in it.
    Init {
        /// Project name.
        project: String,

        /// Environments to create in the project.
        #[arg(short, long = "env")]
        environments: Vec<String>,
    },

    /// Promote environments whose desired materials changed.
    Reconcile {
        /// Project to reconcile.
        #[arg(short, long)]
        project: String,

        /// Single environment to reconcile (defaults to all in the project).
        #[arg(short, long)]
        name: Option<String>,

        /// Directory of desired states (`<project>/<name>.yaml`).
        #[arg(short, long, env = "ENVSTATE_SOURCE_PATH")]
        source: Option<PathBuf>,

        /// Maximum resolve attempts (overrides the settings file).
        #[arg(long)]
        max_attempts: Option<u32>,
    },
}

impl Commands {
    /// Resolve attempts requested on the command line, if any.
    #[must_use]
    pub const fn max_attempts_override(&self) -> Option<u32> {
        match self {
            Self::Reconcile { max_attempts, .. } => *max_attempts,
            _ => None,
        }
    }
}

/// Exit status of `compare`, following `diff`: 0 same, 1 different, 2 trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareStatus {
    /// The materials are the same.
    Same,
    /// The materials differ.
    Different,
    /// A state file could not be read or parsed.
    Trouble,
}

impl CompareStatus {
    /// Maps the result of a comparison to its status.
    #[must_use]
    pub const fn from_result<E>(result: &Result<bool, E>) -> Self {
        match result {
            Ok(true) => Self::Same,
            Ok(false) => Self::Different,
            Err(_) => Self::Trouble,
        }
    }

    /// Process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Same => 0,
            Self::Different => 1,
            Self::Trouble => 2,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
