//! CLI module for the envstate tool.
//!
//! This module provides the command-line interface for comparing states
//! and reconciling environments.

mod commands;
mod output;

pub use commands::{Cli, Commands, CompareStatus, OutputFormat};
pub use output::OutputFormatter;
