// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # envstate
//!
//! Materials-aware environment state tracking and promotion.
//!
//! ## Overview
//!
//! An environment (for example `prod` in project `shop`) is deployed from a
//! set of **materials**:
//!
//! - at most one Git commit (repository URL and commit id)
//! - any number of container images (repository URL and tag)
//! - any number of Helm charts (registry URL, name and version)
//!
//! Two states carry the same materials when their commits are equal and
//! their images and charts are equal as multisets: order never matters,
//! duplicate counts do.
//!
//! ## Architecture
//!
//! 1. **Desired State**: resolved per environment from a [`source::MaterialsSource`]
//! 2. **Current State**: the last promoted state, kept by an [`store::EnvironmentStore`]
//! 3. **Reconciler**: promotes only when the materials actually changed
//!
//! ## Modules
//!
//! - [`materials`]: Material types, equivalence and fingerprints
//! - [`store`]: Environment records and storage backends (local, memory)
//! - [`source`]: Desired state resolution
//! - [`reconciler`]: Promotion engine
//! - [`api`]: Get-environment boundary handler and wire views
//! - [`config`]: Settings parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! commit:
//!   repoURL: https://github.com/example/shop
//!   id: 4f1c2a9
//! images:
//!   - repoURL: ghcr.io/example/shop-api
//!     tag: v1.4.2
//! charts:
//!   - registryURL: oci://charts.example.com
//!     name: shop
//!     version: 0.9.0
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod materials;
pub mod reconciler;
pub mod source;
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::{GetEnvironmentHandler, GetEnvironmentRequest, GetEnvironmentResponse};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{Settings, SettingsParser, SettingsValidator};
pub use error::{ApiError, EnvStateError, Result};
pub use materials::{Chart, EnvironmentState, GitCommit, Image, MaterialsHasher};
pub use reconciler::{ReconcileOutcome, ReconcileSummary, Reconciler};
pub use source::{FileMaterialsSource, MaterialsSource};
pub use store::{Environment, EnvironmentStore, LocalStore, MemoryStore};
