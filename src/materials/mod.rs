//! Materials module.
//!
//! This module holds the deployable material descriptors and the logic that
//! decides whether two environment snapshots are materially the same:
//! - Value types for commits, images and charts
//! - Order-insensitive, count-sensitive materials equivalence
//! - Deterministic materials fingerprints

mod equivalence;
mod fingerprint;
mod types;

pub use fingerprint::MaterialsHasher;
pub use types::{Chart, EnvironmentState, GitCommit, Image};
