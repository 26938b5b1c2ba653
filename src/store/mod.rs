//! Environment store module.
//!
//! This module provides storage for environment resources, scoped to
//! project namespaces, with local and in-memory backends.

mod backend;
mod local;
mod memory;
mod types;

pub use backend::EnvironmentStore;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use types::{Environment, EnvironmentStatus, HistoryEntry, MAX_HISTORY};
