//! API boundary module.
//!
//! Read-only request handling for environment resources and their wire
//! representations.

mod handler;
mod wire;

pub use handler::{ApiResult, GetEnvironmentHandler, GetEnvironmentRequest, GetEnvironmentResponse};
pub use wire::{EnvironmentView, HistoryView};
