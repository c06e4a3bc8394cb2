//! State definitions for Site-Mirror
//!
//! This module defines the per-resource crawl states and the run-level
//! states of the crawl orchestrator.

mod resource_state;
mod run_state;

pub use resource_state::ResourceState;
pub use run_state::RunState;
