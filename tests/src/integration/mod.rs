//! Cross-crate integration tests.

pub mod aligned_scenarios;
pub mod dashboard_flow;
pub mod status_pipeline;
