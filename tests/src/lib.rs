//! # mir-dash Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── status_pipeline.rs     # wire JSON -> decode -> validate -> render
//!     ├── aligned_scenarios.rs   # multi-node alignment, checkpoints, peer rows
//!     └── dashboard_flow.rs      # demo cluster -> controller -> app
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mir-tests
//! cargo test -p mir-tests integration::dashboard_flow
//! ```

#![allow(dead_code)]

pub mod integration;
