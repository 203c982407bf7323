//! mir-dash: terminal dashboard for replica status
//!
//! Polls a status server (or an in-process demo cluster), renders every
//! replica's buckets into one aligned sequence matrix, and lets the operator
//! drive replicas by hand.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  StatusProvider   ┌────────────┐  render_model  ┌───────────┐
//! │ StatusClient │ ────────────────► │ Controller │ ─────────────► │    App    │
//! │ DemoCluster  │ ◄──────────────── │ PollGuard  │                │ (matrix)  │
//! └──────────────┘ CommandDispatcher └────────────┘                └─────┬─────┘
//!                                          ▲                             │
//!                                          │ Command           ui::render│
//!                                          └──────── keys ◄──────────────┘
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod demo;
pub mod domain;
pub mod telemetry;
pub mod ui;

pub use config::{AutoProcess, DashConfig};
pub use controller::Controller;
pub use domain::{App, AppState, Command};
