//! Status server access.
//!
//! The dashboard talks to replicas through two ports: [`StatusProvider`] for
//! polling snapshots and [`CommandDispatcher`] for driving nodes. The HTTP
//! [`StatusClient`] and the in-process demo cluster both implement them.

mod client;
mod ports;

pub use client::{ApiError, ApiResult, StatusClient};
pub use ports::{CommandDispatcher, StatusProvider};
