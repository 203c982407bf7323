//! Demo mode: a simulated cluster that needs no status server.

mod cluster;

pub use cluster::{DemoCluster, DemoConfig};
