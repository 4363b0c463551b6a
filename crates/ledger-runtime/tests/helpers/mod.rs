//! Shared helpers for the runtime integration tests

pub mod workload;

pub use workload::*;
