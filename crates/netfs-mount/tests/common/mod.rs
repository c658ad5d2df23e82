//! Shared helpers for netfs-mount integration tests.

pub mod harness;

pub use harness::*;
