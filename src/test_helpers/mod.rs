//! Shared helpers for unit tests.

pub(crate) mod tracing;
