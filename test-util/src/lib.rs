//! Utilities for integration tests.
//!
//! The `test-util` crate runs the gateway in-process on an ephemeral port and
//! builds the requests the streaming runtime would send. It is used by the
//! integration tests of the main crate.

pub mod requests;
pub mod server;

pub use requests::{batch, decode_batch_reply, decode_single_reply, single};
pub use server::TestServer;

/// Boxed error type used across the helpers.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;
