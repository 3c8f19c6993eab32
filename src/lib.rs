//! Execution gateway for user-defined window aggregations.
//!
//! An upstream streaming runtime groups events into time windows and calls
//! `MessagingService/requestReply` once per window. The gateway decodes the
//! batch, folds every event into a per-call [`state::AggregationState`] with
//! a user [`hooks::Accumulate`] hook, post-processes the result once with a
//! [`hooks::Finalize`] hook and answers with the resulting records. The
//! [`mapper::Mapper`] adapter covers stateless one-document transforms.
//!
//! No state survives a call: every request gets a fresh accumulator and
//! concurrent calls share nothing but the immutable hooks.

pub mod aggregator;
pub mod collection;
pub mod content_type;
pub mod error;
pub mod finalize;
pub mod fold;
pub mod handler;
pub mod headers;
pub mod hooks;
pub mod mapper;
pub mod proto;
pub mod samples;
pub mod server;
pub mod state;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_helpers;
