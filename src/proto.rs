//! Wire messages of the Spring Cloud Function `MessagingService`.
//!
//! The streaming runtime talks to every user-defined function through a single
//! unary `requestReply` call carrying a [`GrpcMessage`]. Batched window
//! payloads are framed as a [`GrpcPayloadCollection`] inside the message
//! payload. Both messages are declared here with `prost` attributes; the
//! service stubs are generated by `build.rs`.

use std::collections::HashMap;

use bytes::Bytes;

/// Request and response message exchanged by `requestReply`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GrpcMessage {
    /// Opaque payload bytes.
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    /// String headers travelling with the payload.
    #[prost(map = "string, string", tag = "2")]
    pub headers: HashMap<String, String>,
}

/// Ordered collection of independently encoded payloads.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GrpcPayloadCollection {
    /// Payloads in emission order.
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub payload: Vec<Bytes>,
}

#[allow(
    missing_docs,
    clippy::pedantic,
    clippy::nursery,
    clippy::restriction,
    reason = "generated by tonic-build"
)]
mod generated {
    include!(concat!(
        env!("OUT_DIR"),
        "/org.springframework.cloud.function.grpc.MessagingService.rs"
    ));
}

pub use generated::{messaging_service_client, messaging_service_server};

/// Fully qualified gRPC service name.
pub const SERVICE_NAME: &str = "org.springframework.cloud.function.grpc.MessagingService";
