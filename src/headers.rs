//! Call headers and the transport-neutral request envelope.
//!
//! Headers are plain string pairs. Only `contentType` is interpreted by the
//! gateway; the window bounds are passed through to hooks untouched.

use std::collections::HashMap;

use crate::proto::GrpcMessage;

/// String headers supplied with every call.
pub type Headers = HashMap<String, String>;

/// Header carrying the MIME type of the payload.
pub const CONTENT_TYPE: &str = "contentType";
/// Header carrying the opaque start of the window that produced the batch.
pub const WINDOW_START_TIME: &str = "windowStartTime";
/// Header carrying the opaque end of the window that produced the batch.
pub const WINDOW_END_TIME: &str = "windowEndTime";

/// Headers and payload of one call, independent of the wire stubs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Call headers.
    pub headers: Headers,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Create an envelope from headers and payload.
    #[must_use]
    pub const fn new(headers: Headers, payload: Vec<u8>) -> Self { Self { headers, payload } }

    /// Look up a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> { self.headers.get(name).map(String::as_str) }
}

impl From<GrpcMessage> for Envelope {
    fn from(message: GrpcMessage) -> Self {
        Self {
            headers: message.headers,
            payload: message.payload,
        }
    }
}

impl From<Envelope> for GrpcMessage {
    fn from(envelope: Envelope) -> Self {
        Self {
            payload: envelope.payload,
            headers: envelope.headers,
        }
    }
}

/// Window bounds copied verbatim from the call headers.
///
/// The values are never parsed; hooks copy them into the records they
/// synthesize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowBounds<'a> {
    /// Value of `windowStartTime`, if present.
    pub start: Option<&'a str>,
    /// Value of `windowEndTime`, if present.
    pub end: Option<&'a str>,
}

impl<'a> WindowBounds<'a> {
    /// Borrow the window bounds from `headers`.
    #[must_use]
    pub fn from_headers(headers: &'a Headers) -> Self {
        Self {
            start: headers.get(WINDOW_START_TIME).map(String::as_str),
            end: headers.get(WINDOW_END_TIME).map(String::as_str),
        }
    }

    /// Write the bounds into `record` as `from` and `to`.
    ///
    /// Absent bounds are left out of the record rather than written as
    /// `null`.
    pub fn stamp(&self, record: &mut serde_json::Map<String, serde_json::Value>) {
        if let Some(start) = self.start {
            record.insert("from".to_owned(), start.into());
        }
        if let Some(end) = self.end {
            record.insert("to".to_owned(), end.into());
        }
    }
}
