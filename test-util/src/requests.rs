//! Request builders and reply decoders.

use serde_json::Value;
use udf_gateway::{
    collection::{decode_collection, encode_collection},
    headers::{CONTENT_TYPE, Headers, WINDOW_END_TIME, WINDOW_START_TIME},
    proto::GrpcMessage,
};

use crate::AnyError;

/// Build a `multipart/json` batch request carrying `documents`.
///
/// `window` sets `windowStartTime` and `windowEndTime` when present.
#[must_use]
pub fn batch(documents: &[Value], window: Option<(&str, &str)>) -> GrpcMessage {
    let mut headers = Headers::from([(CONTENT_TYPE.to_owned(), "multipart/json".to_owned())]);
    if let Some((start, end)) = window {
        headers.insert(WINDOW_START_TIME.to_owned(), start.to_owned());
        headers.insert(WINDOW_END_TIME.to_owned(), end.to_owned());
    }
    GrpcMessage {
        payload: encode_collection(documents.iter().map(|doc| doc.to_string().into_bytes())),
        headers,
    }
}

/// Build a single-payload request with an arbitrary content type.
#[must_use]
pub fn single(content_type: &str, payload: impl Into<Vec<u8>>) -> GrpcMessage {
    GrpcMessage {
        payload: payload.into(),
        headers: Headers::from([(CONTENT_TYPE.to_owned(), content_type.to_owned())]),
    }
}

/// Decode every JSON document of a `multipart/json` reply.
///
/// # Errors
///
/// Returns an error if the payload is not a collection of JSON documents.
pub fn decode_batch_reply(reply: &GrpcMessage) -> Result<Vec<Value>, AnyError> {
    decode_collection(&reply.payload)?
        .iter()
        .map(|item| Ok(serde_json::from_slice(item)?))
        .collect()
}

/// Decode the JSON document of an `application/json` reply.
///
/// # Errors
///
/// Returns an error if the payload is not JSON.
pub fn decode_single_reply(reply: &GrpcMessage) -> Result<Value, AnyError> {
    Ok(serde_json::from_slice(&reply.payload)?)
}
