//! Single-document mapping adapter.
//!
//! The payload is one `application/json` document in and one out; there is no
//! collection framing and no state.

use tracing::debug;

use crate::{
    content_type::ExpectedContentType,
    error::{HookStage, UdfError},
    fold::decode_item,
    handler::{CallPhase, Handler},
    headers::{CONTENT_TYPE, Envelope, Headers},
    hooks::{self, Map},
};

/// Adapter running a [`Map`] hook on every request.
#[derive(Clone, Debug)]
pub struct Mapper<M> {
    map: M,
}

impl<M: Map> Mapper<M> {
    /// Wrap `map`.
    #[must_use]
    pub const fn new(map: M) -> Self { Self { map } }
}

impl<M: Map> Handler for Mapper<M> {
    fn expected_content_type(&self) -> ExpectedContentType { ExpectedContentType::ApplicationJson }

    fn handle(&self, request: Envelope) -> Result<Envelope, UdfError> {
        let item = decode_item(0, &request.payload)?;
        debug!(phase = %CallPhase::Decoded, "decoded document");
        let mapped = hooks::invoke(HookStage::Map, || self.map.map(&request.headers, item))?;
        let payload = mapped.to_string().into_bytes();
        debug!(phase = %CallPhase::Encoded, bytes = payload.len(), "encoded reply");

        let headers = Headers::from([(
            CONTENT_TYPE.to_owned(),
            ExpectedContentType::ApplicationJson.as_str().to_owned(),
        )]);
        Ok(Envelope::new(headers, payload))
    }
}
