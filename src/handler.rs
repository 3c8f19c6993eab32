//! Call-level request processing.
//!
//! A [`Handler`] turns one request envelope into one response envelope. The
//! transport calls [`handle_request`], which enforces the handler's content
//! type before any payload byte is looked at and logs how the call ended.
//! Handlers own no per-call data; everything a call needs lives on its stack.

use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    content_type::{self, ExpectedContentType},
    error::UdfError,
    headers::Envelope,
};

/// Phases a call moves through.
///
/// `Rejected` is reachable from `Received` only; `Failed` from `Decoded` or
/// `Folded`. No phase outlives the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallPhase {
    /// The request arrived.
    Received,
    /// `contentType` was accepted.
    Validated,
    /// The payload was split into items.
    Decoded,
    /// Every item was folded into the state.
    Folded,
    /// The finalize hook ran.
    Finalized,
    /// The reply payload was framed.
    Encoded,
    /// The reply was handed back to the transport.
    Responded,
    /// `contentType` was refused.
    Rejected,
    /// Decoding or a hook failed.
    Failed,
}

impl CallPhase {
    /// Lower-case name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Decoded => "decoded",
            Self::Folded => "folded",
            Self::Finalized => "finalized",
            Self::Encoded => "encoded",
            Self::Responded => "responded",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An adapter served through `requestReply`.
pub trait Handler: Send + Sync + 'static {
    /// Content type requests must carry and replies are labelled with.
    fn expected_content_type(&self) -> ExpectedContentType;

    /// Process a request whose content type has already been validated.
    ///
    /// # Errors
    ///
    /// Returns any decoding or hook failure of the call.
    fn handle(&self, request: Envelope) -> Result<Envelope, UdfError>;
}

/// Validate and process a single request without performing network I/O.
///
/// # Errors
///
/// Returns [`UdfError::InvalidContentType`] before the handler runs when the
/// header does not match, otherwise whatever the handler reports.
pub fn handle_request<H>(handler: &H, request: Envelope) -> Result<Envelope, UdfError>
where
    H: Handler + ?Sized,
{
    let expected = handler.expected_content_type();
    debug!(phase = %CallPhase::Received, bytes = request.payload.len(), "received call");
    if let Err(err) = content_type::validate(&request.headers, expected) {
        warn!(
            phase = %CallPhase::Rejected,
            kind = %err.kind(),
            error = %err,
            "rejected call"
        );
        return Err(err);
    }
    debug!(phase = %CallPhase::Validated, content_type = expected.as_str(), "validated call");

    match handler.handle(request) {
        Ok(reply) => {
            info!(
                phase = %CallPhase::Responded,
                content_type = expected.as_str(),
                bytes = reply.payload.len(),
                "call completed"
            );
            Ok(reply)
        }
        Err(err) => {
            warn!(
                phase = %CallPhase::Failed,
                kind = %err.kind(),
                error = %err,
                "call failed"
            );
            Err(err)
        }
    }
}
