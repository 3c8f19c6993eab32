//! Request-scoped failures and their mapping to gRPC status codes.
//!
//! Every failure of a call is a [`UdfError`] value. Nothing is thrown past
//! the call boundary: the server converts the error into a [`tonic::Status`]
//! and keeps serving other calls.

use std::{fmt, str::Utf8Error};

use thiserror::Error;
use tonic::{Code, Status, metadata::MetadataValue};

/// Error type returned by user hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Metadata key carrying [`ErrorKind::as_str`] on error responses.
pub const ERROR_KIND_METADATA: &str = "x-udf-error-kind";

/// Hook stage that produced a [`UdfError::Hook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    /// The per-item accumulate hook.
    Accumulate,
    /// The finalize hook run once after folding.
    Finalize,
    /// The single-document map hook.
    Map,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accumulate => "accumulate",
            Self::Finalize => "finalize",
            Self::Map => "map",
        })
    }
}

/// Why a single item could not be decoded.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The bytes are not UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    /// The text is not a JSON document.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures that abort a single call.
#[derive(Debug, Error)]
pub enum UdfError {
    /// `contentType` is missing, unparsable or not the adapter's type.
    #[error("invalid content type {found:?}: expected {expected}")]
    InvalidContentType {
        /// Header value as received.
        found: Option<String>,
        /// MIME type the adapter accepts.
        expected: &'static str,
    },
    /// An item of the batch is not a UTF-8 JSON document.
    #[error("malformed item at index {index}: {source}")]
    MalformedItem {
        /// Position of the item in the batch.
        index: usize,
        /// Decoding failure.
        #[source]
        source: ItemError,
    },
    /// The payload is not a well-formed payload collection.
    #[error("failed to decode payload collection: {0}")]
    CollectionDecode(#[from] prost::DecodeError),
    /// A user hook reported an error.
    #[error("{stage} hook failed: {source}")]
    Hook {
        /// Stage that failed.
        stage: HookStage,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },
}

/// Stable name of a [`UdfError`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`UdfError::InvalidContentType`].
    InvalidContentType,
    /// See [`UdfError::MalformedItem`].
    MalformedItem,
    /// See [`UdfError::CollectionDecode`].
    CollectionDecodeError,
    /// See [`UdfError::Hook`].
    HookError,
}

impl ErrorKind {
    /// Name used in logs and response metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidContentType => "InvalidContentType",
            Self::MalformedItem => "MalformedItem",
            Self::CollectionDecodeError => "CollectionDecodeError",
            Self::HookError => "HookError",
        }
    }

    /// gRPC status code reported for this kind.
    #[must_use]
    pub const fn code(self) -> Code {
        match self {
            Self::InvalidContentType | Self::MalformedItem | Self::CollectionDecodeError => {
                Code::InvalidArgument
            }
            Self::HookError => Code::Internal,
        }
    }

    /// Parse a name produced by [`ErrorKind::as_str`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::InvalidContentType,
            Self::MalformedItem,
            Self::CollectionDecodeError,
            Self::HookError,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == name)
    }

    /// Recover the kind from an error status returned by the gateway.
    #[must_use]
    pub fn from_status(status: &Status) -> Option<Self> {
        status
            .metadata()
            .get(ERROR_KIND_METADATA)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::from_name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl UdfError {
    /// Build an [`UdfError::Hook`] for `stage`.
    pub fn hook(stage: HookStage, source: impl Into<HookError>) -> Self {
        Self::Hook {
            stage,
            source: source.into(),
        }
    }

    /// Variant name of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidContentType { .. } => ErrorKind::InvalidContentType,
            Self::MalformedItem { .. } => ErrorKind::MalformedItem,
            Self::CollectionDecode(_) => ErrorKind::CollectionDecodeError,
            Self::Hook { .. } => ErrorKind::HookError,
        }
    }
}

impl From<UdfError> for Status {
    fn from(err: UdfError) -> Self {
        let kind = err.kind();
        let mut status = Self::new(kind.code(), err.to_string());
        status
            .metadata_mut()
            .insert(ERROR_KIND_METADATA, MetadataValue::from_static(kind.as_str()));
        status
    }
}
