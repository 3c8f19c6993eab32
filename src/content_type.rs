//! `contentType` header validation.
//!
//! The header is parsed as a MIME media type. Only the type and subtype are
//! compared, case-insensitively; parameters such as `charset` are accepted
//! and ignored.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    error::UdfError,
    headers::{CONTENT_TYPE, Headers},
};

/// `type/subtype` pair of a media type, lower-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaType {
    top: String,
    subtype: String,
}

/// Reason a header value is not a media type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("'{0}' is not a media type")]
pub struct InvalidMediaType(pub String);

impl MediaType {
    /// Top-level type, for example `multipart`.
    #[must_use]
    pub fn top(&self) -> &str { &self.top }

    /// Subtype, for example `json`.
    #[must_use]
    pub fn subtype(&self) -> &str { &self.subtype }
}

impl FromStr for MediaType {
    type Err = InvalidMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        let invalid = || InvalidMediaType(s.to_owned());
        let (top, subtype) = essence.split_once('/').ok_or_else(invalid)?;
        if !is_token(top) || !is_token(subtype) {
            return Err(invalid());
        }
        Ok(Self {
            top: top.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.subtype)
    }
}

/// RFC 7230 `token`: visible ASCII without separators.
fn is_token(part: &str) -> bool {
    !part.is_empty()
        && part.bytes().all(|byte| {
            byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
        })
}

/// Content type an adapter accepts and answers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedContentType {
    /// A framed batch of JSON documents.
    MultipartJson,
    /// A single JSON document.
    ApplicationJson,
}

impl ExpectedContentType {
    /// Every content type an adapter can expect.
    pub const ALL: [Self; 2] = [Self::MultipartJson, Self::ApplicationJson];

    /// The adapter content type `media` satisfies, if any.
    #[must_use]
    pub fn from_media_type(media: &MediaType) -> Option<Self> {
        Self::ALL.into_iter().find(|expected| expected.matches(media))
    }

    /// Canonical header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipartJson => "multipart/json",
            Self::ApplicationJson => "application/json",
        }
    }

    /// Whether `media` has the expected type and subtype.
    #[must_use]
    pub fn matches(self, media: &MediaType) -> bool {
        let top = match self {
            Self::MultipartJson => "multipart",
            Self::ApplicationJson => "application",
        };
        media.top() == top && media.subtype() == "json"
    }
}

/// Check the `contentType` header of a call.
///
/// # Errors
///
/// Returns [`UdfError::InvalidContentType`] when the header is missing, is
/// not a media type, or names a different type or subtype.
pub fn validate(headers: &Headers, expected: ExpectedContentType) -> Result<MediaType, UdfError> {
    let found = headers.get(CONTENT_TYPE);
    let reject = || UdfError::InvalidContentType {
        found: found.cloned(),
        expected: expected.as_str(),
    };
    let media: MediaType = found.ok_or_else(reject)?.parse().map_err(|_| reject())?;
    if expected.matches(&media) {
        Ok(media)
    } else {
        Err(reject())
    }
}
