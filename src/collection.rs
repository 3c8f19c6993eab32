//! Binary collection codec.
//!
//! A batch travels as one [`GrpcPayloadCollection`] whose repeated `payload`
//! field holds the items in emission order. The codec never looks inside an
//! item; decoding JSON is the job of [`crate::fold`].

use bytes::Bytes;
use prost::Message;

use crate::{error::UdfError, proto::GrpcPayloadCollection};

/// Frame `items` into the wire bytes of a payload collection.
///
/// Order is preserved and empty items are kept.
#[must_use]
pub fn encode_collection<I, B>(items: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: Into<Bytes>,
{
    GrpcPayloadCollection {
        payload: items.into_iter().map(Into::into).collect(),
    }
    .encode_to_vec()
}

/// Split the wire bytes of a payload collection into its items.
///
/// # Errors
///
/// Returns [`UdfError::CollectionDecode`] when `bytes` is not a well-formed
/// collection.
pub fn decode_collection(bytes: &[u8]) -> Result<Vec<Bytes>, UdfError> {
    let collection = GrpcPayloadCollection::decode(bytes)?;
    Ok(collection.payload)
}
