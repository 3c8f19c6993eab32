//! Accumulation engine.
//!
//! Every item of a batch is decoded as UTF-8 JSON and handed to the
//! [`Accumulate`] hook together with the call headers and a state that is
//! fresh for the call. Items are folded exactly once, in input order. The first
//! malformed item or hook failure aborts the fold and the partial state is
//! discarded.

use serde_json::Value;
use tracing::trace;

use crate::{
    error::{HookStage, ItemError, UdfError},
    headers::Headers,
    hooks::{self, Accumulate},
    state::AggregationState,
};

/// Decode the item at `index` of a batch.
///
/// # Errors
///
/// Returns [`UdfError::MalformedItem`] when the bytes are not UTF-8 or not a
/// JSON document.
pub fn decode_item(index: usize, bytes: &[u8]) -> Result<Value, UdfError> {
    let parse = || -> Result<Value, ItemError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(serde_json::from_str(text)?)
    };
    parse().map_err(|source| UdfError::MalformedItem { index, source })
}

/// Fold `items` into a new [`AggregationState`].
///
/// # Errors
///
/// Returns the first [`UdfError::MalformedItem`] or [`UdfError::Hook`]
/// encountered.
pub fn fold<A, I, B>(headers: &Headers, items: I, hook: &A) -> Result<AggregationState, UdfError>
where
    A: Accumulate + ?Sized,
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut state = AggregationState::new();
    for (index, bytes) in items.into_iter().enumerate() {
        let item = decode_item(index, bytes.as_ref())?;
        hooks::invoke(HookStage::Accumulate, || {
            hook.accumulate(headers, item, &mut state)
        })?;
        trace!(index, keys = state.len(), "folded item");
    }
    Ok(state)
}
