//! Finalization stage.
//!
//! Runs the [`Finalize`] hook once on the fully folded state and frames the
//! surviving records for the response. Taking the state by value means the
//! hook cannot run before folding has finished, nor twice on the same state.

use tracing::debug;

use crate::{
    collection::encode_collection,
    error::{HookStage, UdfError},
    hooks::{self, Finalize},
    state::AggregationState,
};

/// Apply `hook` to the folded `state`.
///
/// # Errors
///
/// Returns [`UdfError::Hook`] when the hook fails or panics.
pub fn finalize<F>(hook: &F, state: AggregationState) -> Result<AggregationState, UdfError>
where
    F: Finalize + ?Sized,
{
    let folded = state.len();
    let emitted = hooks::invoke(HookStage::Finalize, || hook.finalize(state))?;
    debug!(folded, emitted = emitted.len(), "finalized state");
    Ok(emitted)
}

/// Encode every record of `state` as a JSON document and frame them as a
/// payload collection, in insertion order.
#[must_use]
pub fn encode_records(state: AggregationState) -> Vec<u8> {
    encode_collection(state.into_values().map(|record| record.to_string().into_bytes()))
}
