//! User hook traits.
//!
//! A hook is the domain logic plugged into the otherwise generic engine:
//! [`Accumulate`] folds one item into the per-call state, [`Finalize`] turns
//! the folded state into the records to emit, and [`Map`] transforms a single
//! document. Hooks are shared by every concurrent call, so they take `&self`
//! and must keep any per-call data inside the state they are given.
//!
//! Plain functions and closures implement the traits directly. Closures need
//! their reference parameters annotated so they are generic over lifetimes:
//!
//! ```
//! use serde_json::{Value, json};
//! use udf_gateway::{
//!     error::HookError,
//!     headers::Headers,
//!     hooks::Accumulate,
//!     state::AggregationState,
//! };
//!
//! let count = |_: &Headers, item: Value, state: &mut AggregationState| -> Result<(), HookError> {
//!     let key = item["key"].as_str().unwrap_or_default().to_owned();
//!     let record = state.get_or_insert_with(key, || json!({"count": 0}));
//!     record["count"] = json!(record["count"].as_u64().unwrap_or_default() + 1);
//!     Ok(())
//! };
//!
//! let mut state = AggregationState::new();
//! count
//!     .accumulate(&Headers::new(), json!({"key": "a"}), &mut state)
//!     .unwrap();
//! assert_eq!(state.get("a"), Some(&json!({"count": 1})));
//! ```

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

use serde_json::Value;

use crate::{
    error::{HookError, HookStage, UdfError},
    headers::Headers,
    state::AggregationState,
};

/// Folds one decoded item into the per-call state.
pub trait Accumulate: Send + Sync + 'static {
    /// Fold `item` into `state`.
    ///
    /// # Errors
    ///
    /// Any error fails the whole call.
    fn accumulate(
        &self,
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError>;
}

impl<F> Accumulate for F
where
    F: Fn(&Headers, Value, &mut AggregationState) -> Result<(), HookError> + Send + Sync + 'static,
{
    fn accumulate(
        &self,
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError> {
        self(headers, item, state)
    }
}

/// Post-processes the folded state once per call.
pub trait Finalize: Send + Sync + 'static {
    /// Turn the folded state into the records to emit.
    ///
    /// # Errors
    ///
    /// Any error fails the whole call.
    fn finalize(&self, state: AggregationState) -> Result<AggregationState, HookError>;

    /// Add headers to the response.
    ///
    /// `contentType` is overwritten after this runs.
    fn response_headers(&self, headers: &mut Headers) { let _ = headers; }
}

impl<F> Finalize for F
where
    F: Fn(AggregationState) -> Result<AggregationState, HookError> + Send + Sync + 'static,
{
    fn finalize(&self, state: AggregationState) -> Result<AggregationState, HookError> {
        self(state)
    }
}

/// Finalizer that emits every folded record unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Finalize for Identity {
    fn finalize(&self, state: AggregationState) -> Result<AggregationState, HookError> { Ok(state) }
}

/// Transforms a single document.
pub trait Map: Send + Sync + 'static {
    /// Map `item` to the document to return.
    ///
    /// # Errors
    ///
    /// Any error fails the call.
    fn map(&self, headers: &Headers, item: Value) -> Result<Value, HookError>;
}

impl<F> Map for F
where
    F: Fn(&Headers, Value) -> Result<Value, HookError> + Send + Sync + 'static,
{
    fn map(&self, headers: &Headers, item: Value) -> Result<Value, HookError> {
        self(headers, item)
    }
}

/// Run a hook, turning both its error and a panic into [`UdfError::Hook`].
///
/// State the hook was mutating when it panicked is dropped with the failed
/// call, so observing it half-updated is impossible.
pub(crate) fn invoke<T, F>(stage: HookStage, hook: F) -> Result<T, UdfError>
where
    F: FnOnce() -> Result<T, HookError>,
{
    match catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result.map_err(|source| UdfError::hook(stage, source)),
        Err(payload) => Err(UdfError::hook(
            stage,
            format!("hook panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
