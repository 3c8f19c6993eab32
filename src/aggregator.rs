//! Windowed batch aggregation adapter.
//!
//! Each call carries one window's events as a `multipart/json` payload
//! collection. The adapter folds them into a fresh [`AggregationState`],
//! finalizes it once and answers with one JSON document per surviving
//! record.

use tracing::debug;

use crate::{
    collection::decode_collection,
    content_type::ExpectedContentType,
    error::UdfError,
    finalize::{encode_records, finalize},
    fold::fold,
    handler::{CallPhase, Handler},
    headers::{CONTENT_TYPE, Envelope, Headers},
    hooks::{Accumulate, Finalize, Identity},
    state::AggregationState,
};

/// Adapter pairing an [`Accumulate`] hook with a [`Finalize`] hook.
#[derive(Clone, Debug)]
pub struct Aggregator<A, F = Identity> {
    accumulate: A,
    finalize: F,
}

impl<A: Accumulate> Aggregator<A> {
    /// Create an aggregator that emits every folded record.
    #[must_use]
    pub const fn new(accumulate: A) -> Self {
        Self {
            accumulate,
            finalize: Identity,
        }
    }
}

impl<A: Accumulate, F: Finalize> Aggregator<A, F> {
    /// Replace the finalize hook.
    #[must_use]
    pub fn with_finalize<G: Finalize>(self, finalize: G) -> Aggregator<A, G> {
        Aggregator {
            accumulate: self.accumulate,
            finalize,
        }
    }

    /// Decode, fold and finalize one batch.
    ///
    /// # Errors
    ///
    /// Returns [`UdfError::CollectionDecode`], [`UdfError::MalformedItem`] or
    /// [`UdfError::Hook`]. The content type is not checked here.
    pub fn aggregate(&self, headers: &Headers, payload: &[u8]) -> Result<AggregationState, UdfError> {
        let items = decode_collection(payload)?;
        debug!(phase = %CallPhase::Decoded, items = items.len(), "decoded batch");
        let folded = fold(headers, &items, &self.accumulate)?;
        debug!(phase = %CallPhase::Folded, keys = folded.len(), "folded batch");
        let emitted = finalize(&self.finalize, folded)?;
        debug!(phase = %CallPhase::Finalized, keys = emitted.len(), "finalized batch");
        Ok(emitted)
    }
}

impl<A: Accumulate, F: Finalize> Handler for Aggregator<A, F> {
    fn expected_content_type(&self) -> ExpectedContentType { ExpectedContentType::MultipartJson }

    fn handle(&self, request: Envelope) -> Result<Envelope, UdfError> {
        let state = self.aggregate(&request.headers, &request.payload)?;
        let payload = encode_records(state);
        debug!(phase = %CallPhase::Encoded, bytes = payload.len(), "encoded reply");

        let mut headers = Headers::new();
        self.finalize.response_headers(&mut headers);
        headers.insert(
            CONTENT_TYPE.to_owned(),
            ExpectedContentType::MultipartJson.as_str().to_owned(),
        );
        Ok(Envelope::new(headers, payload))
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        collection::encode_collection,
        error::{ErrorKind, HookError},
        handler::handle_request,
        headers::WINDOW_START_TIME,
    };

    fn count_by_key(
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError> {
        let key = item["key"].as_str().ok_or("missing key")?.to_owned();
        let record = state.get_or_insert_with(key.clone(), || {
            json!({"key": key, "from": headers.get(WINDOW_START_TIME), "count": 0})
        });
        record["count"] = json!(record["count"].as_u64().unwrap_or_default() + 1);
        Ok(())
    }

    /// Keeps every record and marks the reply headers.
    struct Labelled;

    impl Finalize for Labelled {
        fn finalize(&self, state: AggregationState) -> Result<AggregationState, HookError> {
            Ok(state)
        }

        fn response_headers(&self, headers: &mut Headers) {
            headers.insert("x-finalized".to_owned(), "yes".to_owned());
            headers.insert(CONTENT_TYPE.to_owned(), "text/plain".to_owned());
        }
    }

    #[fixture]
    fn batch() -> Envelope {
        let items = [r#"{"key":"a"}"#, r#"{"key":"b"}"#, r#"{"key":"a"}"#];
        Envelope::new(
            Headers::from([
                (CONTENT_TYPE.to_owned(), "multipart/json".to_owned()),
                (WINDOW_START_TIME.to_owned(), "t0".to_owned()),
            ]),
            encode_collection(items.map(|item| item.as_bytes().to_vec())),
        )
    }

    fn records(reply: &Envelope) -> Vec<Value> {
        decode_collection(&reply.payload)
            .expect("decode")
            .iter()
            .map(|item| serde_json::from_slice(item).expect("json"))
            .collect()
    }

    #[rstest]
    fn emits_one_record_per_key(batch: Envelope) {
        let reply = handle_request(&Aggregator::new(count_by_key), batch).expect("reply");

        assert_eq!(
            reply.headers.get(CONTENT_TYPE).map(String::as_str),
            Some("multipart/json")
        );
        assert_eq!(
            records(&reply),
            [
                json!({"key": "a", "from": "t0", "count": 2}),
                json!({"key": "b", "from": "t0", "count": 1}),
            ]
        );
    }

    #[rstest]
    fn finalize_headers_cannot_override_content_type(batch: Envelope) {
        let aggregator = Aggregator::new(count_by_key).with_finalize(Labelled);

        let reply = handle_request(&aggregator, batch).expect("reply");

        assert_eq!(reply.headers.get("x-finalized").map(String::as_str), Some("yes"));
        assert_eq!(
            reply.headers.get(CONTENT_TYPE).map(String::as_str),
            Some("multipart/json")
        );
    }

    #[rstest]
    fn each_call_starts_from_empty_state(batch: Envelope) {
        let aggregator = Aggregator::new(count_by_key);

        let first = handle_request(&aggregator, batch.clone()).expect("first");
        let second = handle_request(&aggregator, batch).expect("second");

        assert_eq!(records(&first), records(&second));
    }

    #[rstest]
    fn empty_batch_yields_empty_reply() {
        let request = Envelope::new(
            Headers::from([(CONTENT_TYPE.to_owned(), "multipart/json".to_owned())]),
            Vec::new(),
        );

        let reply = handle_request(&Aggregator::new(count_by_key), request).expect("reply");

        assert!(records(&reply).is_empty());
    }

    #[rstest]
    #[case::not_a_collection(vec![0x0a, 0x09], ErrorKind::CollectionDecodeError)]
    #[case::not_json(encode_collection([b"{\"key\":\"a\"}".to_vec(), b"oops".to_vec()]), ErrorKind::MalformedItem)]
    #[case::hook_error(encode_collection([b"{}".to_vec()]), ErrorKind::HookError)]
    fn failures_fail_the_whole_call(#[case] payload: Vec<u8>, #[case] kind: ErrorKind) {
        let request = Envelope::new(
            Headers::from([(CONTENT_TYPE.to_owned(), "multipart/json".to_owned())]),
            payload,
        );

        let err = handle_request(&Aggregator::new(count_by_key), request).expect_err("must fail");

        assert_eq!(err.kind(), kind);
    }
}
