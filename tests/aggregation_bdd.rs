#![expect(missing_docs, reason = "test file")]
#![expect(clippy::expect_used, reason = "test assertions")]

//! Behaviour-driven tests for windowed aggregation.
//!
//! Runs the `aggregation.feature` scenarios through the same request pipeline
//! the gRPC service uses, without a network hop.

use std::{cell::RefCell, sync::Arc};

use rstest::fixture;
use rstest_bdd::{assert_step_err, assert_step_ok};
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use udf_gateway::{
    collection::{decode_collection, encode_collection},
    error::UdfError,
    handler::{Handler, handle_request},
    headers::{CONTENT_TYPE, Envelope, Headers, WINDOW_END_TIME, WINDOW_START_TIME},
    samples::SampleUdf,
};

struct AggregationWorld {
    handler: RefCell<Option<Arc<dyn Handler>>>,
    headers: RefCell<Headers>,
    events: RefCell<Vec<Vec<u8>>>,
    outcome: RefCell<Option<Result<Envelope, UdfError>>>,
}

impl AggregationWorld {
    fn new() -> Self {
        Self {
            handler: RefCell::new(None),
            headers: RefCell::new(Headers::new()),
            events: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        }
    }

    fn content_type(&self, value: &str) {
        self.headers
            .borrow_mut()
            .insert(CONTENT_TYPE.to_owned(), value.to_owned());
    }

    fn records(&self) -> Vec<Value> {
        let outcome = self.outcome.borrow();
        let result = outcome.as_ref().expect("batch not aggregated");
        let reply = assert_step_ok!(result.as_ref().map_err(ToString::to_string));
        decode_collection(&reply.payload)
            .expect("reply collection")
            .iter()
            .map(|item| serde_json::from_slice(item).expect("reply record"))
            .collect()
    }
}

#[fixture]
fn world() -> AggregationWorld { AggregationWorld::new() }

#[given("the \"{udf}\" UDF")]
fn given_udf(world: &AggregationWorld, udf: String) {
    let udf: SampleUdf = udf.parse().expect("sample UDF");
    world.handler.borrow_mut().replace(udf.handler(5));
}

#[given("a batch for window \"{start}\" to \"{end}\"")]
fn given_window(world: &AggregationWorld, start: String, end: String) {
    world.content_type("multipart/json");
    let mut headers = world.headers.borrow_mut();
    headers.insert(WINDOW_START_TIME.to_owned(), start);
    headers.insert(WINDOW_END_TIME.to_owned(), end);
}

#[given("a batch without window bounds")]
fn given_no_window(world: &AggregationWorld) { world.content_type("multipart/json"); }

#[given("a batch with content type \"{content_type}\"")]
fn given_content_type(world: &AggregationWorld, content_type: String) {
    world.content_type(&content_type);
}

#[given("the event {event}")]
fn given_event(world: &AggregationWorld, event: String) {
    let parsed: Value = serde_json::from_str(&event).expect("event JSON");
    world.events.borrow_mut().push(parsed.to_string().into_bytes());
}

#[given("{count} authorizations for card \"{card}\"")]
fn given_authorizations(world: &AggregationWorld, count: usize, card: String) {
    let event = serde_json::json!({"card_number": card, "amount": 1}).to_string();
    world
        .events
        .borrow_mut()
        .extend(std::iter::repeat_n(event.into_bytes(), count));
}

#[when("the batch is aggregated")]
fn when_aggregated(world: &AggregationWorld) {
    let handler = world.handler.borrow().clone().expect("UDF not selected");
    let request = Envelope::new(
        world.headers.borrow().clone(),
        encode_collection(world.events.borrow().iter().cloned()),
    );
    let outcome = handle_request(handler.as_ref(), request);
    world.outcome.borrow_mut().replace(outcome);
}

#[then("{count} records are emitted")]
fn then_count(world: &AggregationWorld, count: usize) {
    assert_eq!(world.records().len(), count);
}

#[then("record {index} is {expected}")]
fn then_record(world: &AggregationWorld, index: usize, expected: String) {
    let expected: Value = serde_json::from_str(&expected).expect("expected JSON");
    assert_eq!(world.records().get(index), Some(&expected));
}

#[then("the call fails with \"{kind}\"")]
fn then_fails(world: &AggregationWorld, kind: String) {
    let outcome = world.outcome.borrow();
    let result = outcome.as_ref().expect("batch not aggregated");
    let err = assert_step_err!(result.as_ref().map(|_| ()));
    assert_eq!(err.kind().as_str(), kind);
}

#[scenario(path = "tests/features/aggregation.feature", index = 0)]
fn summing_team_scores(world: AggregationWorld) { let _ = world; }

#[scenario(path = "tests/features/aggregation.feature", index = 1)]
fn flagging_fraud(world: AggregationWorld) { let _ = world; }

#[scenario(path = "tests/features/aggregation.feature", index = 2)]
fn rejecting_single_documents(world: AggregationWorld) { let _ = world; }

#[scenario(path = "tests/features/aggregation.feature", index = 3)]
fn failing_without_a_key(world: AggregationWorld) { let _ = world; }
