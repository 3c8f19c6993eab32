#![expect(missing_docs, reason = "test file")]
#![expect(clippy::expect_used, reason = "test assertions")]
#![expect(clippy::panic_in_result_fn, reason = "test assertions")]

//! Single-document mapping over a live gRPC endpoint.

use rstest::rstest;
use serde_json::json;
use test_util::{AnyError, TestServer, decode_single_reply, single};
use tonic::Code;
use udf_gateway::{error::ErrorKind, headers::CONTENT_TYPE, samples::SampleUdf};

#[rstest]
#[tokio::test]
async fn upper_cases_string_values() -> Result<(), AnyError> {
    let server = TestServer::start_sample(SampleUdf::Uppercase).await?;
    let mut client = server.client().await?;
    let document = json!({"name": "ada", "tags": ["x", 1], "nested": {"city": "paris"}});

    let reply = client
        .request_reply(single("application/json", document.to_string()))
        .await?
        .into_inner();

    assert_eq!(
        reply.headers.get(CONTENT_TYPE).map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        decode_single_reply(&reply)?,
        json!({"name": "ADA", "tags": ["X", 1], "nested": {"city": "PARIS"}})
    );
    server.shutdown().await
}

#[rstest]
#[case::batch_type("multipart/json", ErrorKind::InvalidContentType)]
#[case::not_json("application/json", ErrorKind::MalformedItem)]
#[tokio::test]
async fn refuses_bad_requests(
    #[case] content_type: &str,
    #[case] kind: ErrorKind,
) -> Result<(), AnyError> {
    let server = TestServer::start_sample(SampleUdf::Uppercase).await?;
    let mut client = server.client().await?;

    let status = client
        .request_reply(single(content_type, "not json"))
        .await
        .expect_err("must fail");

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(ErrorKind::from_status(&status), Some(kind));
    server.shutdown().await
}
