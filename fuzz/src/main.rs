//! AFL persistent-mode harness for the batch aggregation path.
//!
//! Each test case is the payload of a `multipart/json` call to the fraud
//! detection UDF. Decoding and hook failures are ordinary outcomes; only
//! panics count as crashes.

unsafe extern "C" {
    fn __AFL_LOOP(cnt: u32) -> i32;
}

use std::io::{self, Read};

use udf_gateway::{
    collection::{decode_collection, encode_collection},
    handler::handle_request,
    headers::{CONTENT_TYPE, Envelope, Headers},
    samples::SampleUdf,
};

/// Largest test case read from stdin.
const MAX_INPUT: u64 = 64 * 1024;

fn main() {
    let handler = SampleUdf::FraudDetection.handler(5);
    let mut data = Vec::new();
    loop {
        // SAFETY: provided by the AFL runtime linked through the `afl` crate.
        if unsafe { __AFL_LOOP(1000) } == 0 {
            break;
        }
        data.clear();
        if io::stdin().take(MAX_INPUT).read_to_end(&mut data).is_err() {
            return;
        }

        // Anything that decodes must survive a re-encode unchanged.
        if let Ok(items) = decode_collection(&data) {
            let reencoded = encode_collection(items.clone());
            assert_eq!(decode_collection(&reencoded).ok(), Some(items));
        }

        let headers = Headers::from([(CONTENT_TYPE.to_owned(), "multipart/json".to_owned())]);
        if let Ok(reply) = handle_request(handler.as_ref(), Envelope::new(headers, data.clone())) {
            assert!(decode_collection(&reply.payload).is_ok());
        }
    }
}
