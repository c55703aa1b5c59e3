//! Shared helpers for lambdakit integration tests.

#![allow(dead_code)]

use lambdakit::test_utils::{lambda_config, mock_context};
use lambdakit::{LambdaEntry, LambdaFunction, ProxyResponse};
use serde_json::Value;

/// Build a ready entry for `T`, as inside Lambda.
pub fn ready_entry<T: LambdaFunction>() -> LambdaEntry<T> {
    LambdaEntry::<T>::with_config(&lambda_config()).expect("cold start should succeed")
}

/// Cold-start `T` and process a single event.
pub async fn invoke_once<T: LambdaFunction>(event: Value) -> ProxyResponse {
    ready_entry::<T>().invoke(event, mock_context("it")).await
}

/// Decode a response body that is expected to be JSON.
pub fn json_body(response: &ProxyResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body should be JSON")
}
