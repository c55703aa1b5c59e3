mod common;

use http::StatusCode;
use lambdakit::test_utils::mock_context;
use lambdakit::{
    Arguments, BindingTable, Definition, ErrorRules, Failure, LambdaFunction, ResponseEntity,
};
use serde_json::{json, Value};
use thiserror::Error;

use common::ready_entry;

#[derive(Debug, Error)]
#[error("quota of {limit} requests exceeded")]
struct QuotaExceeded {
    limit: u32,
}

/// Fails in the way named by the `mode` query parameter.
#[derive(Default)]
struct Thrower;

impl Thrower {
    async fn throw(&self, args: Arguments) -> Result<Value, Failure> {
        match args.str(0) {
            Some("hello") => Err(Failure::msg("Hello")),
            Some("null") => Err(Failure::null()),
            Some("quota") => Err(QuotaExceeded { limit: 10 }.into()),
            Some(other) => Err(Failure::msg(format!("unexpected mode {other}"))),
            None => Ok(json!("fine")),
        }
    }
}

impl LambdaFunction for Thrower {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|this: &Thrower, args| Box::pin(this.throw(args)))
            .bindings(BindingTable::builder().query_param("mode", 0))
            .error_rules(
                ErrorRules::new()
                    .on(
                        |err| err.message().as_deref() == Some("Hello"),
                        |err| {
                            let message = err.message().unwrap_or_default();
                            ResponseEntity::text(
                                StatusCode::NOT_FOUND,
                                format!("Error is: {message}"),
                            )
                        },
                    )
                    .on(Failure::is_null, |_| {
                        ResponseEntity::new(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            json!({ "message": "Error is null" }),
                        )
                    })
                    .on(
                        |err| err.downcast_ref::<QuotaExceeded>().is_some(),
                        |err| {
                            ResponseEntity::text(StatusCode::TOO_MANY_REQUESTS, err.to_string())
                                .with_header("Retry-After", "60")
                        },
                    ),
            )
    }
}

fn mode(mode: &str) -> Value {
    json!({ "queryStringParameters": { "mode": mode } })
}

#[tokio::test]
async fn matching_rule_builds_text_response() {
    let entry = ready_entry::<Thrower>();
    let response = entry.invoke(mode("hello"), mock_context("hello")).await;
    assert_eq!(response.status_code, 404);
    assert_eq!(response.body, "Error is: Hello");
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}

#[tokio::test]
async fn null_failure_builds_json_response() {
    let entry = ready_entry::<Thrower>();
    let response = entry.invoke(mode("null"), mock_context("null")).await;
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, r#"{"message":"Error is null"}"#);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn typed_failures_can_be_matched() {
    let entry = ready_entry::<Thrower>();
    let response = entry.invoke(mode("quota"), mock_context("quota")).await;
    assert_eq!(response.status_code, 429);
    assert_eq!(response.body, "quota of 10 requests exceeded");
    assert_eq!(response.header("Retry-After"), Some("60"));
}

#[tokio::test]
async fn unmatched_failure_is_unexpected_error() {
    let entry = ready_entry::<Thrower>();
    let response = entry.invoke(mode("other"), mock_context("other")).await;
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, "An unexpected error occurred");
    assert_eq!(response.header("Content-Type"), Some("text/plain"));

    let fine = entry.invoke(json!({}), mock_context("fine")).await;
    assert_eq!(fine.status_code, 200);
    assert_eq!(fine.body, "fine");
}
