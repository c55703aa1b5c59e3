mod common;

use lambdakit::test_utils::mock_context;
use lambdakit::{Arguments, BindingTable, BodyBinding, Definition, Failure, LambdaFunction};
use serde_json::{json, Value};

use common::{invoke_once, json_body, ready_entry};

/// Reports the body it received, with its JSON type.
async fn describe(args: Arguments) -> Result<Value, Failure> {
    let body = args.value(0).cloned().unwrap_or(Value::Null);
    let kind = match &body {
        Value::Null => "absent",
        Value::String(_) => "text",
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        _ => "scalar",
    };
    Ok(json!({ "kind": kind, "body": body }))
}

#[derive(Default)]
struct DefaultBody;

impl LambdaFunction for DefaultBody {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|_: &DefaultBody, args| Box::pin(describe(args)))
            .bindings(BindingTable::builder().body(BodyBinding::at(0)))
    }
}

#[tokio::test]
async fn body_without_content_type_is_parsed_as_json() {
    let response = invoke_once::<DefaultBody>(json!({ "body": r#"{"name":"Ada"}"# })).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(
        json_body(&response),
        json!({ "kind": "object", "body": { "name": "Ada" } })
    );
}

#[tokio::test]
async fn json_content_type_with_parameters_is_parsed() {
    let response = invoke_once::<DefaultBody>(json!({
        "headers": { "Content-Type": "application/json; charset=utf-8" },
        "body": "[1,2]"
    }))
    .await;
    assert_eq!(json_body(&response), json!({ "kind": "array", "body": [1, 2] }));
}

#[tokio::test]
async fn unreadable_body_is_rejected_before_the_handler() {
    let response = invoke_once::<DefaultBody>(json!({ "body": "{not json" })).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, "Unreadable request body, need valid JSON");
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}

#[tokio::test]
async fn other_media_types_keep_the_raw_text() {
    let response = invoke_once::<DefaultBody>(json!({
        "headers": { "content-type": "text/plain" },
        "body": "{not json"
    }))
    .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(
        json_body(&response),
        json!({ "kind": "text", "body": "{not json" })
    );
}

#[tokio::test]
async fn missing_and_structured_bodies() {
    let entry = ready_entry::<DefaultBody>();

    let missing = entry.invoke(json!({}), mock_context("missing")).await;
    assert_eq!(json_body(&missing), json!({ "kind": "absent", "body": null }));

    let null = entry.invoke(json!({ "body": null }), mock_context("null")).await;
    assert_eq!(json_body(&null), json!({ "kind": "absent", "body": null }));

    let structured = entry
        .invoke(json!({ "body": { "already": "parsed" } }), mock_context("obj"))
        .await;
    assert_eq!(
        json_body(&structured),
        json!({ "kind": "object", "body": { "already": "parsed" } })
    );
}

#[derive(Default)]
struct RawBody;

impl LambdaFunction for RawBody {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|_: &RawBody, args| Box::pin(describe(args)))
            .bindings(BindingTable::builder().body(BodyBinding::at(0).parse_json(false)))
    }
}

#[tokio::test]
async fn parsing_can_be_disabled() {
    let response = invoke_once::<RawBody>(json!({
        "headers": { "Content-Type": "application/json" },
        "body": r#"{"a":1}"#
    }))
    .await;
    assert_eq!(
        json_body(&response),
        json!({ "kind": "text", "body": r#"{"a":1}"# })
    );
}

#[derive(Default)]
struct VendorJson;

impl LambdaFunction for VendorJson {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|_: &VendorJson, args| Box::pin(describe(args)))
            .bindings(
                BindingTable::builder()
                    .body(BodyBinding::at(0).parse_json(["application/vnd.api+json"])),
            )
    }
}

#[tokio::test]
async fn parsing_follows_declared_media_types() {
    let entry = ready_entry::<VendorJson>();

    let vendor = entry
        .invoke(
            json!({
                "headers": { "Content-Type": "application/vnd.api+json" },
                "body": r#"{"data":[]}"#
            }),
            mock_context("vendor"),
        )
        .await;
    assert_eq!(
        json_body(&vendor),
        json!({ "kind": "object", "body": { "data": [] } })
    );

    let omitted = entry
        .invoke(json!({ "body": r#"{"data":[]}"# }), mock_context("omitted"))
        .await;
    assert_eq!(
        json_body(&omitted),
        json!({ "kind": "text", "body": r#"{"data":[]}"# })
    );
}

#[derive(Default)]
struct StrictJson;

impl LambdaFunction for StrictJson {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|_: &StrictJson, args| Box::pin(describe(args)))
            .bindings(
                BindingTable::builder()
                    .body(BodyBinding::at(0).content_types(["application/json", "text/csv"])),
            )
    }
}

#[derive(Default)]
struct LenientJson;

impl LambdaFunction for LenientJson {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|_: &LenientJson, args| Box::pin(describe(args)))
            .bindings(
                BindingTable::builder()
                    .body(BodyBinding::at(0).content_types([Some("application/json"), None])),
            )
    }
}

#[tokio::test]
async fn unsupported_media_type_lists_accepted_types() {
    let response = invoke_once::<StrictJson>(json!({
        "headers": { "Content-Type": "application/xml" },
        "body": "<a/>"
    }))
    .await;
    assert_eq!(response.status_code, 415);
    assert_eq!(
        response.body,
        "Unsupported Media Type. Supported media types are: application/json, text/csv."
    );

    let omitted = invoke_once::<StrictJson>(json!({ "body": "{}" })).await;
    assert_eq!(omitted.status_code, 415);
}

#[tokio::test]
async fn omitted_content_type_can_be_accepted() {
    let entry = ready_entry::<LenientJson>();

    let omitted = entry.invoke(json!({ "body": "{}" }), mock_context("ok")).await;
    assert_eq!(omitted.status_code, 200);

    let rejected = entry
        .invoke(
            json!({ "headers": { "Content-Type": "text/plain" }, "body": "hi" }),
            mock_context("rejected"),
        )
        .await;
    assert_eq!(rejected.status_code, 415);
    assert_eq!(
        rejected.body,
        "Unsupported Media Type. Supported media types are: application/json. \
         This endpoint also supports omitting the Content-Type header."
    );
}

#[tokio::test]
async fn media_type_is_checked_before_body_presence() {
    let response = invoke_once::<StrictJson>(json!({
        "headers": { "Content-Type": "application/xml" }
    }))
    .await;
    assert_eq!(response.status_code, 415);
}
