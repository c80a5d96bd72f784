//! Parsing an SQS batch through a YAML config and a schema directory.

use evp_cli::parse::{run_parse, ParseArgs};
use serde_json::{json, Value};

fn sqs_record(body: &str) -> Value {
    json!({
        "messageId": "059f36b4-87a3-44ab-83d2-661975830a7d",
        "receiptHandle": "AQEBwJnKyrHigUMZj6rYigCgxlaS3SLy0a",
        "body": body,
        "attributes": {"ApproximateReceiveCount": "1"},
        "messageAttributes": {},
        "md5OfBody": "e4e68fb7bd0e697a0ae8f1bb342846b3",
        "eventSource": "aws:sqs",
        "eventSourceARN": "arn:aws:sqs:us-east-2:123456789012:orders",
        "awsRegion": "us-east-2"
    })
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    std::fs::create_dir(&schemas).unwrap();
    std::fs::write(
        schemas.join("order.schema.json"),
        json!({
            "$id": "https://schemas.example.org/order.schema.json",
            "type": "object",
            "required": ["id", "sku"],
            "properties": {
                "id": {"type": "integer"},
                "sku": {"$ref": "https://schemas.example.org/sku.schema.json"}
            }
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        schemas.join("sku.schema.json"),
        json!({"$id": "https://schemas.example.org/sku.schema.json", "type": "string", "pattern": "^[A-Z]{3}-[0-9]+$"}).to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("parser.yaml"),
        "schema_dir: schemas\nmodel: order.schema.json\nenvelopes: [sqs]\nunknown_fields: deny\n",
    )
    .unwrap();
    dir
}

fn args(dir: &tempfile::TempDir, event: Value) -> ParseArgs {
    let event_path = dir.path().join("event.json");
    std::fs::write(&event_path, event.to_string()).unwrap();
    ParseArgs {
        event: event_path,
        config: Some(dir.path().join("parser.yaml")),
        ..ParseArgs::default()
    }
}

#[test]
fn sqs_batch_parses_to_array() {
    let dir = workspace();
    let event = json!({"Records": [
        sqs_record(r#"{"id": 1, "sku": "ABC-1"}"#),
        sqs_record(r#"{"id": 2, "sku": "XYZ-22"}"#)
    ]});
    let parsed = run_parse(&args(&dir, event)).unwrap();
    assert_eq!(parsed, json!([{"id": 1, "sku": "ABC-1"}, {"id": 2, "sku": "XYZ-22"}]));
}

#[test]
fn referenced_schema_is_enforced() {
    let dir = workspace();
    let event = json!({"Records": [sqs_record(r#"{"id": 1, "sku": "lowercase"}"#)]});
    assert!(run_parse(&args(&dir, event)).is_err());
}

#[test]
fn deny_policy_from_config_rejects_extra_keys() {
    let dir = workspace();
    let event = json!({"Records": [sqs_record(r#"{"id": 1, "sku": "ABC-1", "note": "x"}"#)]});
    assert!(run_parse(&args(&dir, event.clone())).is_err());

    let mut lenient = args(&dir, event);
    lenient.unknown_fields = Some(evp_schema::UnknownFields::Allow);
    assert_eq!(run_parse(&lenient).unwrap()[0]["note"], "x");
}

#[test]
fn missing_event_file_is_an_error() {
    let dir = workspace();
    let args = ParseArgs {
        event: dir.path().join("absent.json"),
        config: Some(dir.path().join("parser.yaml")),
        ..ParseArgs::default()
    };
    let err = run_parse(&args).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"), "got: {err:#}");
}
