//! Integration tests for schema files in testdata/schemas.

use reshape_dsl::{Error, SchemaDsl, TransformRegistry};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../testdata")
}

fn read_record(file_name: &str) -> Value {
    let path = testdata_dir().join("records").join(file_name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err));
    serde_json::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse {}: {}", path.display(), err))
}

#[test]
fn order_schema_parses_and_compiles() {
    let path = testdata_dir().join("schemas/order_payload.yaml");
    let definition = SchemaDsl::parse_file(&path).unwrap();

    assert_eq!(definition.name, "order_payload");
    assert!(definition.description.is_some());
    assert_eq!(definition.field_count(), 9);

    let schema = definition
        .compile(&TransformRegistry::with_builtins())
        .unwrap();
    assert_eq!(schema.len(), 5);
}

#[test]
fn order_schema_maps_valid_record() -> anyhow::Result<()> {
    let definition = SchemaDsl::parse_file(&testdata_dir().join("schemas/order_payload.yaml"))?;
    let schema = definition.compile(&TransformRegistry::with_builtins())?;

    let record = schema.map(&read_record("order.json"))?;

    assert_eq!(
        Value::Object(record),
        json!({
            "orderId": 1042,
            "statusLabel": "Shipped",
            "buyer": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com"
            },
            "shipping": {"country": "GB", "city": "London"},
            "createdAt": "2024-03-01T10:30:00.000Z",
            "channel": "web"
        })
    );
    Ok(())
}

#[test]
fn order_schema_reports_every_issue_in_invalid_record() -> anyhow::Result<()> {
    let definition = SchemaDsl::parse_file(&testdata_dir().join("schemas/order_payload.yaml"))?;
    let schema = definition.compile(&TransformRegistry::with_builtins())?;

    let err = schema
        .safe_map(&read_record("order_invalid.json"))
        .unwrap_err();

    let rendered: Vec<String> = err.issues().iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "status: expected one of [0, 1, 2], received 9",
            "customer: expected object, received string",
            "shipping: expected object, received array",
        ]
    );
    Ok(())
}

#[test]
fn unknown_transform_fails_at_compile_time() {
    let definition =
        SchemaDsl::parse_file(&testdata_dir().join("schemas/invalid_transform.yaml")).unwrap();

    let err = definition
        .compile(&TransformRegistry::with_builtins())
        .unwrap_err();

    assert!(matches!(err, Error::UnknownTransform { ref name, .. } if name == "shout"));
}

#[test]
fn custom_transforms_can_be_registered() -> anyhow::Result<()> {
    let mut registry = TransformRegistry::with_builtins();
    registry.register("cents", |value| {
        value
            .as_f64()
            .map_or_else(|| value.clone(), |amount| json!((amount * 100.0).round()))
    });

    let definition = SchemaDsl::parse("name: money\nshape:\n  total: { transform: cents, to: totalCents }\n")?;
    let schema = definition.compile(&registry)?;

    let record = schema.map(&json!({"total": 12.5}))?;
    assert_eq!(Value::Object(record), json!({"totalCents": 1250.0}));
    Ok(())
}

#[test]
fn missing_schema_file_reports_read_error() {
    let err = SchemaDsl::parse_file(&testdata_dir().join("schemas/does_not_exist.yaml"))
        .unwrap_err();

    assert!(err.message.contains("Failed to read file"));
    assert!(err.line.is_none());
}
