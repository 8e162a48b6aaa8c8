use pretty_assertions::assert_eq;
use sprig_core::schema::{FieldDef, Schema};
use sprig_core::stmt::Value;
use sprig_core::validate::ErrorCode;
use sprig_core::Record;

use std::sync::Arc;

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Signup")
            .field(FieldDef::new("email", "email"))
            .field(FieldDef::new("password", "string").min(8))
            .field(FieldDef::new("errors", "int").optional())
            .build()
            .unwrap(),
    )
}

#[test]
fn unknown_keys_are_dropped() {
    let record = Record::new(
        schema(),
        [("email", Value::from("a@example.com")), ("is_admin", Value::from(true))],
    );

    assert_eq!(record.keys().collect::<Vec<_>>(), ["email"]);
    assert!(record.get("is_admin").is_none());
    assert_eq!(record["is_admin"], Value::Null);
}

#[test]
fn validate_returns_a_new_record() {
    let r1 = Record::new(schema(), [("email", "nope")]);
    let r2 = r1.validate();

    assert!(r1.errors().is_empty());
    assert!(!r1.is_validated());
    assert!(!r1.is_valid());

    assert!(!r2.is_valid());
    assert_eq!(r2.error_code("email"), Some(ErrorCode::Format));
    assert_eq!(r2.error_code("password"), Some(ErrorCode::Required));
}

#[test]
fn validation_is_idempotent() {
    let record = Record::new(schema(), [("email", "a@example.com"), ("password", "short")]);

    let once = record.validate();
    let twice = once.validate();

    assert_eq!(once.errors(), twice.errors());
    assert_eq!(once.data(), twice.data());
}

#[test]
fn with_error_merges_cross_field_checks() {
    let record = Record::new(
        schema(),
        [("email", "a@example.com"), ("password", "long enough")],
    )
    .validate();
    assert!(record.is_valid());

    let rejected = record.with_error("password", "Passwords do not match");

    assert!(record.is_valid());
    assert!(!rejected.is_valid());
    assert_eq!(rejected.error("password"), Some("Passwords do not match"));
    assert_eq!(rejected.error_code("password"), Some(ErrorCode::Custom));

    // Revalidating keeps caller-merged errors.
    assert!(rejected.validate().has_error("password"));
}

#[test]
fn data_named_like_methods_does_not_collide() {
    let record = Record::new(
        schema(),
        [
            ("email", Value::from("a@example.com")),
            ("password", Value::from("long enough")),
            ("errors", Value::from("3")),
        ],
    )
    .validate();

    assert_eq!(record["errors"], Value::I64(3));
    assert!(record.errors().is_empty());
}

#[test]
fn update_revalidates() {
    let record = Record::new(schema(), [("email", "a@example.com")]).validate();
    assert!(record.has_error("password"));

    let fixed = record.update([("password", "long enough")]);
    assert!(fixed.is_valid());
    assert!(record.has_error("password"));
}

#[test]
fn ensure_valid_escalates() {
    let err = Record::new(schema(), [("email", "nope")])
        .validate()
        .ensure_valid()
        .unwrap_err();

    assert!(err.is_validation_failed());
    assert_eq!(err.code(), "VALIDATION");

    let fields: Vec<&str> = err
        .field_errors()
        .unwrap()
        .iter()
        .map(|error| error.field.as_str())
        .collect();
    assert_eq!(fields, ["email", "password"]);
}

#[test]
fn error_list_is_sorted() {
    let record = Record::new(schema(), Vec::<(String, Value)>::new()).validate();
    let fields: Vec<String> = record
        .error_list()
        .into_iter()
        .map(|error| error.field)
        .collect();
    assert_eq!(fields, ["email", "password"]);
}

#[test]
fn serializes_as_data() {
    let record = Record::new(schema(), [("email", "a@example.com")]);
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        serde_json::json!({ "email": "a@example.com" })
    );
}
