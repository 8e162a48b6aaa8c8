use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sprig_core::schema::{FieldDef, Schema};
use sprig_core::stmt::Value;
use sprig_core::validate::{validate_fields, validate_partial, ErrorCode};

fn data<const N: usize>(pairs: [(&str, Value); N]) -> IndexMap<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn schema() -> Schema {
    Schema::builder("User")
        .field(FieldDef::new("id", "id").auto())
        .field(FieldDef::new("firstName", "string").min(2).max(20))
        .field(FieldDef::new("email", "email").unique())
        .field(FieldDef::enumeration("role", ["admin", "user"]))
        .field(FieldDef::new("age", "int").min(13).optional())
        .field(FieldDef::new("handle", "string").pattern("[a-z]+").optional())
        .field(FieldDef::new("balance", "money").optional())
        .build()
        .unwrap()
}

#[test]
fn enum_violation_lists_allowed_values() {
    let result = validate_fields(
        &schema(),
        &data([
            ("firstName", "Ada".into()),
            ("email", "ada@example.com".into()),
            ("role", "guest".into()),
        ]),
    );

    assert_eq!(result.errors.len(), 1);
    let error = &result.errors["role"];
    assert_eq!(error.code, ErrorCode::Enum);
    assert_eq!(error.message, "Role must be one of: admin, user");
}

#[test]
fn required_fields_and_titles() {
    let result = validate_fields(&schema(), &data([("firstName", "  ".into())]));

    assert_eq!(result.errors["firstName"].code, ErrorCode::Required);
    assert_eq!(result.errors["firstName"].message, "First Name is required");
    assert_eq!(result.errors["email"].code, ErrorCode::Required);
    assert_eq!(result.errors["role"].code, ErrorCode::Required);

    // Auto and optional fields are never required.
    assert!(!result.errors.contains_key("id"));
    assert!(!result.errors.contains_key("age"));
}

#[test]
fn first_failure_wins() {
    let result = validate_fields(
        &schema(),
        &data([
            ("firstName", "A".into()),
            ("email", "not-an-email".into()),
            ("role", "admin".into()),
            ("age", "twelve".into()),
            ("handle", "Has Spaces".into()),
        ]),
    );

    assert_eq!(result.errors["firstName"].code, ErrorCode::MinLength);
    assert_eq!(
        result.errors["firstName"].message,
        "First Name must be at least 2 characters"
    );
    assert_eq!(result.errors["email"].code, ErrorCode::Format);
    assert_eq!(result.errors["email"].message, "Email is not a valid email");
    assert_eq!(result.errors["age"].code, ErrorCode::Format);
    assert_eq!(result.errors["handle"].code, ErrorCode::Pattern);
}

#[test]
fn ranges_and_casting() {
    let result = validate_fields(
        &schema(),
        &data([
            ("firstName", "Ada".into()),
            ("email", "ada@example.com".into()),
            ("role", "user".into()),
            ("age", "12".into()),
            ("balance", "12.34".into()),
        ]),
    );

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors["age"].code, ErrorCode::Range);
    assert_eq!(result.errors["age"].message, "Age must be at least 13");
    assert_eq!(result.data["balance"], Value::I64(1234));
}

#[test]
fn empty_strings_pass_patterns() {
    let result = validate_fields(
        &schema(),
        &data([
            ("firstName", "Ada".into()),
            ("email", "ada@example.com".into()),
            ("role", "user".into()),
            ("handle", "".into()),
        ]),
    );

    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn partial_validation_ignores_absent_fields() {
    let result = validate_partial(&schema(), &data([("age", 30.into())]));
    assert!(result.is_valid());
    assert_eq!(result.data.len(), 1);

    let result = validate_partial(&schema(), &data([("email", "".into())]));
    assert_eq!(result.errors["email"].code, ErrorCode::Required);
}

#[test]
fn field_errors_serialize_uniformly() {
    let result = validate_fields(
        &schema(),
        &data([
            ("firstName", "Ada".into()),
            ("email", "ada@example.com".into()),
            ("role", "guest".into()),
        ]),
    );

    let json = serde_json::to_value(&result.errors["role"]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "error": "ENUM",
            "field": "role",
            "value": "guest",
            "message": "Role must be one of: admin, user",
        })
    );
}
