use pretty_assertions::assert_eq;
use sprig::{ErrorCode, FieldDef, Schema, Value};
use std::sync::Arc;
use tests::{orders, row, TestDb};

#[test]
fn generated_ulid_round_trips() {
    let test = TestDb::new();
    let orders = test.binding(orders(), "orders").bind().unwrap();

    let order = orders
        .insert(row([
            ("customer", "ann".into()),
            ("status", "open".into()),
            ("amount", 125.into()),
        ]))
        .unwrap();
    assert!(order.is_valid(), "{:?}", order.errors());

    let Some(Value::String(id)) = order.id() else {
        panic!("expected a string id, got {:?}", order.id());
    };
    assert_eq!(id.len(), 26);
    assert!(id.parse::<ulid::Ulid>().is_ok());

    let found = orders.find(id.as_str()).unwrap().unwrap();
    assert_eq!(found.data(), order.data());
}

#[test]
fn caller_supplied_ulid_is_kept() {
    let test = TestDb::new();
    let orders = test.binding(orders(), "orders").bind().unwrap();
    let id = ulid::Ulid::new().to_string();

    let order = orders
        .insert(row([
            ("id", id.as_str().into()),
            ("customer", "ann".into()),
            ("status", "open".into()),
            ("amount", 1.into()),
        ]))
        .unwrap();

    assert_eq!(order.id(), Some(&Value::String(id)));
}

#[test]
fn malformed_ulid_is_rejected() {
    let test = TestDb::new();
    let orders = test.binding(orders(), "orders").bind().unwrap();

    let order = orders
        .insert(row([
            ("id", "not-a-ulid".into()),
            ("customer", "ann".into()),
            ("status", "open".into()),
            ("amount", 1.into()),
        ]))
        .unwrap();

    assert!(order.has_error("id"));
}

#[test]
fn keys_without_auto_must_be_supplied() {
    let test = TestDb::new();
    let schema = Arc::new(
        Schema::builder("Ticket")
            .fields([FieldDef::new("id", "ulid"), FieldDef::new("title", "string")])
            .build()
            .unwrap(),
    );
    let tickets = test.binding(schema, "tickets").bind().unwrap();
    test.log().clear();

    let ticket = tickets.insert([("title", "Broken lamp")]).unwrap();

    assert_eq!(ticket.error_code("id"), Some(ErrorCode::Required));
    assert!(test.log().is_empty());
}
