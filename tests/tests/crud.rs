use pretty_assertions::assert_eq;
use sprig::{QueryOptions, Value};
use tests::{row, user, users, TestDb};

#[test]
fn insert_returns_the_stored_row() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let alice = users.insert(user("Alice", "alice@example.com")).unwrap();

    assert!(alice.is_valid(), "{:?}", alice.errors());
    assert!(matches!(alice.id(), Some(Value::I64(_))));
    assert_eq!(alice["name"], Value::from("Alice"));
    assert_eq!(alice["role"], Value::from("user"));
    assert_eq!(alice["age"], Value::Null);

    let found = users.find(alice.id().cloned()).unwrap().unwrap();
    assert_eq!(found.data(), alice.data());
}

#[test]
fn keys_follow_insertion_order() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let table = users
        .insert_many([
            user("Alice", "alice@example.com"),
            user("Bob", "bob@example.com"),
            user("Carol", "carol@example.com"),
        ])
        .unwrap()
        .done()
        .unwrap();

    assert_eq!(
        table.column("name"),
        ["Alice", "Bob", "Carol"].map(Value::from)
    );

    let ids: Vec<i64> = table
        .iter()
        .map(|record| match record.id() {
            Some(Value::I64(id)) => *id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect();
    assert_eq!(ids, [ids[0], ids[0] + 1, ids[0] + 2]);
}

#[test]
fn update_and_delete_by_filter() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();

    let changed = users
        .update(&row([("name", "Bob".into())]), [("age", 41)])
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(changed, 1);

    let bob = users
        .find_by(&row([("name", "Bob".into())]), &QueryOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(bob["age"], Value::I64(41));

    assert_eq!(users.delete(&row([("name", "Alice".into())])).unwrap(), 1);
    assert_eq!(users.count(&Default::default()).unwrap(), 1);
}

#[test]
fn invalid_input_comes_back_with_errors() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    let record = users
        .insert(row([
            ("name", "Mallory".into()),
            ("email", "not-an-email".into()),
            ("role", "guest".into()),
        ]))
        .unwrap();

    assert!(!record.is_valid());
    assert!(record.has_error("email"));
    assert_eq!(record.error_code("role").map(|code| code.as_str()), Some("ENUM"));
    assert!(record.error("role").unwrap().contains("admin, user"));
    assert!(test.log().is_empty());
}

#[test]
fn updates_validate_only_supplied_fields() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();
    test.log().clear();

    let outcome = users
        .update(&row([("name", "Alice".into())]), [("age", -3)])
        .unwrap();

    let [rejected] = outcome.rejected() else {
        panic!("expected one rejected record, got {outcome:?}");
    };
    assert!(rejected.has_error("age"));
    assert!(!rejected.has_error("email"));
    assert!(test.log().is_empty());
}

#[test]
fn changing_the_primary_key_is_refused() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let err = users
        .update(&row([("name", "Alice".into())]), [("id", 7)])
        .unwrap_err();
    assert!(err.is_invalid_statement());
}
