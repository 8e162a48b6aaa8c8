use pretty_assertions::assert_eq;
use sprig::stmt::{Expr, Query};
use sprig::{QueryOptions, Value};
use tests::{row, user, users, TestDb};

#[test]
fn deleted_rows_are_stamped_and_hidden() {
    let test = TestDb::new();
    let users = test
        .binding(users(), "users")
        .soft_delete("deleted_at")
        .bind()
        .unwrap();

    let alice = users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();

    assert_eq!(users.delete(&row([("name", "Alice".into())])).unwrap(), 1);

    assert_eq!(users.count(&Default::default()).unwrap(), 1);
    assert!(users.find(alice.id().cloned()).unwrap().is_none());
    assert_eq!(
        users.all(&QueryOptions::new()).unwrap().column("name"),
        [Value::from("Bob")]
    );

    // Deleting again touches nothing.
    assert_eq!(users.delete(&row([("name", "Alice".into())])).unwrap(), 0);

    // The row is still stored, with the stamp set.
    let raw = test
        .db
        .binding(tests::users(), users.table())
        .create_table(false)
        .bind()
        .unwrap();
    let stored = raw
        .find_by(&row([("name", "Alice".into())]), &QueryOptions::new())
        .unwrap()
        .unwrap();
    assert!(matches!(stored["deleted_at"], Value::DateTime(_)));
}

#[test]
fn updates_skip_deleted_rows() {
    let test = TestDb::new();
    let users = test
        .binding(users(), "users")
        .soft_delete("deleted_at")
        .bind()
        .unwrap();

    users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();
    users.delete(&row([("name", "Bob".into())])).unwrap();

    assert_eq!(users.update_all([("age", 50)]).unwrap().done(), Some(1));
    assert_eq!(users.delete_all().unwrap(), 1);
    assert!(!users.exists(&Default::default()).unwrap());
}

#[test]
fn statements_see_live_rows_only() {
    let test = TestDb::new();
    let users = test
        .binding(users(), "users")
        .soft_delete("deleted_at")
        .bind()
        .unwrap();

    users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();
    users.delete(&row([("name", "Bob".into())])).unwrap();

    let query = Query::new(users.table()).filter(Expr::like("email", "%@example.com"));
    let table = users.exec(query).unwrap().into_table().unwrap();

    assert_eq!(table.column("name"), [Value::from("Alice")]);
}

#[test]
fn soft_delete_column_must_be_an_optional_timestamp() {
    let test = TestDb::new();

    let err = test
        .binding(users(), "users")
        .soft_delete("name")
        .bind()
        .unwrap_err();
    assert!(err.is_invalid_schema());

    let err = test
        .binding(users(), "users")
        .soft_delete("removed_at")
        .bind()
        .unwrap_err();
    assert!(err.is_invalid_schema());
}
