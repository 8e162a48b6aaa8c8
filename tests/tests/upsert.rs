use pretty_assertions::assert_eq;
use sprig::stmt::Insert;
use sprig::{Output, Value};
use tests::{row, users, TestDb};

#[test]
fn upsert_inserts_then_overwrites() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let first = users
        .upsert(
            row([("name", "Alice".into()), ("email", "alice@example.com".into())]),
            &["email"],
        )
        .unwrap();
    assert!(first.is_valid(), "{:?}", first.errors());

    let second = users
        .upsert(
            row([
                ("name", "Alice Smith".into()),
                ("email", "alice@example.com".into()),
                ("age", 36.into()),
            ]),
            &["email"],
        )
        .unwrap();

    assert_eq!(second.id(), first.id());
    assert_eq!(second["name"], Value::from("Alice Smith"));
    assert_eq!(second["age"], Value::I64(36));
    assert_eq!(users.count(&Default::default()).unwrap(), 1);
}

#[test]
fn upsert_validates_first() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    let record = users
        .upsert(row([("name", "Alice".into()), ("email", "nope".into())]), &["email"])
        .unwrap();

    assert!(record.has_error("email"));
    assert!(test.log().is_empty());
}

#[test]
fn conflict_columns_must_be_fields() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let err = users
        .upsert(
            row([("name", "Alice".into()), ("email", "alice@example.com".into())]),
            &["handle"],
        )
        .unwrap_err();
    assert!(err.is_invalid_statement());
}

#[test]
fn upsert_statement() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    for name in ["Alice", "Alicia"] {
        let insert = Insert::new(
            users.table(),
            row([("name", name.into()), ("email", "alice@example.com".into())]),
        )
        .on_conflict(["email"]);

        let output = users.exec(insert).unwrap();
        assert!(matches!(output, Output::Record(Some(_))), "{output:?}");
    }

    let stored = users.all(&Default::default()).unwrap();
    assert_eq!(stored.column("name"), [Value::from("Alicia")]);
}
