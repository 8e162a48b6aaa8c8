use sprig::{ErrorCode, Value};
use tests::{row, user, users, TestDb};

#[test]
fn duplicate_insert_reports_the_column() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let first = users.insert(user("Alice", "alice@example.com")).unwrap();
    assert!(first.is_valid());

    let second = users.insert(user("Alicia", "alice@example.com")).unwrap();

    assert!(!second.is_valid());
    assert_eq!(second.error_code("email"), Some(ErrorCode::Unique));
    assert_eq!(second.errors()["email"].value, Some(Value::from("alice@example.com")));
    assert_eq!(second["name"], Value::from("Alicia"));
    assert_eq!(users.count(&Default::default()).unwrap(), 1);
}

#[test]
fn duplicate_in_batch_fails_the_whole_batch() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();

    let err = users
        .insert_many([
            user("Bob", "bob@example.com"),
            user("Alicia", "alice@example.com"),
        ])
        .unwrap_err();

    assert!(err.is_validation_failed());
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "email");
    assert_eq!(errors[0].code, ErrorCode::Unique);
    assert_eq!(errors[0].value, Some(Value::from("alice@example.com")));

    assert_eq!(users.count(&Default::default()).unwrap(), 1);
}

#[test]
fn repeated_value_within_a_batch_is_reported() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let err = users
        .insert_many([
            user("Carol", "carol@example.com"),
            user("Dan", "dan@example.com"),
            user("Caroline", "carol@example.com"),
        ])
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(errors[0].field, "email");
    assert_eq!(errors[0].value, Some(Value::from("carol@example.com")));
    assert!(!users.exists(&Default::default()).unwrap());
}

#[test]
fn update_into_a_taken_value_is_rejected() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();

    let outcome = users
        .update(&row([("name", "Bob".into())]), [("email", "alice@example.com")])
        .unwrap();

    let [rejected] = outcome.rejected() else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert_eq!(rejected.error_code("email"), Some(ErrorCode::Unique));
}
