use sprig::stmt::{Delete, Expr, Filter, Update};
use sprig::QueryOptions;
use tests::{row, user, users, TestDb};

#[test]
fn empty_filters_never_reach_the_database() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();
    test.log().clear();

    let err = users.update(&Default::default(), [("age", 30)]).unwrap_err();
    assert!(err.is_invalid_statement());
    assert!(err.to_string().contains("update_all"));

    let err = users.delete(&Default::default()).unwrap_err();
    assert!(err.is_invalid_statement());

    let err = users
        .exec(Update::new(users.table(), Expr::And(vec![]), row([("age", 30.into())])))
        .unwrap_err();
    assert!(err.is_invalid_statement());

    let err = users
        .exec(Delete::new(users.table(), Filter::Expr(Expr::And(vec![]))))
        .unwrap_err();
    assert!(err.is_invalid_statement());

    assert!(test.log().is_empty(), "{:?}", test.log().sql());
}

#[test]
fn explicit_all_variants_touch_every_row() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();
    users.insert(user("Bob", "bob@example.com")).unwrap();

    assert_eq!(users.update_all([("age", 30)]).unwrap().done(), Some(2));
    assert_eq!(users.delete_all().unwrap(), 2);
    assert!(users.all(&QueryOptions::new()).unwrap().is_empty());
}

#[test]
fn hostile_names_are_refused_before_sql() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    let err = users.sum("amount; DROP TABLE users", &Default::default()).unwrap_err();
    assert!(err.is_invalid_identifier());

    let err = QueryOptions::new().asc("name --").unwrap_err();
    assert!(err.is_invalid_identifier());

    let err = test.db.binding(tests::users(), "users\"").bind().unwrap_err();
    assert!(err.is_invalid_identifier());

    assert!(test.log().is_empty());
}
