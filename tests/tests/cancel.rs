use sprig::{CancelToken, QueryOptions};
use tests::{user, users, TestDb};

#[test]
fn cancelled_token_stops_dispatch() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();

    let token = CancelToken::new();
    let db = test.db.with_cancel_token(token.clone());
    let cancellable = db.binding(tests::users(), users.table()).create_table(false).bind().unwrap();

    assert_eq!(cancellable.count(&Default::default()).unwrap(), 1);

    token.cancel();
    test.log().clear();

    let err = cancellable.all(&QueryOptions::new()).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.code(), "CANCELLED");
    assert!(test.log().is_empty());

    // Other handles on the same connection are unaffected.
    assert_eq!(users.count(&Default::default()).unwrap(), 1);
}

#[test]
fn cancelling_inside_a_transaction_rolls_back() {
    let test = TestDb::new();
    let plain = test.binding(users(), "users").bind().unwrap();

    let token = CancelToken::new();
    let db = test.db.with_cancel_token(token.clone());
    let users = db.binding(tests::users(), plain.table()).create_table(false).bind().unwrap();

    let result = db.transaction(|_| {
        users.insert(user("Alice", "alice@example.com"))?;
        token.cancel();
        users.insert(user("Bob", "bob@example.com"))?;
        Ok(())
    });

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(plain.count(&Default::default()).unwrap(), 0);
}
