use pretty_assertions::assert_eq;
use sprig::driver::Transaction;
use sprig::{err, Outcome};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tests::{user, users, TestDb};

#[test]
fn error_rolls_back() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let result: sprig::Result<()> = test.db.transaction(|_| {
        let alice = users.insert(user("Alice", "alice@example.com"))?;
        assert!(alice.is_valid());
        Err(err!("changed my mind"))
    });

    assert_eq!(result.unwrap_err().to_string(), "changed my mind");
    assert_eq!(users.count(&Default::default()).unwrap(), 0);
    assert_eq!(
        test.log().transactions(),
        [
            Transaction::Start,
            Transaction::Savepoint(1),
            Transaction::ReleaseSavepoint(1),
            Transaction::Rollback,
        ]
    );
}

#[test]
#[allow(unreachable_code)]
fn panic_rolls_back_and_resumes() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let panicked = catch_unwind(AssertUnwindSafe(|| {
        let _ = test.db.transaction(|_| {
            users.insert(user("Alice", "alice@example.com"))?;
            panic!("boom");
            Ok(())
        });
    }));

    assert!(panicked.is_err());
    assert!(!test.db.in_transaction());
    assert_eq!(users.count(&Default::default()).unwrap(), 0);
}

#[test]
fn nested_calls_share_one_transaction() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    test.db
        .transaction(|db| {
            users.insert(user("Alice", "alice@example.com"))?;
            db.transaction(|_| {
                users.insert(user("Bob", "bob@example.com"))?;
                Ok(())
            })
        })
        .unwrap();

    let transactions = test.log().transactions();
    assert_eq!(transactions.first(), Some(&Transaction::Start));
    assert_eq!(transactions.last(), Some(&Transaction::Commit));
    assert_eq!(
        transactions
            .iter()
            .filter(|op| matches!(op, Transaction::Start | Transaction::Commit))
            .count(),
        2
    );
    assert_eq!(users.count(&Default::default()).unwrap(), 2);
}

#[test]
fn inner_error_rolls_back_everything() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();

    let result = test.db.transaction(|db| {
        users.insert(user("Alice", "alice@example.com"))?;
        db.transaction(|_| {
            users
                .insert_many([user("Mallory", "nope")])
                .and_then(Outcome::into_result)
        })
    });

    assert!(result.unwrap_err().is_validation_failed());
    assert_eq!(users.count(&Default::default()).unwrap(), 0);
}

#[test]
fn batch_insert_runs_in_a_transaction() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    users
        .insert_many([
            user("Alice", "alice@example.com"),
            user("Bob", "bob@example.com"),
        ])
        .unwrap();

    assert_eq!(
        test.log().transactions(),
        [Transaction::Start, Transaction::Commit]
    );
    assert_eq!(
        test.log()
            .sql()
            .iter()
            .filter(|sql| sql.starts_with("INSERT"))
            .count(),
        1
    );
}

#[test]
fn unique_violation_leaves_the_transaction_usable() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    test.log().clear();

    test.db
        .transaction(|_| {
            users.insert(user("Alice", "alice@example.com"))?;

            let dup = users.insert(user("Alicia", "alice@example.com"))?;
            assert!(dup.has_error("email"));

            users.insert(user("Bob", "bob@example.com"))?;
            Ok(())
        })
        .unwrap();

    assert!(test
        .log()
        .transactions()
        .contains(&Transaction::RollbackToSavepoint(2)));
    assert_eq!(users.count(&Default::default()).unwrap(), 2);
}

#[test]
fn rejected_update_inside_a_transaction_keeps_earlier_writes() {
    let test = TestDb::new();
    let users = test.binding(users(), "users").bind().unwrap();
    users.insert(user("Alice", "alice@example.com")).unwrap();

    test.db
        .transaction(|_| {
            users.insert(user("Bob", "bob@example.com"))?;

            let outcome = users.update(
                &tests::row([("name", "Bob".into())]),
                [("email", "alice@example.com")],
            )?;
            assert!(outcome.rejected()[0].has_error("email"));
            Ok(())
        })
        .unwrap();

    assert_eq!(users.count(&Default::default()).unwrap(), 2);
}
