#![cfg(feature = "sqlite")]

use sprig::{ConnectionCache, Db};
use std::time::Duration;

#[test]
fn same_url_shares_one_connection() {
    tests::init_tracing();

    let cache = ConnectionCache::for_databases();

    let db = cache.connect("sqlite::memory:").unwrap();
    let users = db.binding(tests::users(), "users").bind().unwrap();
    users.insert(tests::user("Alice", "alice@example.com")).unwrap();

    // A second in-memory connection would be an empty database.
    let again = cache.connect("sqlite::memory:").unwrap();
    let users = again
        .binding(tests::users(), "users")
        .create_table(false)
        .bind()
        .unwrap();
    assert_eq!(users.count(&Default::default()).unwrap(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn expired_connections_are_reopened() {
    tests::init_tracing();

    let cache: ConnectionCache<Db> = ConnectionCache::for_databases().ttl(Duration::ZERO);

    let db = cache.connect("sqlite::memory:").unwrap();
    db.binding(tests::users(), "users").bind().unwrap();

    let fresh = cache.connect("sqlite::memory:").unwrap();
    let err = fresh
        .binding(tests::users(), "users")
        .create_table(false)
        .bind()
        .and_then(|users| users.count(&Default::default()))
        .unwrap_err();
    assert!(err.is_driver_operation_failed());
}

#[test]
fn unknown_schemes_are_refused() {
    let cache = ConnectionCache::for_databases();

    let err = cache.connect("oracle://localhost/app").unwrap_err();
    assert!(err.is_invalid_connection_url());
    assert!(cache.is_empty());
}
