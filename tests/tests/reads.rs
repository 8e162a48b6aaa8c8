use pretty_assertions::assert_eq;
use sprig::{Direction, QueryOptions, TableBinding, Value};
use tests::{orders, row, TestDb};

fn seed(test: &TestDb, n: usize) -> TableBinding {
    let orders = test.binding(orders(), "orders").bind().unwrap();

    let rows = (0..n).map(|i| {
        row([
            ("customer", if i % 2 == 0 { "ann" } else { "ben" }.into()),
            ("status", if i % 3 == 0 { "open" } else { "paid" }.into()),
            ("amount", (i as i64 * 10).into()),
        ])
    });

    orders.insert_many(rows).unwrap().done().unwrap();
    orders
}

#[test]
fn all_applies_the_default_limit() {
    let test = TestDb::new();
    let orders = seed(&test, 25);

    assert_eq!(orders.all(&QueryOptions::new()).unwrap().len(), 20);
    assert_eq!(orders.all(&QueryOptions::new().limit(5)).unwrap().len(), 5);
    assert_eq!(orders.all(&QueryOptions::new().no_limit()).unwrap().len(), 25);
}

#[test]
fn explicit_limits_are_clamped() {
    let test = TestDb::new();
    let orders = test
        .binding(tests::orders(), "orders")
        .default_limit(2)
        .max_limit(3)
        .bind()
        .unwrap();

    for amount in 0..5 {
        orders
            .insert([
                ("customer", Value::from("ann")),
                ("status", "open".into()),
                ("amount", amount.into()),
            ])
            .unwrap();
    }

    assert_eq!(orders.all(&QueryOptions::new()).unwrap().len(), 2);
    assert_eq!(orders.all(&QueryOptions::new().limit(50)).unwrap().len(), 3);
}

#[test]
fn ordering_and_projection() {
    let test = TestDb::new();
    let orders = seed(&test, 6);

    let options = QueryOptions::new()
        .desc("amount")
        .and_then(|options| options.select(["customer", "amount"]))
        .unwrap()
        .limit(3);
    let table = orders.all(&options).unwrap();

    assert_eq!(table.column("amount"), [50, 40, 30].map(Value::from));
    assert_eq!(table[0].get("status"), None);
}

#[test]
fn filter_matches_every_pair() {
    let test = TestDb::new();
    let orders = seed(&test, 12);

    let table = orders
        .filter(
            &row([("customer", "ann".into()), ("status", "open".into())]),
            &QueryOptions::new().asc("amount").unwrap(),
        )
        .unwrap();

    assert_eq!(table.column("amount"), [0, 60].map(Value::from));
}

#[test]
fn first_and_last() {
    let test = TestDb::new();
    let orders = seed(&test, 4);

    let by_amount = QueryOptions::new().order_by("amount", Direction::Asc).unwrap();

    let first = orders.first(&by_amount).unwrap().unwrap();
    let last = orders.last(&by_amount).unwrap().unwrap();
    assert_eq!(first["amount"], Value::I64(0));
    assert_eq!(last["amount"], Value::I64(30));

    let top = orders.last_n(2, &by_amount).unwrap();
    assert_eq!(top.column("amount"), [30, 20].map(Value::from));

    let bottom = orders.first_n(2, &by_amount).unwrap();
    assert_eq!(bottom.column("amount"), [0, 10].map(Value::from));
}

#[test]
fn first_on_an_empty_table_is_none() {
    let test = TestDb::new();
    let orders = test.binding(orders(), "orders").bind().unwrap();

    assert!(orders.first(&QueryOptions::new()).unwrap().is_none());
    assert!(orders.last(&QueryOptions::new()).unwrap().is_none());
}

#[test]
fn exists_and_find_by() {
    let test = TestDb::new();
    let orders = seed(&test, 3);

    assert!(orders.exists(&row([("customer", "ben".into())])).unwrap());
    assert!(!orders.exists(&row([("customer", "cat".into())])).unwrap());

    let found = orders
        .find_by(&row([("customer", "ann".into())]), &QueryOptions::new().desc("amount").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(found["amount"], Value::I64(20));

    assert!(orders
        .find_by(&row([("customer", "cat".into())]), &QueryOptions::new())
        .unwrap()
        .is_none());
}

#[test]
fn null_filter_values_match_missing_columns() {
    let test = TestDb::new();
    let users = test.binding(tests::users(), "users").bind().unwrap();
    users.insert(tests::user("Alice", "alice@example.com")).unwrap();
    users
        .insert([
            ("name", Value::from("Bob")),
            ("email", "bob@example.com".into()),
            ("age", 30.into()),
        ])
        .unwrap();

    let ageless = users
        .filter(&row([("age", Value::Null)]), &QueryOptions::new())
        .unwrap();
    assert_eq!(ageless.column("name"), [Value::from("Alice")]);
}

#[test]
fn aggregates() {
    let test = TestDb::new();
    let orders = seed(&test, 4);
    let none = row([("customer", "cat".into())]);

    assert_eq!(orders.count(&Default::default()).unwrap(), 4);
    assert_eq!(orders.sum("amount", &Default::default()).unwrap(), Value::I64(60));
    assert_eq!(orders.avg("amount", &Default::default()).unwrap(), Value::F64(15.0));
    assert_eq!(orders.min("amount", &Default::default()).unwrap(), Value::I64(0));
    assert_eq!(orders.max("amount", &row([("customer", "ann".into())])).unwrap(), Value::I64(20));

    assert_eq!(orders.count(&none).unwrap(), 0);
    assert_eq!(orders.sum("amount", &none).unwrap(), Value::Null);
    assert_eq!(orders.avg("amount", &none).unwrap(), Value::Null);
    assert_eq!(orders.max("amount", &none).unwrap(), Value::Null);
}

#[test]
fn count_column_skips_nulls() {
    let test = TestDb::new();
    let users = test.binding(tests::users(), "users").bind().unwrap();
    users.insert(tests::user("Alice", "alice@example.com")).unwrap();
    users
        .insert([
            ("name", Value::from("Bob")),
            ("email", "bob@example.com".into()),
            ("age", 30.into()),
        ])
        .unwrap();

    assert_eq!(users.count_column("age", &Default::default()).unwrap(), 1);
}
