use pretty_assertions::assert_eq;
use sprig::stmt::{
    Aggregate, AggregateFunc, Delete, Expr, Insert, OrderBy, Query, Terminal, Update,
};
use sprig::{Output, TableBinding, Value};
use tests::{orders, row, TestDb};

fn seed(test: &TestDb) -> TableBinding {
    let orders = test.binding(orders(), "orders").bind().unwrap();

    let rows = [
        ("ann", "open", 10),
        ("ann", "paid", 20),
        ("ben", "paid", 30),
        ("ben", "paid", 40),
        ("cat", "void", 50),
    ]
    .map(|(customer, status, amount)| {
        row([
            ("customer", customer.into()),
            ("status", status.into()),
            ("amount", amount.into()),
        ])
    });

    let output = orders.exec(Insert::many(orders.table(), rows.to_vec())).unwrap();
    assert_eq!(output.into_table().map(|table| table.len()), Some(5));
    orders
}

#[test]
fn conditions_combine() {
    let test = TestDb::new();
    let orders = seed(&test);

    let query = Query::new(orders.table())
        .filter(
            Expr::eq("status", "paid")
                .and(Expr::gt("amount", 20).or(Expr::eq("customer", "ann"))),
        )
        .order_by(OrderBy::asc("amount"));

    let table = orders.exec(query).unwrap().into_table().unwrap();
    assert_eq!(table.column("amount"), [20, 30, 40].map(Value::from));
}

#[test]
fn operators() {
    let test = TestDb::new();
    let orders = seed(&test);

    let amounts = |expr: Expr| {
        let query = Query::new(orders.table())
            .filter(expr)
            .order_by(OrderBy::asc("amount"));
        orders.exec(query).unwrap().into_table().unwrap().column("amount")
    };

    assert_eq!(amounts(Expr::ne("customer", "ben")), [10, 20, 50].map(Value::from));
    assert_eq!(amounts(Expr::between("amount", 20, 40)), [20, 30, 40].map(Value::from));
    assert_eq!(amounts(Expr::like("status", "v%")), [Value::from(50)]);
    assert_eq!(amounts(Expr::in_list("customer", vec!["cat", "ann"])), [10, 20, 50].map(Value::from));
    assert_eq!(amounts(Expr::eq("status", "open").not()), [20, 30, 40, 50].map(Value::from));

    assert!(amounts(Expr::in_list("customer", Vec::<Value>::new())).is_empty());
    assert_eq!(amounts(Expr::not_in_list("customer", Vec::<Value>::new())).len(), 5);
}

#[test]
fn in_subquery() {
    let test = TestDb::new();
    let orders = seed(&test);

    let big_spenders = Query::new(orders.table())
        .select(["customer"])
        .filter(Expr::ge("amount", 40));

    let query = Query::new(orders.table())
        .filter(Expr::in_subquery("customer", big_spenders))
        .order_by(OrderBy::asc("amount"));

    let table = orders.exec(query).unwrap().into_table().unwrap();
    assert_eq!(table.column("customer"), ["ben", "ben", "cat"].map(Value::from));
}

#[test]
fn terminals() {
    let test = TestDb::new();
    let orders = seed(&test);
    let paid = || Query::new(orders.table()).filter(Expr::eq("status", "paid"));

    let count = orders.exec(paid().terminal(Terminal::Count)).unwrap();
    assert_eq!(count.as_count(), Some(3));

    let exists = orders.exec(paid().terminal(Terminal::Exists)).unwrap();
    assert_eq!(exists.as_exists(), Some(true));

    let one = orders
        .exec(paid().order_by(OrderBy::desc("amount")).terminal(Terminal::One))
        .unwrap()
        .into_record()
        .unwrap();
    assert_eq!(one["amount"], Value::I64(40));

    let none = orders
        .exec(Query::new(orders.table()).filter(Expr::eq("customer", "dan")).terminal(Terminal::One))
        .unwrap();
    assert!(matches!(none, Output::Record(None)));
}

#[test]
fn group_by_with_having() {
    let test = TestDb::new();
    let orders = seed(&test);

    let query = Query::new(orders.table())
        .group_by(["customer"])
        .aggregate(Aggregate::new(AggregateFunc::Count, None, "orders"))
        .aggregate(Aggregate::new(AggregateFunc::Sum, Some("amount"), "total"))
        .having(Expr::gt("total", 40))
        .order_by(OrderBy::asc("customer"));

    let table = orders.exec(query).unwrap().into_table().unwrap();

    assert_eq!(table.column("customer"), ["ben", "cat"].map(Value::from));
    assert_eq!(table.column("orders"), [2, 1].map(Value::from));
    assert_eq!(table.column("total"), [70, 50].map(Value::from));
}

#[test]
fn update_terminals() {
    let test = TestDb::new();
    let orders = seed(&test);

    let update = Update::new(
        orders.table(),
        Expr::eq("customer", "ben"),
        row([("status", "refunded".into())]),
    );
    assert_eq!(orders.exec(update).unwrap().as_count(), Some(2));

    let mut update = Update::new(
        orders.table(),
        Expr::eq("customer", "ann"),
        row([("amount", 5.into())]),
    );
    update.terminal = Terminal::Many;

    let table = orders.exec(update).unwrap().into_table().unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|record| record["amount"] == Value::I64(5)));
}

#[test]
fn invalid_update_is_rejected_without_sql() {
    let test = TestDb::new();
    let orders = seed(&test);
    test.log().clear();

    let update = Update::new(
        orders.table(),
        Expr::eq("customer", "ann"),
        row([("amount", "lots".into())]),
    );
    let output = orders.exec(update).unwrap();

    let Output::Rejected(records) = &output else {
        panic!("expected a rejection, got {output:?}");
    };
    assert!(records[0].has_error("amount"));
    assert!(test.log().is_empty());
}

#[test]
fn delete_returning_rows() {
    let test = TestDb::new();
    let orders = seed(&test);

    let mut delete = Delete::new(orders.table(), Expr::eq("status", "paid"));
    delete.terminal = Terminal::Many;

    let deleted = orders.exec(delete).unwrap().into_table().unwrap();
    assert_eq!(deleted.len(), 3);
    assert_eq!(orders.count(&Default::default()).unwrap(), 2);
}

#[test]
fn statements_for_other_tables_are_refused() {
    let test = TestDb::new();
    let orders = seed(&test);

    let err = orders.exec(Query::new("users")).unwrap_err();
    assert!(err.is_invalid_statement());
}
