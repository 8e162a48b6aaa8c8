use pretty_assertions::assert_eq;
use sprig::driver::{Capability, Connection, Operation, Response, ValueSet};
use sprig::stmt::{Aggregate, AggregateFunc, Query};
use sprig::{Db, FieldDef, Schema, Value};
use std::sync::{Arc, Mutex};

/// Answers every query with one fixed result set, the way a server backend
/// would shape it.
#[derive(Debug)]
struct Canned {
    capability: &'static Capability,
    answer: ValueSet,
    sql: Arc<Mutex<Vec<String>>>,
}

impl Canned {
    fn new(capability: &'static Capability, columns: &[&str], rows: Vec<Vec<Value>>) -> Canned {
        Canned {
            capability,
            answer: ValueSet {
                columns: columns.iter().map(|column| column.to_string()).collect(),
                rows,
            },
            sql: Arc::default(),
        }
    }
}

impl Connection for Canned {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    fn exec(&mut self, op: Operation) -> sprig::Result<Response> {
        match op {
            Operation::Query(sql) => {
                self.sql.lock().unwrap().push(sql.sql);
                Ok(Response::values(self.answer.clone()))
            }
            _ => Ok(Response::empty()),
        }
    }
}

fn products() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Product")
            .fields([
                FieldDef::new("id", "int").auto(),
                FieldDef::new("category", "string"),
                FieldDef::new("price", "money"),
            ])
            .build()
            .unwrap(),
    )
}

fn bind(conn: Canned) -> sprig::TableBinding {
    Db::new(conn)
        .binding(products(), "products")
        .create_table(false)
        .bind()
        .unwrap()
}

#[test]
fn postgres_money_sum_is_not_rescaled() {
    let conn = Canned::new(&Capability::POSTGRESQL, &["value"], vec![vec![Value::F64(1234.0)]]);
    let sql = conn.sql.clone();
    let products = bind(conn);

    let sum = products.sum("price", &Default::default()).unwrap();

    assert_eq!(sum, Value::I64(1234));
    assert_eq!(
        sql.lock().unwrap().as_slice(),
        [r#"SELECT CAST(SUM("price") AS DOUBLE PRECISION) AS "value" FROM "products""#]
    );
}

#[test]
fn mysql_decimal_sum_is_not_rescaled() {
    let conn = Canned::new(&Capability::MYSQL, &["value"], vec![vec![Value::from("1234")]]);
    let products = bind(conn);

    assert_eq!(
        products.max("price", &Default::default()).unwrap(),
        Value::I64(1234)
    );
    assert_eq!(
        products.sum("price", &Default::default()).unwrap(),
        Value::I64(1234)
    );
}

#[test]
fn grouped_money_sum_is_not_rescaled() {
    let conn = Canned::new(
        &Capability::POSTGRESQL,
        &["category", "total"],
        vec![
            vec![Value::from("books"), Value::F64(1234.0)],
            vec![Value::from("games"), Value::F64(99.0)],
        ],
    );
    let products = bind(conn);

    let query = Query::new(products.table())
        .group_by(["category"])
        .aggregate(Aggregate::new(AggregateFunc::Sum, Some("price"), "total"));
    let table = products.exec(query).unwrap().into_table().unwrap();

    assert_eq!(table.column("total"), [Value::I64(1234), Value::I64(99)]);
}
