mod logging;
pub use logging::{LoggingConnection, OpLog};

mod setup;
pub use setup::{init_tracing, TestDb};

use sprig::{FieldDef, Schema, Value};
use std::sync::Arc;

/// `users`: serial key, unique email, an enum role with a default and a
/// soft-delete column.
pub fn users() -> Arc<Schema> {
    Arc::new(
        Schema::builder("User")
            .fields([
                FieldDef::new("id", "int").auto(),
                FieldDef::new("name", "string").max(50),
                FieldDef::new("email", "email").unique(),
                FieldDef::new("age", "int").min(0).optional(),
                FieldDef::enumeration("role", ["admin", "user"]).default_value("user"),
                FieldDef::new("deleted_at", "datetime").optional(),
            ])
            .build()
            .unwrap(),
    )
}

/// `orders`: client-generated ULID key and an amount to aggregate over.
pub fn orders() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Order")
            .fields([
                FieldDef::new("id", "ulid").auto(),
                FieldDef::new("customer", "string"),
                FieldDef::new("status", "string"),
                FieldDef::new("amount", "int"),
            ])
            .build()
            .unwrap(),
    )
}

/// Builds an input row from `(field, value)` pairs.
pub fn row<const N: usize>(pairs: [(&str, Value); N]) -> sprig::stmt::Assignments {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// A valid `users` row.
pub fn user(name: &str, email: &str) -> sprig::stmt::Assignments {
    row([("name", name.into()), ("email", email.into())])
}
