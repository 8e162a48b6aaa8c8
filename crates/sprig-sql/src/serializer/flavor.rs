use sprig_core::{
    driver::{Backend, Capability, Version},
    schema::{Field, FieldType},
};

/// The SQL dialect a statement is serialized for. Chosen once, when a table
/// is bound, from the connection's capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl Flavor {
    pub fn from_backend(backend: Backend) -> Flavor {
        match backend {
            Backend::Sqlite => Flavor::Sqlite,
            Backend::Postgresql => Flavor::Postgresql,
            Backend::Mysql => Flavor::Mysql,
        }
    }

    pub fn capability(self) -> &'static Capability {
        match self {
            Flavor::Sqlite => &Capability::SQLITE,
            Flavor::Postgresql => &Capability::POSTGRESQL,
            Flavor::Mysql => &Capability::MYSQL,
        }
    }

    /// Text of the `n`th (1-based) positional parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Flavor::Sqlite | Flavor::Mysql => "?".to_string(),
            Flavor::Postgresql => format!("${n}"),
        }
    }

    /// Whether `INSERT … RETURNING` can be used against a server reporting
    /// `version`.
    pub fn supports_returning(self, version: Option<Version>) -> bool {
        self.capability().supports_returning(version)
    }

    /// Whether the driver reports the key assigned to the last inserted row.
    /// Postgres only hands generated keys back through `RETURNING`.
    pub fn reports_last_insert_id(self) -> bool {
        !matches!(self, Flavor::Postgresql)
    }

    /// Column definition for a database-generated serial key of type `ty`,
    /// or `None` when the type is not generated by the database.
    pub fn auto_increment_clause(self, ty: FieldType) -> Option<&'static str> {
        Some(match (self, ty) {
            (Flavor::Sqlite, FieldType::Int | FieldType::BigInt) => "INTEGER PRIMARY KEY",
            (Flavor::Postgresql, FieldType::Int) => "SERIAL PRIMARY KEY",
            (Flavor::Postgresql, FieldType::BigInt) => "BIGSERIAL PRIMARY KEY",
            (Flavor::Mysql, FieldType::Int) => "INT AUTO_INCREMENT PRIMARY KEY",
            (Flavor::Mysql, FieldType::BigInt) => "BIGINT AUTO_INCREMENT PRIMARY KEY",
            _ => return None,
        })
    }

    /// Storage type for `field`.
    pub fn column_type(self, field: &Field) -> String {
        use FieldType::*;

        let ty = match (self, field.ty) {
            (Flavor::Sqlite, Int | BigInt | Money | Bool) => "INTEGER",
            (_, Int) => "INTEGER",
            (_, BigInt | Money) => "BIGINT",
            (Flavor::Sqlite, Float) => "REAL",
            (Flavor::Postgresql, Float) => "DOUBLE PRECISION",
            (Flavor::Mysql, Float) => "DOUBLE",
            (_, Bool) => "BOOLEAN",
            (Flavor::Sqlite, DateTime | Date | Time | Json) => "TEXT",
            (Flavor::Postgresql, DateTime) => "TIMESTAMP",
            (Flavor::Mysql, DateTime) => "DATETIME",
            (_, Date) => "DATE",
            (_, Time) => "TIME",
            (Flavor::Postgresql, Json) => "JSONB",
            (Flavor::Mysql, Json) => "JSON",
            (Flavor::Mysql, Uuid) => "VARCHAR(36)",
            (Flavor::Mysql, Ulid) => "VARCHAR(26)",
            (Flavor::Mysql, _) => return mysql_string_type(field),
            _ => "TEXT",
        };

        ty.to_string()
    }

    /// Statement opening a transaction.
    pub fn begin(self) -> &'static str {
        match self {
            Flavor::Mysql => "START TRANSACTION",
            Flavor::Sqlite | Flavor::Postgresql => "BEGIN",
        }
    }

    pub(super) fn quote(self) -> char {
        match self {
            Flavor::Mysql => '`',
            Flavor::Sqlite | Flavor::Postgresql => '"',
        }
    }

    /// Function measuring string length in characters.
    pub(super) fn length_fn(self) -> &'static str {
        match self {
            Flavor::Mysql => "CHAR_LENGTH",
            Flavor::Sqlite | Flavor::Postgresql => "LENGTH",
        }
    }
}

/// MySQL cannot index or constrain `TEXT` without a length, so bounded,
/// unique and enum columns become `VARCHAR`.
fn mysql_string_type(field: &Field) -> String {
    let constraints = &field.constraints;

    if let Some(max) = constraints.max_length {
        return format!("VARCHAR({max})");
    }

    if field.ty == FieldType::Enum {
        let longest = constraints
            .enum_values
            .iter()
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(1);
        return format!("VARCHAR({})", longest.max(1));
    }

    if constraints.unique || field.primary_key {
        return "VARCHAR(255)".to_string();
    }

    "TEXT".to_string()
}
