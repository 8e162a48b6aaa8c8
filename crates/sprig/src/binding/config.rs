use super::TableBinding;
use crate::{Db, Error, Result, Schema};

use sprig_core::ident;
use std::sync::Arc;

/// Per-binding settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    /// Row cap for `all()` when no limit is given.
    pub default_limit: u64,

    /// Largest explicit limit `all()` accepts; larger limits are clamped.
    pub max_limit: u64,

    /// Column stamped instead of deleting rows. Reads skip rows where it is
    /// set.
    pub soft_delete: Option<String>,

    /// Read written rows back with `RETURNING` where the database allows it.
    pub returning: bool,

    /// Run `CREATE TABLE IF NOT EXISTS` when binding.
    pub create_table: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            default_limit: 20,
            max_limit: 100,
            soft_delete: None,
            returning: false,
            create_table: true,
        }
    }
}

/// Configures and creates a [`TableBinding`]. Obtained from [`Db::binding`].
#[derive(Debug)]
pub struct Builder {
    db: Db,
    schema: Arc<Schema>,
    table: String,
    config: BindingConfig,
}

impl Builder {
    pub(crate) fn new(db: Db, schema: Arc<Schema>, table: String) -> Builder {
        Builder {
            db,
            schema,
            table,
            config: BindingConfig::default(),
        }
    }

    pub fn config(mut self, config: BindingConfig) -> Builder {
        self.config = config;
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Builder {
        self.config.default_limit = limit;
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Builder {
        self.config.max_limit = limit;
        self
    }

    pub fn soft_delete(mut self, column: impl Into<String>) -> Builder {
        self.config.soft_delete = Some(column.into());
        self
    }

    pub fn returning(mut self, returning: bool) -> Builder {
        self.config.returning = returning;
        self
    }

    pub fn create_table(mut self, create_table: bool) -> Builder {
        self.config.create_table = create_table;
        self
    }

    /// Validates the binding and, unless disabled, creates the table.
    pub fn bind(self) -> Result<TableBinding> {
        let Builder {
            db,
            schema,
            table,
            config,
        } = self;

        let table = ident::validate_identifier(&table)
            .map_err(|err| err.context(format!("binding schema `{}`", schema.name())))?;

        if table.is_reserved() {
            tracing::warn!(table = %table, "table name is a reserved SQL word");
        }

        for field in schema.fields() {
            if ident::is_reserved_word(&field.name) {
                tracing::warn!(
                    table = %table,
                    column = %field.name,
                    "column name is a reserved SQL word"
                );
            }
        }

        if config.max_limit < config.default_limit {
            return Err(Error::invalid_schema(format!(
                "default limit {} exceeds max limit {}",
                config.default_limit, config.max_limit
            )));
        }

        if let Some(column) = &config.soft_delete {
            match schema.field(column) {
                Some(field) if field.ty.is_temporal() && !field.is_required() => {}
                Some(field) => {
                    return Err(Error::invalid_schema(format!(
                        "soft-delete column `{column}` must be an optional date/time field, found {}",
                        field.ty
                    )))
                }
                None => {
                    return Err(Error::invalid_schema(format!(
                        "soft-delete column `{column}` is not a field of `{}`",
                        schema.name()
                    )))
                }
            }
        }

        // Postgres reports no last-insert id, so RETURNING is the only way to
        // read back database-assigned keys there.
        let flavor = db.flavor();
        let needs_returning = !flavor.reports_last_insert_id()
            && schema.identity().is_some_and(|identity| identity.is_serial());
        let returning = (config.returning || needs_returning)
            && flavor.supports_returning(db.server_version());

        let binding = TableBinding {
            db,
            schema,
            table,
            config,
            returning,
        };

        if binding.config.create_table {
            binding.create_table()?;
        }

        Ok(binding)
    }
}
