use super::{
    Constraints, Field, FieldDef, FieldType, IdStrategy, Identity, Number, Pattern, Range, Schema,
};
use crate::{ident, validate, Error, Result};

use indexmap::IndexMap;

pub(super) fn schema(name: String, defs: Vec<FieldDef>) -> Result<Schema> {
    if name.is_empty() {
        return Err(Error::invalid_schema("schema name is empty"));
    }

    let explicit_primary_key = defs.iter().any(|def| def.primary_key);
    let mut fields = IndexMap::with_capacity(defs.len());
    let mut identity = None;

    for def in defs {
        let field = field(def, explicit_primary_key)
            .map_err(|err| err.context(format!("schema `{name}`")))?;

        if field.primary_key {
            if let Some(Identity { field: existing, .. }) = &identity {
                return Err(Error::invalid_schema(format!(
                    "schema `{name}` declares more than one primary key (`{existing}`, `{}`)",
                    field.name
                )));
            }

            let strategy = IdStrategy::from_type(field.ty).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "primary key `{}` has type {}; expected uuid, ulid, int or bigint",
                    field.name, field.ty
                ))
            })?;

            identity = Some(Identity {
                field: field.name.clone(),
                strategy,
                auto: field.auto,
            });
        }

        if fields.contains_key(&field.name) {
            return Err(Error::invalid_schema(format!(
                "schema `{name}` declares field `{}` twice",
                field.name
            )));
        }

        fields.insert(field.name.clone(), field);
    }

    Ok(Schema {
        name,
        fields,
        identity,
    })
}

fn field(def: FieldDef, explicit_primary_key: bool) -> Result<Field> {
    let invalid = |message: String| Error::invalid_schema(format!("field `{}`: {message}", def.name));

    if !ident::is_valid_identifier(&def.name) {
        return Err(invalid("name is not a valid identifier".into()));
    }

    let ty = FieldType::parse(&def.ty).map_err(|err| err.context(format!("field `{}`", def.name)))?;

    match ty {
        FieldType::Enum if def.values.is_empty() => {
            return Err(invalid("enum declares no values".into()));
        }
        FieldType::Enum => {}
        _ if !def.values.is_empty() => {
            return Err(invalid(format!("values given for non-enum type {ty}")));
        }
        _ => {}
    }

    if def.auto {
        if def.required == Some(true) {
            return Err(invalid("auto and required cannot be combined".into()));
        }

        if IdStrategy::from_type(ty).is_none() && !ty.is_temporal() {
            return Err(invalid(format!("type {ty} cannot be auto-generated")));
        }
    }

    let mut constraints = Constraints {
        unique: def.unique,
        enum_values: def.values.clone(),
        ..Constraints::default()
    };

    bounds(&def, ty, &mut constraints).map_err(invalid)?;

    if let Some(source) = &def.pattern {
        if !ty.has_length() {
            return Err(invalid(format!("pattern given for non-text type {ty}")));
        }

        let pattern = Pattern::compile(source)
            .map_err(|err| invalid(format!("pattern does not compile: {err}")))?;
        constraints.pattern = Some(pattern);
    }

    let default = match &def.default {
        Some(value) => Some(
            validate::cast(ty, value)
                .ok_or_else(|| invalid(format!("default `{value}` is not a valid {ty}")))?,
        ),
        None => None,
    };

    let primary_key = def.primary_key || (!explicit_primary_key && def.name == "id");

    // Only `auto` keys are filled in on insert; any other key is input.
    constraints.required =
        def.required.unwrap_or(!def.nullable && !def.auto && default.is_none());

    Ok(Field {
        name: def.name,
        ty,
        constraints,
        nullable: def.nullable,
        auto: def.auto,
        primary_key,
        read_only: def.read_only,
        default,
        metadata: def.metadata,
    })
}

fn bounds(
    def: &FieldDef,
    ty: FieldType,
    constraints: &mut Constraints,
) -> core::result::Result<(), String> {
    if def.min.is_none() && def.max.is_none() {
        return Ok(());
    }

    if ty.has_length() {
        let length = |bound: Option<Number>| -> core::result::Result<Option<usize>, String> {
            match bound {
                None => Ok(None),
                Some(n) => match n.as_i64() {
                    Some(v) if v >= 0 => Ok(Some(v as usize)),
                    _ => Err(format!("length bound must be a non-negative integer, got {n:?}")),
                },
            }
        };

        constraints.min_length = length(def.min)?;
        constraints.max_length = length(def.max)?;

        if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
            if min > max {
                return Err(format!("min length {min} is greater than max length {max}"));
            }
        }
    } else if ty.is_integer() {
        let int = |bound: Option<Number>| -> core::result::Result<Option<i64>, String> {
            match bound {
                None => Ok(None),
                Some(n) => n
                    .as_i64()
                    .map(Some)
                    .ok_or_else(|| format!("bound for type {ty} must be an integer, got {n:?}")),
            }
        };

        let (min, max) = (int(def.min)?, int(def.max)?);
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(format!("min {min} is greater than max {max}"));
            }
        }
        constraints.range = Some(Range::Int { min, max });
    } else if ty.is_float() {
        let (min, max) = (def.min.map(Number::as_f64), def.max.map(Number::as_f64));
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(format!("min {min} is greater than max {max}"));
            }
        }
        constraints.range = Some(Range::Float { min, max });
    } else {
        return Err(format!("min/max are not supported for type {ty}"));
    }

    Ok(())
}
