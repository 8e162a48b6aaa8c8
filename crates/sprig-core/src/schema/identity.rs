use super::FieldType;
use crate::stmt::Value;

/// The field that identifies rows, and how its values come to be.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub field: String,
    pub strategy: IdStrategy,

    /// Generated without caller input: by the client for `uuid`/`ulid`, by
    /// the database for `int`/`bigint`.
    pub auto: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    Uuid,
    Ulid,
    Int,
    BigInt,
}

impl IdStrategy {
    pub fn from_type(ty: FieldType) -> Option<IdStrategy> {
        Some(match ty {
            FieldType::Uuid => IdStrategy::Uuid,
            FieldType::Ulid => IdStrategy::Ulid,
            FieldType::Int => IdStrategy::Int,
            FieldType::BigInt => IdStrategy::BigInt,
            _ => return None,
        })
    }

    /// `true` when ids are produced before the INSERT is emitted.
    pub fn is_client_generated(self) -> bool {
        matches!(self, IdStrategy::Uuid | IdStrategy::Ulid)
    }

    /// `true` when the database assigns ids (serial / auto-increment).
    pub fn is_serial(self) -> bool {
        matches!(self, IdStrategy::Int | IdStrategy::BigInt)
    }

    /// Generates a fresh id for client-generated strategies.
    pub fn generate(self) -> Option<Value> {
        match self {
            IdStrategy::Uuid => Some(Value::String(uuid::Uuid::new_v4().to_string())),
            IdStrategy::Ulid => Some(Value::String(ulid::Ulid::new().to_string())),
            IdStrategy::Int | IdStrategy::BigInt => None,
        }
    }
}

impl Identity {
    pub fn is_client_generated(&self) -> bool {
        self.strategy.is_client_generated()
    }

    pub fn is_serial(&self) -> bool {
        self.auto && self.strategy.is_serial()
    }
}
