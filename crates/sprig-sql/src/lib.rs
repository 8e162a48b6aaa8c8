pub mod serializer;
pub use serializer::{Flavor, Params, Placeholder, Serializer};

pub mod unique;
pub use unique::{unique_violation, UniqueViolation};
