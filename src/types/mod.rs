// Type registration: explicit builders producing shared, immutable type definitions
pub mod builder;
pub mod definition;
pub mod registry;

pub use builder::TypeBuilder;
pub use definition::{FieldDefinition, TypeDefinition, TypeRef};
pub use registry::TypeRegistry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Field '{field}' is declared more than once on '{type_name}'")]
    DuplicateField { type_name: String, field: String },

    #[error("'{type_name}' cannot implement '{base}', which is not an interface")]
    NotAnInterface { type_name: String, base: String },
}
