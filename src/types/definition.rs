use std::fmt;
use std::sync::Arc;

// Reference to the GraphQL type of a field; non-null unless wrapped in Optional
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Id,
    String,
    Int,
    Float,
    Boolean,
    Named(String), // Any other registered type, scalar or enum by name
    List(Box<TypeRef>),
    Optional(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    // Name of the innermost named type, e.g. "User" for [User!]
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Id => "ID",
            TypeRef::String => "String",
            TypeRef::Int => "Int",
            TypeRef::Float => "Float",
            TypeRef::Boolean => "Boolean",
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::Optional(inner) => inner.base_name(),
        }
    }

    fn fmt_nullable(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::Optional(inner) => inner.fmt_nullable(f),
            other => f.write_str(other.base_name()),
        }
    }
}

// Renders the SDL form: String!, [Int!]!, User
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Optional(inner) => inner.fmt_nullable(f),
            other => {
                other.fmt_nullable(f)?;
                f.write_str("!")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub graphql_name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
    pub provides: Vec<String>, // Entity fields this field resolves for the gateway
    pub requires: Vec<String>, // Fields of the extended type needed to resolve this one
    pub external: bool, // Owned by another service
}

impl FieldDefinition {
    pub fn new(graphql_name: impl Into<String>, type_ref: TypeRef) -> Self {
        FieldDefinition {
            graphql_name: graphql_name.into(),
            type_ref,
            description: None,
            provides: Vec::new(),
            requires: Vec::new(),
            external: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn provides(mut self, field: impl Into<String>) -> Self {
        self.provides.push(field.into());
        self
    }

    pub fn requires(mut self, field: impl Into<String>) -> Self {
        self.requires.push(field.into());
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }
}

// Metadata attached to a registered object type or interface.
// Interfaces are shared: every implementor holds the same Arc.
#[derive(Debug)]
pub struct TypeDefinition {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) is_interface: bool,
    pub(crate) interfaces: Vec<Arc<TypeDefinition>>,
    pub(crate) keys: Vec<String>, // Federation @key selections, one per key
    pub(crate) extend: bool, // Extends a type owned by another service
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, graphql_name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.graphql_name == graphql_name)
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    // Direct interfaces first, then their own interfaces, without duplicates
    pub fn interfaces(&self) -> &[Arc<TypeDefinition>] {
        &self.interfaces
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    // Types with at least one key can be resolved as federation entities
    pub fn is_entity(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn is_extension(&self) -> bool {
        self.extend
    }

    // True when `interface` is the very same definition found in this chain
    pub fn implements(&self, interface: &Arc<TypeDefinition>) -> bool {
        self.interfaces.iter().any(|i| Arc::ptr_eq(i, interface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_type_refs_as_sdl() {
        assert_eq!(TypeRef::Id.to_string(), "ID!");
        assert_eq!(TypeRef::optional(TypeRef::String).to_string(), "String");
        assert_eq!(TypeRef::list(TypeRef::Int).to_string(), "[Int!]!");
        assert_eq!(
            TypeRef::optional(TypeRef::list(TypeRef::optional(TypeRef::named("User")))).to_string(),
            "[User]"
        );
        assert_eq!(TypeRef::list(TypeRef::named("Node")).base_name(), "Node");
    }

    #[test]
    fn field_federation_params_accumulate() {
        let field = FieldDefinition::new("reviews", TypeRef::list(TypeRef::named("Review")))
            .provides("author")
            .requires("id")
            .requires("sku");
        assert_eq!(field.provides, ["author"]);
        assert_eq!(field.requires, ["id", "sku"]);
        assert!(!field.external);
        assert!(FieldDefinition::new("id", TypeRef::Id).external().external);
    }
}
