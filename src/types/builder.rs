use std::sync::Arc;

use super::definition::{FieldDefinition, TypeDefinition, TypeRef};
use super::TypeError;

// Builds an immutable TypeDefinition from declared fields and implemented interfaces
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    description: Option<String>,
    is_interface: bool,
    bases: Vec<Arc<TypeDefinition>>,
    declared: Vec<FieldDefinition>,
    keys: Vec<String>,
    extend: bool,
}

impl TypeBuilder {
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name.into(), false)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name.into(), true)
    }

    fn new(name: String, is_interface: bool) -> Self {
        TypeBuilder {
            name,
            description: None,
            is_interface,
            bases: Vec::new(),
            declared: Vec::new(),
            keys: Vec::new(),
            extend: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // Bases are resolved in the order they are added
    pub fn implements(mut self, interface: &Arc<TypeDefinition>) -> Self {
        self.bases.push(Arc::clone(interface));
        self
    }

    pub fn field(self, graphql_name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.field_definition(FieldDefinition::new(graphql_name, type_ref))
    }

    pub fn field_definition(mut self, field: FieldDefinition) -> Self {
        self.declared.push(field);
        self
    }

    // Marks the type as a federation entity identified by `fields`, e.g. "id" or "upc sku"
    pub fn key(mut self, fields: impl Into<String>) -> Self {
        self.keys.push(fields.into());
        self
    }

    pub fn extend(mut self) -> Self {
        self.extend = true;
        self
    }

    pub fn build(self) -> Result<Arc<TypeDefinition>, TypeError> {
        for base in &self.bases {
            if !base.is_interface {
                return Err(TypeError::NotAnInterface {
                    type_name: self.name.clone(),
                    base: base.name.clone(),
                });
            }
        }

        for (i, field) in self.declared.iter().enumerate() {
            if self.declared[..i].iter().any(|f| f.graphql_name == field.graphql_name) {
                return Err(TypeError::DuplicateField {
                    type_name: self.name.clone(),
                    field: field.graphql_name.clone(),
                });
            }
        }

        let interfaces = resolve_interfaces(&self.bases);
        let fields = compose_fields(&self.bases, self.declared);

        Ok(Arc::new(TypeDefinition {
            name: self.name,
            description: self.description,
            fields,
            is_interface: self.is_interface,
            interfaces,
            keys: self.keys,
            extend: self.extend,
        }))
    }
}

// Each base, then its own chain; first appearance wins, compared by identity
fn resolve_interfaces(bases: &[Arc<TypeDefinition>]) -> Vec<Arc<TypeDefinition>> {
    let mut resolved: Vec<Arc<TypeDefinition>> = Vec::new();
    for base in bases {
        let chain = std::iter::once(base).chain(base.interfaces.iter());
        for interface in chain {
            if !resolved.iter().any(|r| Arc::ptr_eq(r, interface)) {
                resolved.push(Arc::clone(interface));
            }
        }
    }
    resolved
}

// Inherited fields keep their position; a redeclared field replaces the inherited one in place
fn compose_fields(bases: &[Arc<TypeDefinition>], declared: Vec<FieldDefinition>) -> Vec<FieldDefinition> {
    let mut fields: Vec<FieldDefinition> = Vec::new();
    for field in bases.iter().flat_map(|b| b.fields.iter()) {
        if !fields.iter().any(|f| f.graphql_name == field.graphql_name) {
            fields.push(field.clone());
        }
    }

    for field in declared {
        match fields.iter_mut().find(|f| f.graphql_name == field.graphql_name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclared_field_keeps_inherited_position() {
        let node = TypeBuilder::interface("Node")
            .field("id", TypeRef::Id)
            .field("createdAt", TypeRef::String)
            .build()
            .unwrap();
        let user = TypeBuilder::object("User")
            .implements(&node)
            .field("name", TypeRef::String)
            .field("createdAt", TypeRef::optional(TypeRef::String))
            .build()
            .unwrap();

        let names: Vec<&str> = user.fields().iter().map(|f| f.graphql_name.as_str()).collect();
        assert_eq!(names, ["id", "createdAt", "name"]);
        assert_eq!(
            user.field("createdAt").unwrap().type_ref,
            TypeRef::optional(TypeRef::String)
        );
    }

    #[test]
    fn rejects_duplicate_declared_fields() {
        let err = TypeBuilder::object("User")
            .field("name", TypeRef::String)
            .field("name", TypeRef::Int)
            .build()
            .unwrap_err();
        assert!(matches!(err, TypeError::DuplicateField { ref field, .. } if field == "name"));
    }

    #[test]
    fn carries_federation_keys() {
        let product = TypeBuilder::object("Product")
            .key("upc")
            .key("sku variation")
            .extend()
            .field_definition(FieldDefinition::new("upc", TypeRef::String).external())
            .build()
            .unwrap();
        assert_eq!(product.keys(), ["upc", "sku variation"]);
        assert!(product.is_entity());
        assert!(product.is_extension());
        assert!(product.field("upc").unwrap().external);

        let plain = TypeBuilder::object("Review").build().unwrap();
        assert!(!plain.is_entity());
        assert!(!plain.is_extension());
    }

    #[test]
    fn only_interfaces_can_be_implemented() {
        let user = TypeBuilder::object("User").field("id", TypeRef::Id).build().unwrap();
        let err = TypeBuilder::object("Admin").implements(&user).build().unwrap_err();
        assert!(matches!(err, TypeError::NotAnInterface { ref base, .. } if base == "User"));
    }
}
