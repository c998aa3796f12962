// GraphQL module for the schema served by the view
pub mod schema;

pub use schema::{FederationService, FileInfo, MutationRoot, QueryRoot};

use async_graphql::{EmptySubscription, Schema};

use super::types::{TypeBuilder, TypeError, TypeRef, TypeRegistry};

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

// Builds the GraphQL schema, injecting the type registry for introspection queries
pub fn build_schema(registry: TypeRegistry) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(registry)
        .finish()
}

// Registers the sample Node / User / Person hierarchy exposed by the server
pub fn demo_registry() -> Result<TypeRegistry, TypeError> {
    let mut registry = TypeRegistry::new();

    let node = registry.register(
        TypeBuilder::interface("Node")
            .description("An object with a globally unique ID")
            .field("id", TypeRef::Id)
            .build()?,
    )?;
    let named_node = registry.register(
        TypeBuilder::interface("NamedNode")
            .implements(&node)
            .field("name", TypeRef::String)
            .build()?,
    )?;
    registry.register(
        TypeBuilder::object("User")
            .key("id")
            .implements(&node)
            .field("name", TypeRef::String)
            .field("email", TypeRef::optional(TypeRef::String))
            .build()?,
    )?;
    registry.register(
        TypeBuilder::object("Person")
            .implements(&named_node)
            .field("friends", TypeRef::list(TypeRef::named("Person")))
            .build()?,
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn exposes_registry_through_the_schema() {
        let schema = build_schema(demo_registry().unwrap());
        let response = schema
            .execute(r#"{ hello implementors(interface: "Node") }"#)
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"hello": "Hello, world!", "implementors": ["NamedNode", "User", "Person"]})
        );
    }

    #[tokio::test]
    async fn service_field_prints_entity_keys() {
        let schema = build_schema(demo_registry().unwrap());
        let response = schema.execute("{ _service { sdl } }").await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        let sdl = data["_service"]["sdl"].as_str().unwrap();
        assert!(sdl.contains("type User implements Node @key(fields: \"id\") {"));
        assert!(sdl.contains("interface NamedNode implements Node {"));
    }

    #[tokio::test]
    async fn unknown_interface_is_a_field_error() {
        let schema = build_schema(demo_registry().unwrap());
        let response = schema.execute(r#"{ implementors(interface: "User") }"#).await;
        assert_eq!(response.errors[0].message, "Unknown interface 'User'");
    }
}
