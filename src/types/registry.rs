use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use super::definition::{FieldDefinition, TypeDefinition};
use super::TypeError;

// Registered type definitions keyed by name, in registration order.
// Built once at startup and shared read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, Arc<TypeDefinition>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a definition and hands back the shared handle
    pub fn register(&mut self, definition: Arc<TypeDefinition>) -> Result<Arc<TypeDefinition>, TypeError> {
        if self.types.contains_key(definition.name()) {
            return Err(TypeError::DuplicateType(definition.name().to_string()));
        }
        debug!(
            "Registered {} {} with {} field(s)",
            if definition.is_interface() { "interface" } else { "type" },
            definition.name(),
            definition.fields().len()
        );
        self.types.insert(definition.name().to_string(), Arc::clone(&definition));
        Ok(definition)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDefinition>> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDefinition>> {
        self.types.values()
    }

    // Registered types whose interface chain contains this exact definition
    pub fn implementors<'a>(&'a self, interface: &'a Arc<TypeDefinition>) -> impl Iterator<Item = &'a Arc<TypeDefinition>> + 'a {
        self.types.values().filter(move |t| t.implements(interface))
    }

    // Types carrying a federation key, in registration order
    pub fn entities(&self) -> impl Iterator<Item = &Arc<TypeDefinition>> {
        self.types.values().filter(|t| t.is_entity())
    }

    // Renders every registered definition as SDL, in registration order
    pub fn print_sdl(&self) -> String {
        let mut sdl = String::new();
        for (i, definition) in self.types.values().enumerate() {
            if i > 0 {
                sdl.push('\n');
            }
            print_definition(&mut sdl, definition);
        }
        sdl
    }
}

fn print_definition(out: &mut String, definition: &TypeDefinition) {
    if let Some(description) = definition.description() {
        print_description(out, description, "");
    }
    // Extensions of another service's type print as `extend type`
    if definition.is_extension() {
        out.push_str("extend ");
    }
    let keyword = if definition.is_interface() { "interface" } else { "type" };
    let _ = write!(out, "{} {}", keyword, definition.name());
    if !definition.interfaces().is_empty() {
        let names: Vec<&str> = definition.interfaces().iter().map(|i| i.name()).collect();
        let _ = write!(out, " implements {}", names.join(" & "));
    }
    for key in definition.keys() {
        let _ = write!(out, " @key(fields: \"{}\")", key);
    }
    out.push_str(" {\n");
    for field in definition.fields() {
        if let Some(description) = &field.description {
            print_description(out, description, "  ");
        }
        let _ = write!(out, "  {}: {}", field.graphql_name, field.type_ref);
        print_field_directives(out, field);
        out.push('\n');
    }
    out.push_str("}\n");
}

fn print_field_directives(out: &mut String, field: &FieldDefinition) {
    if field.external {
        out.push_str(" @external");
    }
    if !field.requires.is_empty() {
        let _ = write!(out, " @requires(fields: \"{}\")", field.requires.join(" "));
    }
    if !field.provides.is_empty() {
        let _ = write!(out, " @provides(fields: \"{}\")", field.provides.join(" "));
    }
}

fn print_description(out: &mut String, description: &str, indent: &str) {
    let _ = writeln!(out, "{}\"\"\"{}\"\"\"", indent, description.replace("\"\"\"", "\\\"\"\""));
}
