//! GraphQL schema model handed to the template renderer
//!
//! These shapes are the renderer's data contract: a template sees exactly the
//! serialized form of [`Schema`] as its root context.

use serde::Serialize;

/// One generated schema, one per gRPC service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Fully-qualified service name (e.g. `product.v1.ProductService`)
    pub service_name: String,
    /// Proto file the service is declared in
    pub source: String,
    pub root_query: Type,
    pub root_mutation: Type,
    /// Output object types, in first-registration order
    pub types: Vec<Type>,
    pub inputs: Vec<Input>,
    pub enums: Vec<Enum>,
}

impl Schema {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            source: String::new(),
            root_query: Type::new("Query"),
            root_mutation: Type::new("Mutation"),
            types: Vec::new(),
            inputs: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn get_input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn has_mutations(&self) -> bool {
        !self.root_mutation.fields.is_empty()
    }
}

/// GraphQL object type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Type {
    pub name: String,
    pub fields: Vec<Field>,
    pub comment: String,
    /// Whether the type carries an `@key` directive
    pub is_federated_entity: bool,
    /// GraphQL name of the key field; single key only
    pub key_fields: String,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Field on an object or input type, or a root operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    /// Decorated GraphQL type (`[Product]!`, `ID!`, ...)
    #[serde(rename = "type")]
    pub ty: String,
    pub comment: String,
    pub is_required: bool,
    /// Arguments, only set on root operation fields
    pub inputs: Vec<Input>,
    pub is_key: bool,
    pub external: bool,
    pub requires: Option<String>,
    pub computed_from: Option<String>,
}

/// GraphQL input object type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Input {
    pub name: String,
    pub fields: Vec<Field>,
    pub comment: String,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// GraphQL enum
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enum {
    pub name: String,
    pub options: Vec<EnumOption>,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumOption {
    pub name: String,
    pub comment: String,
}

/// Root operation bucket for an RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Query,
    Mutation,
}

impl SchemaType {
    const QUERY_PREFIXES: [&'static str; 3] = ["get", "list", "search"];

    /// Classify an RPC by name: `get`/`list`/`search` prefixes
    /// (case-insensitive) are queries, everything else is a mutation.
    pub fn for_method(method_name: &str) -> Self {
        let lower = method_name.to_ascii_lowercase();
        if Self::QUERY_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            SchemaType::Query
        } else {
            SchemaType::Mutation
        }
    }
}
