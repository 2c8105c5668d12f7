//! GraphQL schema model building from gRPC service descriptors.
//!
//! For every service the builder walks its methods in declaration order,
//! turns each request message into an input object, each response message into
//! an object type, and follows message-typed fields transitively. Types,
//! inputs and enums are deduplicated by name: the first registration wins and
//! later encounters reuse it without re-walking fields, which also guarantees
//! termination on cyclic message graphs.

use crate::descriptor::{DescriptorSet, EnumDesc, FieldDesc, FieldKind, MessageDesc, ServiceDesc};
use crate::federation::{EntityConfig, FieldDirectives};
use crate::kind;
use crate::naming;
use crate::types::{Enum, EnumOption, Field, Input, Schema, SchemaType, Type};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Schema builder for one plugin invocation
pub struct SchemaBuilder<'a> {
    descriptors: &'a DescriptorSet,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(descriptors: &'a DescriptorSet) -> Self {
        Self { descriptors }
    }

    /// Build one schema per service, keyed by fully-qualified service name.
    pub fn build(&self) -> IndexMap<String, Schema> {
        let mut schemas = IndexMap::new();
        for service in &self.descriptors.services {
            if schemas.contains_key(&service.full_name) {
                tracing::warn!("service {} declared twice, keeping the first", service.full_name);
                continue;
            }
            schemas.insert(service.full_name.clone(), self.build_service(service));
        }
        schemas
    }

    /// Build the schema model of a single service.
    pub fn build_service(&self, service: &ServiceDesc) -> Schema {
        let mut registry = TypeRegistry::new(self.descriptors);
        let mut schema = Schema::new(service.full_name.clone());
        schema.source = service.file.clone();

        for method in &service.methods {
            let Some(output) = method.output.as_deref().and_then(|n| self.descriptors.message(n))
            else {
                tracing::warn!(
                    "skipping {}.{}: response message {:?} not found",
                    service.full_name,
                    method.name,
                    method.output
                );
                continue;
            };

            let input = match method.input.as_deref() {
                Some(name) => match self.descriptors.message(name) {
                    Some(message) => Some(registry.ensure_input_object(message)),
                    None => {
                        tracing::warn!(
                            "{}.{}: request message {name} not found, generating without arguments",
                            service.full_name,
                            method.name
                        );
                        None
                    }
                },
                None => None,
            };

            let output_type = registry.ensure_object(output);

            let field = Field {
                name: naming::sanitize_identifier(&naming::lower_first(&method.name)),
                ty: output_type,
                comment: naming::clean_comment(&method.comment),
                inputs: input
                    .and_then(|name| registry.inputs.get(&name).cloned())
                    .into_iter()
                    .collect(),
                ..Default::default()
            };

            let schema_type = SchemaType::for_method(&method.name);
            tracing::debug!("{}.{} -> {schema_type:?}", service.full_name, method.name);
            match schema_type {
                SchemaType::Query => schema.root_query.fields.push(field),
                SchemaType::Mutation => schema.root_mutation.fields.push(field),
            }
        }

        schema.types = registry.objects.into_values().collect();
        schema.inputs = registry.inputs.into_values().collect();
        schema.enums = registry.enums.into_values().collect();
        schema
    }
}

/// Name-keyed registries, scoped to one service schema.
///
/// Each kind deduplicates by its derived name: the second message named
/// `Item` reuses the first `Item` type. Objects, inputs and enums still share
/// one GraphQL namespace, so a derived name already used by another kind gets
/// a numeric suffix. The `*_names` maps go from derived to assigned name.
struct TypeRegistry<'a> {
    descriptors: &'a DescriptorSet,
    objects: IndexMap<String, Type>,
    inputs: IndexMap<String, Input>,
    enums: IndexMap<String, Enum>,
    object_names: HashMap<String, String>,
    input_names: HashMap<String, String>,
    enum_names: HashMap<String, String>,
}

impl<'a> TypeRegistry<'a> {
    fn new(descriptors: &'a DescriptorSet) -> Self {
        Self {
            descriptors,
            objects: IndexMap::new(),
            inputs: IndexMap::new(),
            enums: IndexMap::new(),
            object_names: HashMap::new(),
            input_names: HashMap::new(),
            enum_names: HashMap::new(),
        }
    }

    fn type_name_for_message(desc: &MessageDesc) -> String {
        naming::sanitize_identifier(&desc.name)
    }

    /// `GetProductRequest` -> `GetProductInput`, `Address` -> `AddressInput`
    fn input_name_for_message(desc: &MessageDesc) -> String {
        let base = desc.name.strip_suffix("Request").unwrap_or(&desc.name);
        naming::sanitize_identifier(&format!("{base}Input"))
    }

    fn is_taken(&self, name: &str) -> bool {
        name == "Query"
            || name == "Mutation"
            || self.objects.contains_key(name)
            || self.inputs.contains_key(name)
            || self.enums.contains_key(name)
    }

    /// First free name starting from `base`: `Item`, `Item2`, `Item3`, ...
    fn claim(&self, base: String, full_name: &str) -> String {
        if !self.is_taken(&base) {
            return base;
        }
        let name = (2..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !self.is_taken(candidate))
            .unwrap_or_default();
        tracing::warn!("{full_name}: type name {base} already in use, renamed to {name}");
        name
    }

    fn ensure_enum(&mut self, desc: &EnumDesc) -> String {
        let base = naming::sanitize_identifier(&desc.name);
        if let Some(name) = self.enum_names.get(&base) {
            return name.clone();
        }

        let name = self.claim(base.clone(), &desc.full_name);
        let options = desc
            .values
            .iter()
            .map(|value| {
                let number = format!("Value: {}", value.number);
                let comment = naming::clean_comment(&value.comment);
                EnumOption {
                    name: naming::sanitize_identifier(&value.name),
                    comment: if comment.is_empty() {
                        number
                    } else {
                        format!("{comment} {number}")
                    },
                }
            })
            .collect();
        self.enum_names.insert(base, name.clone());
        self.enums.insert(
            name.clone(),
            Enum {
                name: name.clone(),
                options,
                comment: naming::clean_comment(&desc.comment),
            },
        );
        name
    }

    fn ensure_input_object(&mut self, message: &MessageDesc) -> String {
        let base = Self::input_name_for_message(message);
        if let Some(name) = self.input_names.get(&base) {
            return name.clone();
        }

        // Registered before descending so self-references stop here.
        let name = self.claim(base.clone(), &message.full_name);
        let mut input = Input::new(name.clone());
        input.comment = naming::clean_comment(&message.comment);
        self.input_names.insert(base, name.clone());
        self.inputs.insert(name.clone(), input);

        let fields = message
            .fields
            .iter()
            .filter_map(|field| self.build_field(field, true))
            .collect();
        if let Some(input) = self.inputs.get_mut(&name) {
            input.fields = fields;
        }
        name
    }

    fn ensure_object(&mut self, message: &MessageDesc) -> String {
        let base = Self::type_name_for_message(message);
        if let Some(name) = self.object_names.get(&base) {
            return name.clone();
        }

        let name = self.claim(base.clone(), &message.full_name);
        let mut obj = Type::new(name.clone());
        obj.comment = naming::clean_comment(&message.comment);
        self.object_names.insert(base, name.clone());
        self.objects.insert(name.clone(), obj);

        let mut fields: Vec<Field> = message
            .fields
            .iter()
            .filter_map(|field| self.build_field(field, false))
            .collect();

        let entity = EntityConfig::for_message(message);
        let mut key_fields = entity
            .key_field
            .as_deref()
            .map(naming::field_name)
            .unwrap_or_default();
        for field in fields.iter_mut() {
            field.is_key = !key_fields.is_empty() && field.name == key_fields;
        }
        // The key field itself may have been dropped as unresolvable.
        if !fields.iter().any(|f| f.is_key) {
            key_fields.clear();
        }

        if let Some(obj) = self.objects.get_mut(&name) {
            obj.fields = fields;
            obj.is_federated_entity = !key_fields.is_empty();
            obj.key_fields = key_fields;
        }
        name
    }

    fn build_field(&mut self, field: &FieldDesc, is_input: bool) -> Option<Field> {
        let ty = self.type_for_field(field, is_input)?;
        let mut out = Field {
            name: naming::field_name(&field.name),
            ty,
            comment: naming::clean_comment(&field.comment),
            is_required: field.is_required(),
            ..Default::default()
        };

        if !is_input {
            let directives = FieldDirectives::for_field(field);
            out.external = directives.external;
            out.requires = directives.requires;
            out.computed_from = directives.computed_from;
            if let Some(source) = out.computed_from.as_deref() {
                let note = format!("Computed from: {source}");
                out.comment = if out.comment.is_empty() {
                    note
                } else {
                    format!("{} {note}", out.comment)
                };
            }
        }
        Some(out)
    }

    /// Resolve a field's GraphQL type: message, then enum, then scalar.
    ///
    /// Returns `None` when the field references a message or enum missing from
    /// the descriptor set; the field is skipped.
    fn type_for_field(&mut self, field: &FieldDesc, is_input: bool) -> Option<String> {
        let descriptors = self.descriptors;
        let base = match &field.kind {
            FieldKind::Message(full_name) => {
                let Some(message) = descriptors.message(full_name) else {
                    tracing::warn!("field {}: message {full_name} not found, skipping", field.name);
                    return None;
                };
                if is_input {
                    self.ensure_input_object(message)
                } else {
                    self.ensure_object(message)
                }
            }
            FieldKind::Enum(full_name) => match descriptors.enumeration(full_name) {
                Some(en) => self.ensure_enum(en),
                None => {
                    tracing::warn!("field {}: enum {full_name} not found, using String", field.name);
                    kind::STRING.to_string()
                }
            },
            FieldKind::String if naming::is_id_name(&field.name) => kind::ID.to_string(),
            other => kind::scalar_for(other).to_string(),
        };

        Some(kind::decorate(&base, field.repeated, field.is_required()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MethodDesc, OptionValue};
    use crate::federation::{ENTITY_OPTION, KEY_OPTION};

    fn product_set() -> DescriptorSet {
        DescriptorSet::new()
            .with_message(
                MessageDesc::new("product.v1.GetProductRequest")
                    .with_field(FieldDesc::new("product_id", FieldKind::String)),
            )
            .with_message(
                MessageDesc::new("product.v1.GetProductResponse")
                    .with_field(FieldDesc::message("product", "product.v1.Product")),
            )
            .with_message(
                MessageDesc::new("product.v1.Product")
                    .with_comment(" A product in the catalog.\n")
                    .with_field(FieldDesc::new("product_id", FieldKind::String))
                    .with_field(FieldDesc::new("name", FieldKind::String).optional())
                    .with_field(FieldDesc::new("price", FieldKind::Double).optional())
                    .with_field(FieldDesc::enumeration("status", "product.v1.Status"))
                    .with_field(FieldDesc::new("tags", FieldKind::String).repeated()),
            )
            .with_enum(
                EnumDesc::new("product.v1.Status")
                    .with_value("STATUS_UNSPECIFIED", 0)
                    .with_value("STATUS_ACTIVE", 1),
            )
            .with_message(
                MessageDesc::new("product.v1.CreateProductRequest")
                    .with_field(FieldDesc::new("name", FieldKind::String))
                    .with_field(FieldDesc::message("product", "product.v1.Product")),
            )
            .with_service(
                ServiceDesc::new("product.v1.ProductService")
                    .with_file("product/v1/product.proto")
                    .with_method(
                        MethodDesc::new(
                            "GetProduct",
                            "product.v1.GetProductRequest",
                            "product.v1.GetProductResponse",
                        )
                        .with_comment(" Fetch one product.\n"),
                    )
                    .with_method(MethodDesc::new(
                        "CreateProduct",
                        "product.v1.CreateProductRequest",
                        "product.v1.Product",
                    )),
            )
    }

    fn build(set: &DescriptorSet) -> Schema {
        SchemaBuilder::new(set).build_service(&set.services[0])
    }

    #[test]
    fn classifies_root_operations() {
        let set = product_set();
        let schema = build(&set);

        let query = schema.root_query.get_field("getProduct").expect("query field");
        assert_eq!(query.ty, "GetProductResponse");
        assert_eq!(query.comment, "Fetch one product.");
        assert_eq!(query.inputs.len(), 1);
        assert_eq!(query.inputs[0].name, "GetProductInput");

        let mutation = schema
            .root_mutation
            .get_field("createProduct")
            .expect("mutation field");
        assert_eq!(mutation.ty, "Product");
        assert!(schema.has_mutations());
    }

    #[test]
    fn maps_field_types() {
        let set = product_set();
        let schema = build(&set);
        let product = schema.get_type("Product").expect("Product type");

        let ty = |name: &str| product.get_field(name).map(|f| f.ty.as_str());
        assert_eq!(ty("productId"), Some("ID!"));
        assert_eq!(ty("name"), Some("String"));
        assert_eq!(ty("price"), Some("Float"));
        assert_eq!(ty("status"), Some("Status!"));
        assert_eq!(ty("tags"), Some("[String]!"));
        assert_eq!(product.comment, "A product in the catalog.");

        let status = schema.get_enum("Status").expect("Status enum");
        assert_eq!(status.options.len(), 2);
        assert_eq!(status.options[1].name, "STATUS_ACTIVE");
        assert_eq!(status.options[1].comment, "Value: 1");
    }

    #[test]
    fn infers_federation_key() {
        let set = product_set();
        let schema = build(&set);
        let product = schema.get_type("Product").expect("Product type");
        assert!(product.is_federated_entity);
        assert_eq!(product.key_fields, "productId");
        assert!(product.get_field("productId").is_some_and(|f| f.is_key));

        let response = schema.get_type("GetProductResponse").expect("response type");
        assert!(!response.is_federated_entity);
        assert!(response.key_fields.is_empty());
    }

    #[test]
    fn deduplicates_types() {
        let set = product_set();
        let schema = build(&set);
        assert_eq!(schema.types.iter().filter(|t| t.name == "Product").count(), 1);
        assert_eq!(
            schema.types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["GetProductResponse", "Product"]
        );
        assert_eq!(schema.enums.len(), 1);
    }

    #[test]
    fn nested_messages_in_inputs_become_inputs() {
        let set = product_set();
        let schema = build(&set);
        let create = schema.get_input("CreateProductInput").expect("create input");
        assert_eq!(create.fields[1].ty, "ProductInput");
        let nested = schema.get_input("ProductInput").expect("nested input");
        assert_eq!(nested.fields.len(), 5);
        assert!(nested.fields.iter().all(|f| !f.is_key));
        assert_eq!(
            schema.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["GetProductInput", "CreateProductInput", "ProductInput"]
        );
    }

    #[test]
    fn cyclic_messages_register_once() {
        let set = DescriptorSet::new()
            .with_message(
                MessageDesc::new("org.v1.Employee")
                    .with_field(FieldDesc::new("employee_id", FieldKind::String))
                    .with_field(FieldDesc::message("manager", "org.v1.Employee"))
                    .with_field(FieldDesc::message("team", "org.v1.Team")),
            )
            .with_message(
                MessageDesc::new("org.v1.Team")
                    .with_field(FieldDesc::message("members", "org.v1.Employee").repeated()),
            )
            .with_message(
                MessageDesc::new("org.v1.GetEmployeeRequest")
                    .with_field(FieldDesc::message("filter", "org.v1.Employee")),
            )
            .with_service(ServiceDesc::new("org.v1.OrgService").with_method(MethodDesc::new(
                "GetEmployee",
                "org.v1.GetEmployeeRequest",
                "org.v1.Employee",
            )));

        let schema = build(&set);
        assert_eq!(
            schema.types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["Employee", "Team"]
        );
        let employee = schema.get_type("Employee").expect("Employee");
        assert_eq!(employee.get_field("manager").map(|f| f.ty.as_str()), Some("Employee"));
        let team = schema.get_type("Team").expect("Team");
        assert_eq!(team.fields[0].ty, "[Employee]!");
        assert_eq!(
            schema.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["GetEmployeeInput", "EmployeeInput", "TeamInput"]
        );
    }

    #[test]
    fn explicit_metadata_overrides_names() {
        let set = DescriptorSet::new()
            .with_message(
                MessageDesc::new("acct.v1.Account")
                    .with_field(
                        FieldDesc::new("owner_id", FieldKind::String)
                            .with_option(KEY_OPTION, OptionValue::Bool(false)),
                    )
                    .with_field(
                        FieldDesc::new("handle", FieldKind::String)
                            .with_option(KEY_OPTION, OptionValue::Bool(true)),
                    ),
            )
            .with_message(
                MessageDesc::new("acct.v1.Ledger")
                    .with_option(ENTITY_OPTION, OptionValue::Bool(false))
                    .with_field(FieldDesc::new("ledger_id", FieldKind::String)),
            )
            .with_message(
                MessageDesc::new("acct.v1.GetAccountResponse")
                    .with_field(FieldDesc::message("account", "acct.v1.Account"))
                    .with_field(FieldDesc::message("ledger", "acct.v1.Ledger")),
            )
            .with_message(MessageDesc::new("acct.v1.GetAccountRequest"))
            .with_service(ServiceDesc::new("acct.v1.AccountService").with_method(
                MethodDesc::new(
                    "GetAccount",
                    "acct.v1.GetAccountRequest",
                    "acct.v1.GetAccountResponse",
                ),
            ));

        let schema = build(&set);
        let account = schema.get_type("Account").expect("Account");
        assert!(account.is_federated_entity);
        assert_eq!(account.key_fields, "handle");

        let ledger = schema.get_type("Ledger").expect("Ledger");
        assert!(!ledger.is_federated_entity);
    }

    #[test]
    fn missing_messages_are_skipped() {
        let set = DescriptorSet::new()
            .with_message(
                MessageDesc::new("x.v1.Thing")
                    .with_field(FieldDesc::message("ghost", "x.v1.Ghost"))
                    .with_field(FieldDesc::new("label", FieldKind::String)),
            )
            .with_service(
                ServiceDesc::new("x.v1.ThingService")
                    .with_method(MethodDesc::new("GetThing", "x.v1.Missing", "x.v1.Thing"))
                    .with_method(MethodDesc::new("DeleteThing", "x.v1.Thing", "x.v1.Nowhere")),
            );

        let schema = build(&set);
        let get = schema.root_query.get_field("getThing").expect("getThing");
        assert!(get.inputs.is_empty());
        assert!(schema.root_mutation.fields.is_empty());
        let thing = schema.get_type("Thing").expect("Thing");
        assert_eq!(thing.fields.len(), 1);
        assert_eq!(thing.fields[0].name, "label");
    }

    #[test]
    fn services_get_independent_registries() {
        let mut set = product_set();
        set.services.push(
            ServiceDesc::new("product.v1.AdminService").with_method(MethodDesc::new(
                "ArchiveProduct",
                "product.v1.GetProductRequest",
                "product.v1.Product",
            )),
        );
        let schemas = SchemaBuilder::new(&set).build();
        assert_eq!(schemas.len(), 2);
        let admin = &schemas["product.v1.AdminService"];
        assert!(admin.root_query.fields.is_empty());
        assert_eq!(
            admin.types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["Product"]
        );
    }

    #[test]
    fn build_is_deterministic() {
        let set = product_set();
        let first = SchemaBuilder::new(&set).build();
        let second = SchemaBuilder::new(&set).build();
        assert_eq!(first, second);
    }

    #[test]
    fn enum_value_comments_keep_number() {
        let mut status = EnumDesc::new("shop.v1.Status")
            .with_value("STATUS_UNSPECIFIED", 0)
            .with_value("STATUS_OPEN", 1);
        status.values[1].comment = " Accepting orders.\n".to_string();
        let set = DescriptorSet::new()
            .with_enum(status)
            .with_message(
                MessageDesc::new("shop.v1.Shop")
                    .with_field(FieldDesc::enumeration("status", "shop.v1.Status")),
            )
            .with_service(
                ServiceDesc::new("shop.v1.ShopService")
                    .with_method(MethodDesc::new("GetShop", "shop.v1.Shop", "shop.v1.Shop")),
            );

        let schema = build(&set);
        let status = schema.get_enum("Status").expect("Status enum");
        assert_eq!(status.options[0].comment, "Value: 0");
        assert_eq!(status.options[1].comment, "Accepting orders. Value: 1");
    }

    #[test]
    fn names_are_unique_across_kinds() {
        let set = DescriptorSet::new()
            .with_message(
                MessageDesc::new("find.v1.SearchRequest")
                    .with_field(FieldDesc::new("query", FieldKind::String)),
            )
            .with_message(
                MessageDesc::new("find.v1.SearchInput")
                    .with_field(FieldDesc::new("hits", FieldKind::Int32)),
            )
            .with_message(MessageDesc::new("find.v1.Query"))
            .with_message(
                MessageDesc::new("find.v1.ExploreResponse")
                    .with_field(FieldDesc::message("root", "find.v1.Query")),
            )
            .with_service(
                ServiceDesc::new("find.v1.FindService")
                    .with_method(MethodDesc::new(
                        "Search",
                        "find.v1.SearchRequest",
                        "find.v1.SearchInput",
                    ))
                    .with_method(MethodDesc::new(
                        "SearchAgain",
                        "find.v1.SearchRequest",
                        "find.v1.SearchInput",
                    ))
                    .with_method(MethodDesc::new(
                        "Explore",
                        "find.v1.SearchRequest",
                        "find.v1.ExploreResponse",
                    )),
            );

        let schema = build(&set);
        assert_eq!(
            schema.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["SearchInput"]
        );
        assert_eq!(
            schema.types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["SearchInput2", "ExploreResponse", "Query2"]
        );

        let search = schema.root_query.get_field("search").expect("search");
        assert_eq!(search.inputs[0].name, "SearchInput");
        assert_eq!(search.ty, "SearchInput2");
        let again = schema.root_query.get_field("searchAgain").expect("searchAgain");
        assert_eq!(again.ty, "SearchInput2");

        let explore = schema.get_type("ExploreResponse").expect("ExploreResponse");
        assert_eq!(explore.fields[0].ty, "Query2");
    }
}
