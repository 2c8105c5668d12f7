//! Minimal descriptor IR consumed by the schema builder.
//!
//! The builder only needs to list services, methods and fields, ask a field
//! for its kind, repetition and presence, and read a custom option by its
//! extension number. Everything here is owned data: message and enum
//! references are fully-qualified names resolved through the owning
//! [`DescriptorSet`], which keeps cyclic message graphs representable.
//!
//! The [`crate::reflect`] module fills a set from a `prost_reflect`
//! descriptor pool; tests and other front ends can assemble one by hand.

use std::collections::{BTreeMap, HashMap};

/// Value of a custom option, keyed by extension number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    /// Present, but of a type we do not interpret.
    Other,
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Custom options attached to a message or field.
pub type Options = BTreeMap<u32, OptionValue>;

/// Protobuf field kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    /// Fully-qualified name of the referenced message
    Message(String),
    /// Fully-qualified name of the referenced enum
    Enum(String),
}

/// A complete set of descriptors for one plugin invocation.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    /// Services to generate for, in declaration order
    pub services: Vec<ServiceDesc>,
    messages: HashMap<String, MessageDesc>,
    enums: HashMap<String, EnumDesc>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: ServiceDesc) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_message(mut self, message: MessageDesc) -> Self {
        self.add_message(message);
        self
    }

    pub fn with_enum(mut self, en: EnumDesc) -> Self {
        self.add_enum(en);
        self
    }

    pub fn add_message(&mut self, message: MessageDesc) {
        self.messages.insert(message.full_name.clone(), message);
    }

    pub fn add_enum(&mut self, en: EnumDesc) {
        self.enums.insert(en.full_name.clone(), en);
    }

    /// Look up a message by fully-qualified name
    pub fn message(&self, full_name: &str) -> Option<&MessageDesc> {
        self.messages.get(full_name)
    }

    /// Look up an enum by fully-qualified name
    pub fn enumeration(&self, full_name: &str) -> Option<&EnumDesc> {
        self.enums.get(full_name)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// A gRPC service.
#[derive(Debug, Clone, Default)]
pub struct ServiceDesc {
    pub name: String,
    pub full_name: String,
    /// Path of the proto file declaring the service
    pub file: String,
    pub comment: String,
    pub methods: Vec<MethodDesc>,
}

impl ServiceDesc {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: short_name(&full_name).to_string(),
            full_name,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_method(mut self, method: MethodDesc) -> Self {
        self.methods.push(method);
        self
    }
}

/// A unary RPC; streaming shape is irrelevant to schema generation.
#[derive(Debug, Clone, Default)]
pub struct MethodDesc {
    pub name: String,
    /// Fully-qualified request message name
    pub input: Option<String>,
    /// Fully-qualified response message name
    pub output: Option<String>,
    pub comment: String,
}

impl MethodDesc {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: Some(input.into()),
            output: Some(output.into()),
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A protobuf message.
#[derive(Debug, Clone, Default)]
pub struct MessageDesc {
    pub name: String,
    pub full_name: String,
    pub comment: String,
    pub fields: Vec<FieldDesc>,
    pub options: Options,
}

impl MessageDesc {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: short_name(&full_name).to_string(),
            full_name,
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_option(mut self, number: u32, value: OptionValue) -> Self {
        self.options.insert(number, value);
        self
    }
}

/// A message field.
#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: String,
    pub kind: FieldKind,
    pub repeated: bool,
    /// Explicit presence: `optional` scalars, singular messages, proto2 optionals
    pub has_presence: bool,
    pub comment: String,
    pub options: Options,
}

impl FieldDesc {
    /// A proto3 singular field with implicit presence.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let has_presence = matches!(kind, FieldKind::Message(_));
        Self {
            name: name.into(),
            kind,
            repeated: false,
            has_presence,
            comment: String::new(),
            options: Options::new(),
        }
    }

    pub fn message(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Message(full_name.into()))
    }

    pub fn enumeration(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Enum(full_name.into()))
    }

    pub fn optional(mut self) -> Self {
        self.has_presence = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self.has_presence = false;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_option(mut self, number: u32, value: OptionValue) -> Self {
        self.options.insert(number, value);
        self
    }

    /// Fields without presence are non-null in GraphQL.
    pub fn is_required(&self) -> bool {
        !self.has_presence
    }
}

/// A protobuf enum.
#[derive(Debug, Clone, Default)]
pub struct EnumDesc {
    pub name: String,
    pub full_name: String,
    pub comment: String,
    pub values: Vec<EnumValueDesc>,
}

impl EnumDesc {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: short_name(&full_name).to_string(),
            full_name,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDesc {
            name: name.into(),
            number,
            comment: String::new(),
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnumValueDesc {
    pub name: String,
    pub number: i32,
    pub comment: String,
}

/// Last dotted segment of a fully-qualified name.
pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}
