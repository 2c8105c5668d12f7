//! Builds the descriptor IR from a `prost_reflect` descriptor pool.
//!
//! Custom options are read generically: every extension of
//! `google.protobuf.MessageOptions` / `FieldOptions` known to the pool is
//! recorded by number, so the federation classifier never depends on a
//! generated options type.

use crate::descriptor::{
    DescriptorSet, EnumDesc, EnumValueDesc, FieldDesc, FieldKind, MessageDesc, MethodDesc,
    OptionValue, Options, ServiceDesc,
};
use prost_reflect::{
    Cardinality, DescriptorPool, DynamicMessage, EnumDescriptor, FieldDescriptor, Kind,
    MessageDescriptor, ReflectMessage, Value,
};
use std::collections::{HashMap, HashSet};

/// Leading comments of one file, keyed by source location path.
type CommentIndex = HashMap<Vec<i32>, String>;

impl DescriptorSet {
    /// Convert a descriptor pool.
    ///
    /// Services are taken only from `files_to_generate` (all files when empty);
    /// every message and enum in the pool is kept so references into imported
    /// files resolve.
    pub fn from_pool(pool: &DescriptorPool, files_to_generate: &[String]) -> Self {
        let targets: HashSet<&str> = files_to_generate.iter().map(|s| s.as_str()).collect();
        let comments = PoolComments::new(pool);
        let mut set = DescriptorSet::new();

        for message in pool.all_messages() {
            set.add_message(convert_message(pool, &comments, &message));
        }
        for en in pool.all_enums() {
            set.add_enum(convert_enum(&comments, &en));
        }

        for svc in pool.services() {
            let file = svc.parent_file();
            if !targets.is_empty() && !targets.contains(file.name()) {
                continue;
            }

            let mut service = ServiceDesc::new(svc.full_name())
                .with_file(file.name())
                .with_comment(comments.get(file.name(), svc.path()));
            for method in svc.methods() {
                service.methods.push(MethodDesc {
                    name: method.name().to_string(),
                    input: Some(method.input().full_name().to_string()),
                    output: Some(method.output().full_name().to_string()),
                    comment: comments.get(file.name(), method.path()),
                });
            }
            tracing::debug!(
                "collected service {} ({} methods)",
                service.full_name,
                service.methods.len()
            );
            set.services.push(service);
        }

        set
    }
}

fn convert_message(
    pool: &DescriptorPool,
    comments: &PoolComments,
    message: &MessageDescriptor,
) -> MessageDesc {
    let file = message.parent_file();
    let mut desc = MessageDesc::new(message.full_name())
        .with_comment(comments.get(file.name(), message.path()));
    desc.options = custom_options(pool, &message.options());
    desc.fields = message
        .fields()
        .map(|field| convert_field(pool, comments, file.name(), &field))
        .collect();
    desc
}

fn convert_field(
    pool: &DescriptorPool,
    comments: &PoolComments,
    file: &str,
    field: &FieldDescriptor,
) -> FieldDesc {
    let kind = match field.kind() {
        Kind::Double => FieldKind::Double,
        Kind::Float => FieldKind::Float,
        Kind::Int32 => FieldKind::Int32,
        Kind::Int64 => FieldKind::Int64,
        Kind::Uint32 => FieldKind::Uint32,
        Kind::Uint64 => FieldKind::Uint64,
        Kind::Sint32 => FieldKind::Sint32,
        Kind::Sint64 => FieldKind::Sint64,
        Kind::Fixed32 => FieldKind::Fixed32,
        Kind::Fixed64 => FieldKind::Fixed64,
        Kind::Sfixed32 => FieldKind::Sfixed32,
        Kind::Sfixed64 => FieldKind::Sfixed64,
        Kind::Bool => FieldKind::Bool,
        Kind::String => FieldKind::String,
        Kind::Bytes => FieldKind::Bytes,
        Kind::Message(msg) => FieldKind::Message(msg.full_name().to_string()),
        Kind::Enum(en) => FieldKind::Enum(en.full_name().to_string()),
    };

    FieldDesc {
        name: field.name().to_string(),
        kind,
        repeated: field.is_list() || field.is_map(),
        has_presence: field.supports_presence() && field.cardinality() != Cardinality::Required,
        comment: comments.get(file, field.path()),
        options: custom_options(pool, &field.options()),
    }
}

fn convert_enum(comments: &PoolComments, en: &EnumDescriptor) -> EnumDesc {
    let file = en.parent_file();
    let mut desc = EnumDesc::new(en.full_name());
    desc.comment = comments.get(file.name(), en.path());
    desc.values = en
        .values()
        .map(|value| EnumValueDesc {
            name: value.name().to_string(),
            number: value.number(),
            comment: comments.get(file.name(), value.path()),
        })
        .collect();
    desc
}

/// Read every extension set on an options message, keyed by field number.
fn custom_options(pool: &DescriptorPool, options: &DynamicMessage) -> Options {
    let extendee = options.descriptor();
    let mut out = Options::new();
    for ext in pool.all_extensions() {
        if ext.containing_message().full_name() != extendee.full_name() {
            continue;
        }
        if !options.has_extension(&ext) {
            continue;
        }
        let value = match options.get_extension(&ext).as_ref() {
            Value::Bool(b) => OptionValue::Bool(*b),
            Value::String(s) => OptionValue::String(s.clone()),
            _ => OptionValue::Other,
        };
        out.insert(ext.number(), value);
    }
    out
}

struct PoolComments {
    files: HashMap<String, CommentIndex>,
}

impl PoolComments {
    fn new(pool: &DescriptorPool) -> Self {
        let files = pool
            .files()
            .map(|file| {
                let index = file
                    .file_descriptor_proto()
                    .source_code_info
                    .as_ref()
                    .map(|info| {
                        info.location
                            .iter()
                            .filter_map(|loc| {
                                loc.leading_comments
                                    .as_ref()
                                    .map(|c| (loc.path.clone(), c.clone()))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (file.name().to_string(), index)
            })
            .collect();
        Self { files }
    }

    fn get(&self, file: &str, path: &[i32]) -> String {
        self.files
            .get(file)
            .and_then(|index| index.get(path))
            .cloned()
            .unwrap_or_default()
    }
}
