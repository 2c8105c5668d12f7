//! Maps protobuf field kinds onto GraphQL scalar type strings.

use crate::descriptor::FieldKind;

pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";
pub const ID: &str = "ID";

/// Base GraphQL scalar for a field kind.
///
/// Message kinds never reach this in practice (they resolve through the
/// registered type name); like any kind without a scalar mapping they fall
/// back to `String` rather than failing generation.
pub fn scalar_for(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Fixed32
        | FieldKind::Fixed64
        | FieldKind::Sfixed32
        | FieldKind::Sfixed64 => INT,
        FieldKind::Float | FieldKind::Double => FLOAT,
        FieldKind::Bool => BOOLEAN,
        FieldKind::String | FieldKind::Bytes | FieldKind::Enum(_) => STRING,
        FieldKind::Message(_) => STRING,
    }
}

/// Map a kind to a fully decorated GraphQL type string.
pub fn map_kind(kind: &FieldKind, repeated: bool, required: bool) -> String {
    decorate(scalar_for(kind), repeated, required)
}

/// Wrap a base type name in list and non-null markers.
pub fn decorate(base: &str, repeated: bool, required: bool) -> String {
    let mut ty = if repeated {
        format!("[{base}]")
    } else {
        base.to_string()
    };
    if required {
        ty.push('!');
    }
    ty
}

/// Whether a type name is one of the built-in GraphQL scalars.
pub fn is_scalar(name: &str) -> bool {
    matches!(name, INT | FLOAT | STRING | BOOLEAN | ID)
}
