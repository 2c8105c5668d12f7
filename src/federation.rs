//! Apollo Federation classification
//!
//! Decides whether a message becomes a federated entity and which of its
//! fields is the `@key`. Explicit `metadata.v1` options always win; when a
//! descriptor carries no readable option the classifier falls back to a name
//! heuristic so unannotated protos still produce usable federated schemas.
//! Every fallback that yields `true` is logged at `warn`.

use crate::descriptor::{FieldDesc, MessageDesc, OptionValue, Options};
use crate::naming;

/// `metadata.v1.entity` on `google.protobuf.MessageOptions`
pub const ENTITY_OPTION: u32 = 50001;
/// `metadata.v1.key` on `google.protobuf.FieldOptions`
pub const KEY_OPTION: u32 = 50001;
/// `metadata.v1.external` on `google.protobuf.FieldOptions`
pub const EXTERNAL_OPTION: u32 = 50002;
/// `metadata.v1.requires` on `google.protobuf.FieldOptions`
pub const REQUIRES_OPTION: u32 = 50003;
/// `metadata.v1.computed_from` on `google.protobuf.FieldOptions`
pub const COMPUTED_FROM_OPTION: u32 = 50004;

/// Message names treated as entities when no explicit option is present.
pub const ENTITY_NAMES: &[&str] = &["Product", "Order", "User"];

/// Outcome of a two-step classification.
///
/// Keeps "explicitly not a key" apart from "no metadata, heuristic said no".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    ExplicitTrue,
    ExplicitFalse,
    Heuristic(bool),
}

impl Resolution {
    pub fn value(self) -> bool {
        match self {
            Resolution::ExplicitTrue => true,
            Resolution::ExplicitFalse => false,
            Resolution::Heuristic(v) => v,
        }
    }

    pub fn is_explicit(self) -> bool {
        !matches!(self, Resolution::Heuristic(_))
    }

    fn resolve(
        options: &Options,
        number: u32,
        subject: &str,
        name: &str,
        heuristic: impl FnOnce() -> bool,
    ) -> Self {
        match options.get(&number) {
            Some(OptionValue::Bool(true)) => return Resolution::ExplicitTrue,
            Some(OptionValue::Bool(false)) => return Resolution::ExplicitFalse,
            Some(other) => tracing::warn!(
                "{subject} option {number} on {name} is not a bool ({other:?}), using name heuristic"
            ),
            None => {}
        }

        let inferred = heuristic();
        if inferred {
            tracing::warn!("{name} has no {subject} option, treated as {subject} by name");
        }
        Resolution::Heuristic(inferred)
    }
}

/// Whether a message is an entity.
pub fn classify_entity(message: &MessageDesc) -> Resolution {
    Resolution::resolve(
        &message.options,
        ENTITY_OPTION,
        "entity",
        &message.full_name,
        || ENTITY_NAMES.contains(&message.name.as_str()),
    )
}

/// Whether a field is a key field.
pub fn classify_key(field: &FieldDesc) -> Resolution {
    Resolution::resolve(&field.options, KEY_OPTION, "key", &field.name, || {
        naming::is_id_name(&field.name)
    })
}

/// Federation settings for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityConfig {
    pub entity: Resolution,
    /// Proto name of the first key field, if any
    pub key_field: Option<String>,
}

impl EntityConfig {
    /// Classify a message and pick its key field.
    ///
    /// Only a single key is recorded: the first field, in declaration order,
    /// whose key resolution is true.
    pub fn for_message(message: &MessageDesc) -> Self {
        let entity = classify_entity(message);
        let key_field = if entity == Resolution::ExplicitFalse {
            None
        } else {
            message
                .fields
                .iter()
                .find(|field| classify_key(field).value())
                .map(|field| field.name.clone())
        };

        if key_field.is_none() && entity.value() {
            tracing::warn!(
                "{} is an entity but has no key field, emitting it without @key",
                message.full_name
            );
        }

        Self { entity, key_field }
    }

    pub fn is_federated(&self) -> bool {
        self.key_field.is_some()
    }
}

/// Field-level federation directives read from explicit options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDirectives {
    pub external: bool,
    pub requires: Option<String>,
    pub computed_from: Option<String>,
}

impl FieldDirectives {
    pub fn for_field(field: &FieldDesc) -> Self {
        let non_empty = |number: u32| {
            field
                .options
                .get(&number)
                .and_then(OptionValue::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            external: field
                .options
                .get(&EXTERNAL_OPTION)
                .and_then(OptionValue::as_bool)
                .unwrap_or(false),
            requires: non_empty(REQUIRES_OPTION),
            computed_from: non_empty(COMPUTED_FROM_OPTION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldKind;

    fn string_field(name: &str) -> FieldDesc {
        FieldDesc::new(name, FieldKind::String)
    }

    #[test]
    fn key_by_name_heuristic() {
        assert_eq!(classify_key(&string_field("user_id")), Resolution::Heuristic(true));
        assert_eq!(classify_key(&string_field("userId")), Resolution::Heuristic(true));
        assert_eq!(classify_key(&string_field("name")), Resolution::Heuristic(false));
    }

    #[test]
    fn explicit_key_wins_over_heuristic() {
        let not_key = string_field("user_id").with_option(KEY_OPTION, OptionValue::Bool(false));
        assert_eq!(classify_key(&not_key), Resolution::ExplicitFalse);
        assert!(!classify_key(&not_key).value());

        let key = string_field("sku").with_option(KEY_OPTION, OptionValue::Bool(true));
        assert_eq!(classify_key(&key), Resolution::ExplicitTrue);
    }

    #[test]
    fn unreadable_option_falls_back() {
        let field = string_field("user_id").with_option(KEY_OPTION, OptionValue::Other);
        assert_eq!(classify_key(&field), Resolution::Heuristic(true));
        assert!(!classify_key(&field).is_explicit());
    }

    #[test]
    fn entity_by_name() {
        assert_eq!(
            classify_entity(&MessageDesc::new("shop.v1.Product")),
            Resolution::Heuristic(true)
        );
        assert_eq!(
            classify_entity(&MessageDesc::new("shop.v1.Widget")),
            Resolution::Heuristic(false)
        );
        let explicit = MessageDesc::new("shop.v1.Product")
            .with_option(ENTITY_OPTION, OptionValue::Bool(false));
        assert_eq!(classify_entity(&explicit), Resolution::ExplicitFalse);
    }

    #[test]
    fn first_key_field_wins() {
        let message = MessageDesc::new("shop.v1.Order")
            .with_field(string_field("order_id"))
            .with_field(string_field("user_id"));
        let config = EntityConfig::for_message(&message);
        assert!(config.is_federated());
        assert_eq!(config.key_field.as_deref(), Some("order_id"));
    }

    #[test]
    fn explicit_non_entity_is_never_federated() {
        let message = MessageDesc::new("shop.v1.Audit")
            .with_option(ENTITY_OPTION, OptionValue::Bool(false))
            .with_field(string_field("audit_id"));
        let config = EntityConfig::for_message(&message);
        assert_eq!(config.entity, Resolution::ExplicitFalse);
        assert!(!config.is_federated());
    }

    #[test]
    fn entity_without_key_is_not_federated() {
        let message = MessageDesc::new("shop.v1.User").with_field(string_field("email"));
        let config = EntityConfig::for_message(&message);
        assert!(config.entity.value());
        assert!(!config.is_federated());
    }

    #[test]
    fn field_directives_from_options() {
        let field = string_field("price")
            .with_option(EXTERNAL_OPTION, OptionValue::Bool(true))
            .with_option(REQUIRES_OPTION, OptionValue::String("currency".into()))
            .with_option(COMPUTED_FROM_OPTION, OptionValue::String("  ".into()));
        let directives = FieldDirectives::for_field(&field);
        assert!(directives.external);
        assert_eq!(directives.requires.as_deref(), Some("currency"));
        assert_eq!(directives.computed_from, None);

        assert_eq!(FieldDirectives::for_field(&string_field("x")), FieldDirectives::default());
    }
}
