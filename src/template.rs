//! Schema rendering through a swappable Jinja template.
//!
//! A [`Renderer`] owns one parsed template. A custom template path is tried
//! first; if it cannot be read or does not parse, the failure is logged and
//! the embedded default is used instead. Only a broken embedded template is
//! fatal.
//!
//! # Template contract
//!
//! The root context is the serialized [`Schema`] of one service
//! (`service_name`, `source`, `root_query`, `root_mutation`, `types`,
//! `inputs`, `enums`). Templates may use these helpers:
//!
//! | helper                          | kind             | result                                   |
//! |---------------------------------|------------------|------------------------------------------|
//! | `pascal_case(s)`                | filter, function | `user_profile` -> `UserProfile`          |
//! | `camel_case(s)`                 | filter, function | `user_profile` -> `userProfile`          |
//! | `snake_case(s)`                 | filter, function | `UserProfile` -> `user_profile`          |
//! | `lower_first(s)`                | filter, function | `GetUser` -> `getUser`                   |
//! | `trim(s)`                       | filter, function | surrounding whitespace removed           |
//! | `trim_prefix(s, p)`             | filter, function | `s` without leading `p`                  |
//! | `trim_suffix(s, p)`             | filter, function | `s` without trailing `p`                 |
//! | `has_prefix(s, p)`              | filter, function | bool                                     |
//! | `has_suffix(s, p)`              | filter, function | bool                                     |
//! | `is_id_name(s)`                 | filter, function | `id`, `*_id`, `*Id`                      |
//! | `is_scalar(s)`                  | filter, function | built-in GraphQL scalar name             |
//! | `quote(s)`                      | filter, function | GraphQL string literal                   |
//! | `lookup(name)`                  | function         | type, input or enum of this schema       |
//! | `has_field_with_suffix(t, sfx)` | function         | bool                                     |
//! | `id_field_name(t)`              | function         | key field, else first id-shaped field    |

use crate::error::{Error, Result};
use crate::kind;
use crate::naming;
use crate::types::Schema;
use minijinja::{AutoEscape, Environment, State, Value};
use std::path::{Path, PathBuf};

/// Name the embedded template is registered under
pub const DEFAULT_TEMPLATE_NAME: &str = "graphql-service-schema.graphql.j2";

/// The embedded default template
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/graphql-service-schema.graphql.j2");

/// Where the active template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    Custom(PathBuf),
}

/// Renders schema models to SDL text
pub struct Renderer {
    env: Environment<'static>,
    template_name: String,
    source: TemplateSource,
}

impl Renderer {
    /// Load the custom template if given and valid, the embedded one otherwise.
    pub fn new(template_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = template_path {
            match std::fs::read_to_string(path) {
                Err(e) => tracing::warn!(
                    "could not read template from {}: {e}, falling back to embedded template",
                    path.display()
                ),
                Ok(content) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    match Self::from_source(name, content) {
                        Err(e) => tracing::warn!(
                            "failed to parse template from {}: {e}, falling back to embedded template",
                            path.display()
                        ),
                        Ok(mut renderer) => {
                            tracing::info!("using custom template from {}", path.display());
                            renderer.source = TemplateSource::Custom(path.to_path_buf());
                            return Ok(renderer);
                        }
                    }
                }
            }
        }

        Self::embedded()
    }

    /// Renderer for the embedded template.
    pub fn embedded() -> Result<Self> {
        let renderer = Self::from_source(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE)
            .map_err(Error::EmbeddedTemplate)?;
        tracing::info!("using embedded template");
        Ok(renderer)
    }

    /// Parse a template from source text.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> std::result::Result<Self, minijinja::Error> {
        let name = name.into();
        let mut env = environment();
        env.add_template_owned(name.clone(), source.into())?;
        Ok(Self {
            env,
            template_name: name,
            source: TemplateSource::Embedded,
        })
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Render one service schema.
    pub fn render(&self, schema: &Schema) -> Result<String> {
        let wrap = |source| Error::Template {
            service: schema.service_name.clone(),
            source,
        };
        let template = self.env.get_template(&self.template_name).map_err(wrap)?;
        template.render(schema).map_err(wrap)
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    register_helpers(&mut env);
    env
}

fn register_helpers(env: &mut Environment<'static>) {
    macro_rules! filter_and_function {
        ($($name:literal => $f:expr),* $(,)?) => {
            $(
                env.add_filter($name, $f);
                env.add_function($name, $f);
            )*
        };
    }

    filter_and_function! {
        "pascal_case" => |s: String| naming::pascal_case(&s),
        "camel_case" => |s: String| naming::camel_case(&s),
        "snake_case" => |s: String| naming::snake_case(&s),
        "lower_first" => |s: String| naming::lower_first(&s),
        "trim" => |s: String| s.trim().to_string(),
        "trim_prefix" => |s: String, prefix: String| {
            s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string()
        },
        "trim_suffix" => |s: String, suffix: String| {
            s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string()
        },
        "has_prefix" => |s: String, prefix: String| s.starts_with(prefix.as_str()),
        "has_suffix" => |s: String, suffix: String| s.ends_with(suffix.as_str()),
        "is_id_name" => |s: String| naming::is_id_name(&s),
        "is_scalar" => |s: String| kind::is_scalar(&s),
        "quote" => |s: String| quote(&s),
    }

    env.add_function("lookup", lookup);
    env.add_function("has_field_with_suffix", has_field_with_suffix);
    env.add_function("id_field_name", id_field_name);
}

/// GraphQL string literal for `s`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn lookup(state: &State, name: String) -> std::result::Result<Value, minijinja::Error> {
    for collection in ["types", "inputs", "enums"] {
        let Some(items) = state.lookup(collection) else {
            continue;
        };
        for item in items.try_iter()? {
            if item.get_attr("name")?.as_str() == Some(name.as_str()) {
                return Ok(item);
            }
        }
    }
    for root in ["root_query", "root_mutation"] {
        if let Some(item) = state.lookup(root) {
            if item.get_attr("name")?.as_str() == Some(name.as_str()) {
                return Ok(item);
            }
        }
    }
    Ok(Value::UNDEFINED)
}

fn fields_of(ty: &Value) -> std::result::Result<Vec<Value>, minijinja::Error> {
    if ty.is_undefined() || ty.is_none() {
        return Ok(Vec::new());
    }
    let fields = ty.get_attr("fields")?;
    if fields.is_undefined() || fields.is_none() {
        return Ok(Vec::new());
    }
    Ok(fields.try_iter()?.collect())
}

fn has_field_with_suffix(ty: Value, suffix: String) -> std::result::Result<bool, minijinja::Error> {
    for field in fields_of(&ty)? {
        if field
            .get_attr("name")?
            .as_str()
            .is_some_and(|name| name.ends_with(suffix.as_str()))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn id_field_name(ty: Value) -> std::result::Result<String, minijinja::Error> {
    if ty.is_undefined() || ty.is_none() {
        return Ok(String::new());
    }
    if ty.get_attr("is_federated_entity")?.is_true() {
        if let Some(key) = ty.get_attr("key_fields")?.as_str() {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
    }
    for field in fields_of(&ty)? {
        if let Some(name) = field.get_attr("name")?.as_str() {
            if naming::is_id_name(name) {
                return Ok(name.to_string());
            }
        }
    }
    Ok(String::new())
}
