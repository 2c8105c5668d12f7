//! # protoc-gen-graphql-schema
//!
//! Translates gRPC service descriptors into GraphQL SDL with Apollo Federation
//! `@key` directives, one schema file per service.
//!
//! ## Pipeline
//!
//! - [`DescriptorSet`]: minimal descriptor IR, filled from a `prost_reflect`
//!   pool ([`DescriptorSet::from_pool`]) or assembled by hand.
//! - [`SchemaBuilder`]: walks every service's methods and the message graph
//!   reachable from them, producing a deduplicated [`Schema`] per service.
//!   Field types come from the [`kind`] mapper and [`naming`] normalizer;
//!   entities and keys come from the [`federation`] classifier.
//! - [`Renderer`]: renders a [`Schema`] through a Jinja template, custom or
//!   embedded. See [`template`] for the helper functions templates can use.
//! - [`Generator`]: ties the above together for one plugin invocation.
//!
//! Generation is pure and deterministic: the same descriptors always yield
//! byte-identical output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use protoc_gen_graphql_schema::{DescriptorSet, Generator, GeneratorOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = prost_reflect::DescriptorPool::decode(std::fs::read("descriptor.bin")?.as_slice())?;
//!     let descriptors = DescriptorSet::from_pool(&pool, &[]);
//!
//!     let generator = Generator::new(&GeneratorOptions::default())?;
//!     for file in generator.generate(&descriptors)? {
//!         std::fs::write(&file.name, file.content)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod descriptor;
pub mod error;
pub mod federation;
pub mod generator;
pub mod kind;
pub mod naming;
pub mod reflect;
pub mod schema;
pub mod template;
pub mod types;

pub use descriptor::DescriptorSet;
pub use error::{Error, Result};
pub use federation::{EntityConfig, FieldDirectives, Resolution};
pub use generator::{GeneratedFile, Generator, GeneratorOptions};
pub use schema::SchemaBuilder;
pub use template::{Renderer, TemplateSource};
pub use types::{Enum, EnumOption, Field, Input, Schema, SchemaType, Type};
