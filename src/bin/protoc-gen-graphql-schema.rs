//! protoc plugin that emits one GraphQL schema (`<package.Service>.graphql`)
//! per service in the `.proto` files it is asked to generate for.
//!
//! ```text
//! protoc --graphql-schema_out=schemas \
//!        --graphql-schema_opt=template_path=templates/schema.graphql.j2 \
//!        product/v1/product.proto
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries the
//! `CodeGeneratorResponse`.

use anyhow::Context as _;
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use protoc_gen_graphql_schema::{DescriptorSet, Generator, GeneratorOptions};

use std::io::{Read, Write};

/// `CodeGeneratorRequest` with the descriptors left encoded, so custom options
/// survive into the descriptor pool.
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: ::prost::alloc::vec::Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .init();

    // Read CodeGeneratorRequest from stdin
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("failed to read plugin request")?;
    let request = RawCodeGeneratorRequest::decode(&*input)
        .map_err(protoc_gen_graphql_schema::Error::from)?;

    let response = match generate(&request) {
        Ok(file) => CodeGeneratorResponse {
            file,
            supported_features: Some(
                code_generator_response::Feature::Proto3Optional as u64,
            ),
            ..Default::default()
        },
        Err(err) => {
            tracing::error!("{err:#}");
            CodeGeneratorResponse {
                error: Some(format!("{err:#}")),
                ..Default::default()
            }
        }
    };

    let mut output = Vec::new();
    response
        .encode(&mut output)
        .map_err(protoc_gen_graphql_schema::Error::from)?;
    std::io::stdout()
        .write_all(&output)
        .context("failed to write plugin response")?;
    Ok(())
}

fn generate(request: &RawCodeGeneratorRequest) -> anyhow::Result<Vec<code_generator_response::File>> {
    let options = GeneratorOptions::parse(request.parameter.as_deref());
    let pool = build_descriptor_pool(request)?;
    let descriptors = DescriptorSet::from_pool(&pool, &request.file_to_generate);

    let generator = Generator::new(&options)?;
    let files = generator.generate(&descriptors)?;
    tracing::info!("generated {} schema file(s)", files.len());

    Ok(files
        .into_iter()
        .map(|file| code_generator_response::File {
            name: Some(file.name),
            insertion_point: None,
            content: Some(file.content),
            generated_code_info: None,
        })
        .collect())
}

fn build_descriptor_pool(
    request: &RawCodeGeneratorRequest,
) -> protoc_gen_graphql_schema::Result<DescriptorPool> {
    let fds = RawFileDescriptorSet {
        file: request.proto_file.clone(),
    };
    let mut bytes = Vec::new();
    fds.encode(&mut bytes)?;
    Ok(DescriptorPool::decode(bytes.as_slice())?)
}
