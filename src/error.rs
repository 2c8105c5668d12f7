//! Error types for the GraphQL schema generator

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the generator
///
/// Recoverable conditions (missing custom template, unknown field kinds,
/// dangling descriptor references) never surface here; they are logged and
/// generation carries on. Everything in this enum aborts the invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor set handed to us could not be decoded
    #[error("failed to decode descriptor set: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),

    /// Plugin request decode errors
    #[error("failed to decode plugin request: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Plugin response encode errors
    #[error("failed to encode plugin response: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The compiled-in default template does not parse (broken build)
    #[error("embedded template is invalid: {0}")]
    EmbeddedTemplate(#[source] minijinja::Error),

    /// Rendering the schema of one service failed
    #[error("failed to render schema for service {service}: {source}")]
    Template {
        service: String,
        #[source]
        source: minijinja::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short machine readable code, used when reporting back to protoc
    pub fn code(&self) -> &'static str {
        match self {
            Error::Descriptor(_) => "DESCRIPTOR_ERROR",
            Error::Decode(_) => "DECODE_ERROR",
            Error::Encode(_) => "ENCODE_ERROR",
            Error::EmbeddedTemplate(_) => "EMBEDDED_TEMPLATE_ERROR",
            Error::Template { .. } => "TEMPLATE_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Name of the service whose output failed, if the error is scoped to one
    pub fn service(&self) -> Option<&str> {
        match self {
            Error::Template { service, .. } => Some(service),
            _ => None,
        }
    }
}
