//! One generation pass: descriptors in, one `.graphql` file per service out.

use crate::descriptor::DescriptorSet;
use crate::error::Result;
use crate::schema::SchemaBuilder;
use crate::template::{Renderer, TemplateSource};
use std::path::PathBuf;

/// Options parsed from the protoc plugin parameter string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Custom template; the embedded template is used when absent or invalid
    pub template_path: Option<PathBuf>,
}

impl GeneratorOptions {
    /// Parse `key=value` pairs separated by commas.
    pub fn parse(param: Option<&str>) -> Self {
        let mut opts = Self::default();
        let Some(param) = param else {
            return opts;
        };

        for part in param.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()) {
            match part.split_once('=').map(|(k, v)| (k.trim(), v.trim())) {
                Some(("template_path", path)) if !path.is_empty() => {
                    opts.template_path = Some(PathBuf::from(path));
                }
                _ => tracing::warn!("ignoring unknown plugin option {part:?}"),
            }
        }

        opts
    }
}

/// A generated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// `<fully.qualified.ServiceName>.graphql`
    pub name: String,
    pub content: String,
}

/// Generates GraphQL SDL for every service in a descriptor set
pub struct Generator {
    renderer: Renderer,
}

impl Generator {
    pub fn new(options: &GeneratorOptions) -> Result<Self> {
        Ok(Self {
            renderer: Renderer::new(options.template_path.as_deref())?,
        })
    }

    pub fn with_renderer(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn template_source(&self) -> &TemplateSource {
        self.renderer.source()
    }

    /// Build and render every service. The first render failure aborts the
    /// whole pass; no partial output is returned.
    pub fn generate(&self, descriptors: &DescriptorSet) -> Result<Vec<GeneratedFile>> {
        let schemas = SchemaBuilder::new(descriptors).build();
        let mut files = Vec::with_capacity(schemas.len());
        for (service, schema) in &schemas {
            tracing::debug!(
                "rendering {service}: {} types, {} inputs, {} enums",
                schema.types.len(),
                schema.inputs.len(),
                schema.enums.len()
            );
            files.push(GeneratedFile {
                name: format!("{service}.graphql"),
                content: self.renderer.render(schema)?,
            });
        }
        Ok(files)
    }
}
