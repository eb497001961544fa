//! Template rendering.
//!
//! The four network templates ship inside the binary. An override directory
//! may replace any of them by file name; templates it does not contain fall
//! back to the built-in copy.

pub mod helpers;

use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const CRYPTO_CONFIG_TEMPLATE: &str = "crypto-config-template.yaml";
pub const CONFIGTX_TEMPLATE: &str = "configtx-template.yaml";
pub const DOCKER_COMPOSE_TEMPLATE: &str = "docker-compose-template.yaml";
pub const PULL_IMAGES_TEMPLATE: &str = "pull-docker-images-template.yaml";

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    (
        CRYPTO_CONFIG_TEMPLATE,
        include_str!("../../templates/crypto-config-template.yaml"),
    ),
    (
        CONFIGTX_TEMPLATE,
        include_str!("../../templates/configtx-template.yaml"),
    ),
    (
        DOCKER_COMPOSE_TEMPLATE,
        include_str!("../../templates/docker-compose-template.yaml"),
    ),
    (
        PULL_IMAGES_TEMPLATE,
        include_str!("../../templates/pull-docker-images-template.yaml"),
    ),
];

/// Errors raised while loading or evaluating templates
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to read template {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template {name} failed: {source}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },
}

/// The set of templates used to render a network.
pub struct TemplateSet {
    tera: Tera,
}

impl TemplateSet {
    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self, RenderError> {
        Self::load(None)
    }

    /// Load every template, preferring files found in `override_dir`.
    pub fn load(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        helpers::register(&mut tera);

        for (name, builtin) in BUILTIN_TEMPLATES {
            let source = match override_dir.map(|dir| dir.join(name)) {
                Some(path) if path.is_file() => {
                    info!("Using template override {:?}", path);
                    std::fs::read_to_string(&path)
                        .map_err(|source| RenderError::Load { path, source })?
                }
                _ => builtin.to_string(),
            };

            tera.add_raw_template(name, &source)
                .map_err(|source| RenderError::Template {
                    name: name.to_string(),
                    source,
                })?;
        }

        Ok(Self { tera })
    }

    /// Evaluate template `name` against any serializable data object.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        let template_err = |source| RenderError::Template {
            name: name.to_string(),
            source,
        };
        let context = Context::from_serialize(data).map_err(template_err)?;
        let rendered = self.tera.render(name, &context).map_err(template_err)?;
        debug!("Rendered {} ({} bytes)", name, rendered.len());
        Ok(rendered)
    }
}
