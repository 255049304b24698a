use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolved reference `{reference}` at {location}")]
    UnresolvedReference { reference: String, location: String },

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("circular reference chain: {0}")]
    CircularRef(String),

    #[error("composition error in `{schema}`: {reason}")]
    Composition { schema: String, reason: String },

    #[error("naming collision for `{name}`: no free identifier after {attempts} attempts")]
    NamingCollision { name: String, attempts: usize },

    #[error("reserved word table has {found} entries, more than {floor} required")]
    ReservedWordTable { found: usize, floor: usize },
}

impl ResolveError {
    pub(crate) fn composition(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Composition {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no template variant `{variant}` available for `{subject}`")]
    VariantMissing { subject: String, variant: String },

    #[error("template `{template}` failed for `{subject}`: {message}")]
    Template {
        subject: String,
        template: String,
        message: String,
    },

    #[error("two generated files share the path `{0}`")]
    DuplicatePath(String),
}

/// The pipeline phase in which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolution,
    Rendering,
    Output,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Resolution => "resolution",
            Phase::Rendering => "rendering",
            Phase::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    #[error("rendering failed: {0}")]
    Rendering(#[from] RenderError),

    #[error("writing output failed: {0}")]
    Output(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GenerateError {
    pub fn phase(&self) -> Phase {
        match self {
            GenerateError::Resolution(_) => Phase::Resolution,
            GenerateError::Rendering(_) => Phase::Rendering,
            GenerateError::Output(_) => Phase::Output,
        }
    }
}
