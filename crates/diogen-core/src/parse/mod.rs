//! The OpenAPI document model and its loaders.
//!
//! Parsing only checks syntax and the major version; references are
//! checked by [`ref_resolve::RefIndex`] when the document is resolved.

pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_swagger_2() {
        let err = from_yaml("openapi: '2.0'\ninfo:\n  title: t\n  version: '1'\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn parses_minimal_json() {
        let spec = from_json(r#"{"openapi":"3.0.3","info":{"title":"T","version":"1"}}"#).unwrap();
        assert!(spec.paths.is_empty());
        assert!(spec.components.is_none());
    }
}
