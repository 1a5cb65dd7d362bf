pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod server;
pub mod spec;

use std::fs;
use std::path::Path;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI or Swagger spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI or Swagger spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Read a spec file, picking the format from its extension (YAML unless `.json`).
pub fn from_path(path: &Path) -> Result<OpenApiSpec, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    match (&spec.swagger, &spec.openapi) {
        (Some(v), None) if v.starts_with("2.") => Ok(()),
        (None, Some(v)) if v.starts_with("3.") => Ok(()),
        (None, None) => Err(ParseError::MissingField("openapi".to_string())),
        _ => Err(ParseError::UnsupportedVersion(spec.version().to_string())),
    }
}
