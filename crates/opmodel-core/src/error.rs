use thiserror::Error;

use crate::ir::HttpMethod;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid status code: {0}")]
    InvalidStatusCode(String),
}

/// A collaborator failure, identified by the parameter or response it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("malformed parameter `{name}`: {source}")]
    Parameter {
        name: String,
        #[source]
        source: ResolveError,
    },

    #[error("malformed response `{status}`: {source}")]
    Response {
        status: String,
        #[source]
        source: ResolveError,
    },
}

/// The single-operation failure: construction of `method path` was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {path}: {source}")]
pub struct OperationError {
    pub method: HttpMethod,
    pub path: String,
    #[source]
    pub source: ModelError,
}

impl OperationError {
    pub fn new(method: HttpMethod, path: &str, source: ModelError) -> Self {
        Self {
            method,
            path: path.to_string(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("operation failed: {0}")]
    Operation(#[from] OperationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
