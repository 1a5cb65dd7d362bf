use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.opmodel.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpmodelConfig {
    pub input: String,
    pub naming: NamingConfig,
    pub parameters: ParametersConfig,
    pub responses: ResponsesConfig,
    pub on_error: FailurePolicy,
}

impl Default for OpmodelConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            naming: NamingConfig::default(),
            parameters: ParametersConfig::default(),
            responses: ResponsesConfig::default(),
            on_error: FailurePolicy::default(),
        }
    }
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Service name for operations without tags.
    pub default_service: String,
    /// Map from raw operation name (operationId or fallback) to custom alias.
    pub aliases: IndexMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            strategy: NamingStrategy::UseOperationId,
            default_service: DEFAULT_SERVICE.to_string(),
            aliases: IndexMap::new(),
        }
    }
}

/// Service name used when an operation declares no usable tag.
pub const DEFAULT_SERVICE: &str = "Service";

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `operationId`, falling back to `<method><Service>`.
    #[default]
    UseOperationId,
    /// Method + path, e.g. `GET /users/{id}` → `getUser`.
    UseRouteBased,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParametersConfig {
    /// Parameters (by original name) that never reach the model.
    pub ignore: Vec<String>,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            ignore: vec!["api-version".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponsesConfig {
    /// Lowest status code counted as an error.
    pub error_status_floor: u16,
    /// Whether the `default` response is an error rather than a result.
    pub default_is_error: bool,
    pub header_policy: ResponseHeaderPolicy,
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            error_status_floor: 400,
            default_is_error: false,
            header_policy: ResponseHeaderPolicy::default(),
        }
    }
}

/// What to do when several results nominate different response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseHeaderPolicy {
    /// Take the header of the first nominating result.
    #[default]
    FirstWins,
    /// Surface no header unless all nominations agree.
    RequireUnique,
}

/// What the traversal does with an operation that fails to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".opmodel.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OpmodelConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    let config: OpmodelConfig = serde_yaml_ng::from_str(&content).map_err(|source| {
        ConfigError::Parse {
            path: display,
            source,
        }
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# opmodel configuration
input: openapi.yaml

naming:
  strategy: use_operation_id  # use_operation_id | use_route_based
  default_service: Service    # service for operations without tags
  aliases: {}
    # getPetById: fetchPet    # raw operation name → custom name

parameters:
  ignore:
    - api-version

responses:
  error_status_floor: 400     # codes at or above this are errors
  default_is_error: false
  header_policy: first_wins   # first_wins | require_unique

on_error: abort               # abort | skip
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpmodelConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.naming.strategy, NamingStrategy::UseOperationId);
        assert_eq!(config.naming.default_service, "Service");
        assert!(config.naming.aliases.is_empty());
        assert_eq!(config.parameters.ignore, vec!["api-version"]);
        assert_eq!(config.responses.error_status_floor, 400);
        assert!(!config.responses.default_is_error);
        assert_eq!(
            config.responses.header_policy,
            ResponseHeaderPolicy::FirstWins
        );
        assert_eq!(config.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_default_content_matches_defaults() {
        let config: OpmodelConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.parameters.ignore, vec!["api-version"]);
        assert_eq!(config.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
naming:
  strategy: use_route_based
  default_service: Api
  aliases:
    getPetById: fetchPet
parameters:
  ignore: []
responses:
  error_status_floor: 300
  default_is_error: true
  header_policy: require_unique
on_error: skip
"#;
        let config: OpmodelConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.naming.strategy, NamingStrategy::UseRouteBased);
        assert_eq!(config.naming.default_service, "Api");
        assert_eq!(config.naming.aliases["getPetById"], "fetchPet");
        assert!(config.parameters.ignore.is_empty());
        assert_eq!(config.responses.error_status_floor, 300);
        assert!(config.responses.default_is_error);
        assert_eq!(
            config.responses.header_policy,
            ResponseHeaderPolicy::RequireUnique
        );
        assert_eq!(config.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: OpmodelConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.naming.default_service, "Service");
        assert_eq!(config.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "on_error: skip\n").unwrap();
        let loaded = load_config(&path).unwrap().unwrap();
        assert_eq!(loaded.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "on_error: explode\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
