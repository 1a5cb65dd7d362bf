use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::{
    DEFAULT_SERVICE, FailurePolicy, NamingStrategy, OpmodelConfig, ResponseHeaderPolicy,
};
use crate::error::{OperationError, TransformError};
use crate::ir::*;
use crate::parse;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::spec::OpenApiSpec;

use super::operation_builder::OperationBuilder;
use super::parameter_resolver::ParameterResolver;
use super::response_classifier::StatusThreshold;

/// Options controlling naming, parameter filtering, response classification
/// and failure handling.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub naming_strategy: NamingStrategy,
    pub aliases: IndexMap<String, String>,
    pub default_service: String,
    pub ignored_parameters: Vec<String>,
    pub error_threshold: StatusThreshold,
    pub header_policy: ResponseHeaderPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self::from_config(&OpmodelConfig::default())
    }
}

impl TransformOptions {
    pub fn from_config(config: &OpmodelConfig) -> Self {
        let default_service = if config.naming.default_service.trim().is_empty() {
            DEFAULT_SERVICE.to_string()
        } else {
            config.naming.default_service.clone()
        };
        Self {
            naming_strategy: config.naming.strategy,
            aliases: config.naming.aliases.clone(),
            default_service,
            ignored_parameters: config.parameters.ignore.clone(),
            error_threshold: StatusThreshold {
                floor: config.responses.error_status_floor,
                default_is_error: config.responses.default_is_error,
            },
            header_policy: config.responses.header_policy,
            failure_policy: config.on_error,
        }
    }
}

/// Transform a parsed document into operation models with default options.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    transform_with_options(spec, &TransformOptions::default())
}

/// Transform with explicit options.
pub fn transform_with_options(
    spec: &OpenApiSpec,
    options: &TransformOptions,
) -> Result<IrSpec, TransformError> {
    let refs = RefResolver::new(spec);
    let (operations, failures) = resolve_operations(&refs, options)?;
    let modules = group_into_modules(&operations);

    let info = IrInfo {
        title: spec.info.title.clone(),
        description: spec.info.description.clone(),
        version: spec.info.version.clone(),
    };

    Ok(IrSpec {
        info,
        servers: resolve_servers(spec),
        operations,
        modules,
        failures,
    })
}

/// Parse the document at `path` and transform it.
pub fn load(path: &Path, options: &TransformOptions) -> Result<IrSpec, TransformError> {
    let spec = parse::from_path(path)?;
    transform_with_options(&spec, options)
}

fn resolve_operations(
    refs: &RefResolver<'_>,
    options: &TransformOptions,
) -> Result<(Vec<IrOperation>, Vec<OperationError>), TransformError> {
    let resolver = ParameterResolver::new(refs, &options.ignored_parameters);
    let builder = OperationBuilder::new(refs, options);
    let mut operations = Vec::new();
    let mut failures = Vec::new();

    for (path, item) in &refs.spec().paths {
        // Path-level parameters are shared by every method on the path
        let inherited = resolver.resolve(&item.parameters).map(|r| r.parameters);

        for (method, op) in path_operations(item) {
            let built = match &inherited {
                Ok(params) => builder.build(path, method, op, params),
                Err(err) => Err(OperationError::new(method, path, err.clone())),
            };

            match built {
                Ok(operation) => operations.push(operation),
                Err(err) => match options.failure_policy {
                    FailurePolicy::Abort => return Err(err.into()),
                    FailurePolicy::Skip => {
                        warn!("skipping operation: {err}");
                        failures.push(err);
                    }
                },
            }
        }
    }

    debug!(
        "built {} operations, skipped {}",
        operations.len(),
        failures.len()
    );
    Ok((operations, failures))
}

/// The operations of a path item, in traversal order.
fn path_operations(item: &PathItem) -> Vec<(HttpMethod, &Operation)> {
    HttpMethod::ALL
        .into_iter()
        .filter_map(|method| {
            let op = match method {
                HttpMethod::Get => &item.get,
                HttpMethod::Post => &item.post,
                HttpMethod::Put => &item.put,
                HttpMethod::Delete => &item.delete,
                HttpMethod::Patch => &item.patch,
                HttpMethod::Options => &item.options,
                HttpMethod::Head => &item.head,
                HttpMethod::Trace => &item.trace,
            };
            op.as_ref().map(|op| (method, op))
        })
        .collect()
}

/// 3.x `servers`, or a single server assembled from 2.0 `schemes`, `host`
/// and `basePath`.
fn resolve_servers(spec: &OpenApiSpec) -> Vec<IrServer> {
    if !spec.servers.is_empty() {
        return spec
            .servers
            .iter()
            .map(|s| IrServer {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();
    }

    let base_path = spec.base_path.as_deref().unwrap_or_default();
    let url = match &spec.host {
        Some(host) => {
            let scheme = spec.schemes.first().map(String::as_str).unwrap_or("https");
            format!("{scheme}://{host}{base_path}")
        }
        None if !base_path.is_empty() => base_path.to_string(),
        None => return Vec::new(),
    };
    vec![IrServer {
        url,
        description: None,
    }]
}

fn group_into_modules(operations: &[IrOperation]) -> Vec<IrModule> {
    let mut service_groups: BTreeMap<&str, (NormalizedName, Vec<usize>)> = BTreeMap::new();

    for (i, op) in operations.iter().enumerate() {
        service_groups
            .entry(op.service.pascal_case.as_str())
            .or_insert_with(|| (op.service.clone(), Vec::new()))
            .1
            .push(i);
    }

    service_groups
        .into_values()
        .map(|(name, operations)| IrModule { name, operations })
        .collect()
}
