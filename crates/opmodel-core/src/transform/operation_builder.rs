use log::{debug, warn};

use crate::config::{NamingStrategy, ResponseHeaderPolicy};
use crate::error::OperationError;
use crate::ir::{HttpMethod, IrOperation, IrParameters, IrResult};
use crate::parse::operation::Operation;
use crate::parse::ref_resolve::RefResolver;

use super::doc_comment::normalize_doc;
use super::name_normalizer::{
    normalize_name, normalize_path, operation_id_name, route_to_name, service_name,
};
use super::parameter_resolver::ParameterResolver;
use super::response_classifier::{ErrorPredicate, ResponseClassifier};
use super::spec_to_ir::TransformOptions;

/// Builds one [`IrOperation`] per (path, method) pair.
///
/// The builder only reads the document and its inputs. Inherited path-level
/// parameters are cloned before operation-level ones are merged over them.
pub struct OperationBuilder<'r, 'a> {
    refs: &'r RefResolver<'a>,
    options: &'r TransformOptions,
    predicate: &'r dyn ErrorPredicate,
}

impl<'r, 'a> OperationBuilder<'r, 'a> {
    /// A builder classifying responses with `options.error_threshold`.
    pub fn new(refs: &'r RefResolver<'a>, options: &'r TransformOptions) -> Self {
        Self {
            refs,
            options,
            predicate: &options.error_threshold,
        }
    }

    /// Replace the success/error boundary.
    pub fn with_predicate(mut self, predicate: &'r dyn ErrorPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn build(
        &self,
        path: &str,
        method: HttpMethod,
        op: &Operation,
        inherited: &IrParameters,
    ) -> Result<IrOperation, OperationError> {
        let fail = |source| OperationError::new(method, path, source);

        let service = service_name(&op.tags, &self.options.default_service);
        let raw_name = match self.options.naming_strategy {
            NamingStrategy::UseOperationId => {
                operation_id_name(op.operation_id.as_deref(), method, &service)
            }
            NamingStrategy::UseRouteBased => route_to_name(method.as_str(), path),
        };
        let name = match self.options.aliases.get(&raw_name) {
            Some(alias) => normalize_name(alias),
            None => normalize_name(&raw_name),
        };

        debug!("building {method} {path} as {}.{}", service, name);

        let resolver = ParameterResolver::new(self.refs, &self.options.ignored_parameters);
        let mut parameters = inherited.clone();

        if !op.parameters.is_empty() {
            let resolved = resolver.resolve(&op.parameters).map_err(fail)?;
            for param in resolved.parameters.iter() {
                if let Some(old) = inherited.get(param.key()) {
                    debug!(
                        "{method} {path}: `{}` overrides inherited {} parameter",
                        param.original_name,
                        old.location.as_str()
                    );
                }
            }
            parameters.merge(resolved.parameters);
        }

        if let Some(request_body) = &op.request_body {
            if let Some(body) = resolver.resolve_request_body(request_body).map_err(fail)? {
                parameters.insert(body);
            }
        }

        // Only parameters that survived the merge contribute dependencies
        let mut dependencies = parameters.dependencies();

        let classifier = ResponseClassifier::new(self.refs, self.predicate);
        let classified = classifier.classify(&op.responses).map_err(fail)?;
        for result in &classified.results {
            dependencies.extend(result.dependencies.iter().cloned());
        }
        let response_header = select_response_header(
            &classified.results,
            self.options.header_policy,
            method,
            path,
        );

        Ok(IrOperation {
            service,
            name,
            summary: normalize_doc(op.summary.as_deref()),
            description: normalize_doc(op.description.as_deref()),
            deprecated: op.deprecated.unwrap_or(false),
            method,
            path: normalize_path(path),
            parameters,
            dependencies,
            errors: classified.errors,
            results: classified.results,
            response_header,
        })
    }
}

/// The header surfaced as the operation's distinguished return value.
fn select_response_header(
    results: &[IrResult],
    policy: ResponseHeaderPolicy,
    method: HttpMethod,
    path: &str,
) -> Option<String> {
    let mut nominated = results.iter().filter_map(|r| r.header.as_deref());
    let first = nominated.next()?;
    if nominated.all(|name| name == first) {
        return Some(first.to_string());
    }

    match policy {
        ResponseHeaderPolicy::FirstWins => {
            warn!("{method} {path}: results nominate different headers, using `{first}`");
            Some(first.to_string())
        }
        ResponseHeaderPolicy::RequireUnique => {
            warn!("{method} {path}: results nominate different headers, surfacing none");
            None
        }
    }
}
