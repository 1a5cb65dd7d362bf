use log::warn;

use crate::error::{ModelError, ResolveError};
use crate::ir::{IrParameter, IrParameterLocation, IrParameters, IrType};
use crate::parse::media_type::is_form_media_type;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::schema::{Schema, SchemaOrRef, TypeSet};

use super::doc_comment::normalize_doc;
use super::name_normalizer::normalize_name;
use super::type_mapper::{schema_or_ref_to_ir_type, schema_to_ir_type};

/// Output of resolving one raw parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    pub parameters: IrParameters,
    /// Named schemas the parameters reference, distinct, in order.
    pub dependencies: Vec<String>,
}

/// Turns raw parameter declarations into typed, location-tagged descriptors.
pub struct ParameterResolver<'r, 'a> {
    refs: &'r RefResolver<'a>,
    ignore: &'r [String],
}

impl<'r, 'a> ParameterResolver<'r, 'a> {
    /// `ignore` lists original parameter names that are dropped.
    pub fn new(refs: &'r RefResolver<'a>, ignore: &'r [String]) -> Self {
        Self { refs, ignore }
    }

    /// Resolve a parameter list in declaration order.
    ///
    /// A later parameter with the same name as an earlier one replaces it.
    pub fn resolve(&self, params: &[ParameterOrRef]) -> Result<ResolvedParameters, ModelError> {
        let mut parameters = IrParameters::new();

        for (index, param_or_ref) in params.iter().enumerate() {
            let param = self.refs.parameter(param_or_ref).map_err(|source| {
                ModelError::Parameter {
                    name: declared_name(param_or_ref, index),
                    source,
                }
            })?;
            let malformed = |source| ModelError::Parameter {
                name: declared_name(param_or_ref, index),
                source,
            };

            let Some(name) = param.name.as_deref() else {
                return Err(malformed(ResolveError::MissingField("name".to_string())));
            };
            if self.ignore.iter().any(|ignored| ignored == name) {
                continue;
            }

            let resolved = self.resolve_one(name, param).map_err(malformed)?;

            if resolved.location == IrParameterLocation::Body {
                if let Some(body) = parameters.body() {
                    warn!(
                        "body parameter `{}` replaces body parameter `{}`",
                        resolved.original_name, body.original_name
                    );
                }
            }
            if let Some(previous) = parameters.insert(resolved) {
                warn!(
                    "duplicate parameter `{}` ({}), keeping the later declaration",
                    previous.original_name,
                    previous.location.as_str()
                );
            }
        }

        let dependencies = parameters.dependencies();
        Ok(ResolvedParameters {
            parameters,
            dependencies,
        })
    }

    /// Resolve a 3.x request body into a body parameter. `None` when the
    /// body declares no content.
    pub fn resolve_request_body(
        &self,
        body: &RequestBodyOrRef,
    ) -> Result<Option<IrParameter>, ModelError> {
        let body = self
            .refs
            .request_body(body)
            .map_err(|source| ModelError::Parameter {
                name: DEFAULT_BODY_NAME.to_string(),
                source,
            })?;

        // Prefer application/json, fall back to first content type
        let Some((media_type, media)) = body
            .content
            .get_key_value("application/json")
            .or_else(|| body.content.first())
        else {
            return Ok(None);
        };

        let name = match &body.body_name {
            Some(name) => name.clone(),
            None if is_form_media_type(media_type) => FORM_BODY_NAME.to_string(),
            None => DEFAULT_BODY_NAME.to_string(),
        };

        let param_type = match &media.schema {
            Some(schema) => schema_or_ref_to_ir_type(self.refs, schema).map_err(|source| {
                ModelError::Parameter {
                    name: name.clone(),
                    source,
                }
            })?,
            None => IrType::Any,
        };

        Ok(Some(IrParameter {
            name: normalize_name(&name),
            original_name: name,
            location: IrParameterLocation::Body,
            param_type,
            required: body.required,
            default: media.schema.as_ref().and_then(schema_default),
            description: normalize_doc(body.description.as_deref()),
            media_type: Some(media_type.clone()),
        }))
    }

    fn resolve_one(&self, name: &str, param: &Parameter) -> Result<IrParameter, ResolveError> {
        let Some(location) = param.location else {
            return Err(ResolveError::MissingField("in".to_string()));
        };
        let location = match location {
            ParameterLocation::Path => IrParameterLocation::Path,
            ParameterLocation::Query => IrParameterLocation::Query,
            ParameterLocation::Header => IrParameterLocation::Header,
            ParameterLocation::Cookie => IrParameterLocation::Cookie,
            ParameterLocation::FormData => IrParameterLocation::Form,
            ParameterLocation::Body => IrParameterLocation::Body,
        };

        let param_type = match (&param.schema, param.schema_type) {
            (Some(schema), _) => schema_or_ref_to_ir_type(self.refs, schema)?,
            (None, _) if location == IrParameterLocation::Body => {
                return Err(ResolveError::MissingField("schema".to_string()));
            }
            (None, Some(_)) => schema_to_ir_type(self.refs, &inline_schema(param))?,
            (None, None) => IrType::Any,
        };

        let default = param
            .default_value
            .clone()
            .or_else(|| param.schema.as_ref().and_then(schema_default));

        Ok(IrParameter {
            name: normalize_name(name),
            original_name: name.to_string(),
            location,
            param_type,
            required: param.required,
            default,
            description: normalize_doc(param.description.as_deref()),
            media_type: None,
        })
    }
}

const DEFAULT_BODY_NAME: &str = "requestBody";
const FORM_BODY_NAME: &str = "formData";

/// Name to report for a malformed parameter: its own name, its `$ref`, or
/// its position in the list.
fn declared_name(param: &ParameterOrRef, index: usize) -> String {
    match param {
        ParameterOrRef::Parameter(p) => p
            .name
            .clone()
            .unwrap_or_else(|| format!("parameters[{index}]")),
        ParameterOrRef::Ref { ref_path } => ref_path.clone(),
    }
}

/// Swagger 2.0 non-body parameters carry their type inline.
fn inline_schema(param: &Parameter) -> Schema {
    Schema {
        schema_type: param.schema_type.map(TypeSet::Single),
        format: param.format.clone(),
        items: param.items.clone(),
        enum_values: param.enum_values.clone(),
        default_value: param.default_value.clone(),
        ..Schema::default()
    }
}

fn schema_default(schema: &SchemaOrRef) -> Option<serde_json::Value> {
    match schema {
        SchemaOrRef::Schema(s) => s.default_value.clone(),
        SchemaOrRef::Ref { .. } => None,
    }
}
