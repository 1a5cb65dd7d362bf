use indexmap::IndexMap;

use crate::error::{ModelError, ResolveError};
use crate::ir::{IrOperationError, IrResult, IrType, StatusCode};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::response::{Response, ResponseOrRef};

use super::doc_comment::normalize_doc;
use super::type_mapper::schema_or_ref_to_ir_type;

/// Decides which status codes are failures.
pub trait ErrorPredicate {
    fn is_error(&self, status: &StatusCode) -> bool;
}

impl<F> ErrorPredicate for F
where
    F: Fn(&StatusCode) -> bool,
{
    fn is_error(&self, status: &StatusCode) -> bool {
        self(status)
    }
}

/// The default predicate: codes at or above `floor` are errors, a range
/// counts from its lowest code, and `default` is governed by its own flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusThreshold {
    pub floor: u16,
    pub default_is_error: bool,
}

impl Default for StatusThreshold {
    fn default() -> Self {
        Self {
            floor: 400,
            default_is_error: false,
        }
    }
}

impl ErrorPredicate for StatusThreshold {
    fn is_error(&self, status: &StatusCode) -> bool {
        match status {
            StatusCode::Code(code) => *code >= self.floor,
            StatusCode::Range(class) => u16::from(*class) * 100 >= self.floor,
            StatusCode::Default => self.default_is_error,
        }
    }
}

/// Responses of one operation, split by the error predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedResponses {
    pub results: Vec<IrResult>,
    pub errors: Vec<IrOperationError>,
}

pub struct ResponseClassifier<'r, 'a> {
    refs: &'r RefResolver<'a>,
    predicate: &'r dyn ErrorPredicate,
}

impl<'r, 'a> ResponseClassifier<'r, 'a> {
    pub fn new(refs: &'r RefResolver<'a>, predicate: &'r dyn ErrorPredicate) -> Self {
        Self { refs, predicate }
    }

    /// Partition every declared status code into results or errors, each
    /// sorted by status code.
    pub fn classify(
        &self,
        responses: &IndexMap<String, ResponseOrRef>,
    ) -> Result<ClassifiedResponses, ModelError> {
        let mut classified = ClassifiedResponses::default();

        for (key, response_or_ref) in responses {
            let malformed = |source| ModelError::Response {
                status: key.clone(),
                source,
            };
            let status: StatusCode = key.parse().map_err(malformed)?;
            let response = self.refs.response(response_or_ref).map_err(malformed)?;

            // Every response is type-checked; errors keep only status and text
            let (result_type, media_type) = self.content_type(response).map_err(malformed)?;
            let description = normalize_doc(response.description.as_deref());

            if self.predicate.is_error(&status) {
                classified.errors.push(IrOperationError {
                    status,
                    description,
                });
            } else {
                classified.results.push(IrResult {
                    status,
                    dependencies: result_type.dependencies(),
                    result_type,
                    media_type,
                    description,
                    header: response.headers.keys().next().cloned(),
                });
            }
        }

        classified.results.sort_by_key(|r| r.status);
        classified.errors.sort_by_key(|e| e.status);
        Ok(classified)
    }

    /// Swagger 2.0 `schema`, else 3.x `content` preferring `application/json`.
    fn content_type(&self, response: &Response) -> Result<(IrType, Option<String>), ResolveError> {
        if let Some(schema) = &response.schema {
            return Ok((schema_or_ref_to_ir_type(self.refs, schema)?, None));
        }

        let Some((media_type, media)) = response
            .content
            .get_key_value("application/json")
            .or_else(|| response.content.first())
        else {
            return Ok((IrType::Void, None));
        };

        let result_type = match &media.schema {
            Some(schema) => schema_or_ref_to_ir_type(self.refs, schema)?,
            None => IrType::Any,
        };
        Ok((result_type, Some(media_type.clone())))
    }
}
