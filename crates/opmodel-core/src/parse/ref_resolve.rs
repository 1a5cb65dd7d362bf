use indexmap::IndexMap;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::SchemaOrRef;
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// The reusable-definition section a `$ref` points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Schemas,
    Parameters,
    Responses,
    RequestBodies,
}

/// Looks up `$ref` targets in a parsed document.
///
/// Understands both the 3.x layout (`#/components/<section>/<name>`) and the
/// Swagger 2.0 layout (`#/definitions/<name>`, `#/parameters/<name>`,
/// `#/responses/<name>`). Chains of references are followed; a chain that
/// revisits a pointer is reported as circular.
pub struct RefResolver<'a> {
    spec: &'a OpenApiSpec,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'a OpenApiSpec {
        self.spec
    }

    /// Resolve a parameter, following references until an inline definition.
    pub fn parameter<'p>(&self, param: &'p ParameterOrRef) -> Result<&'p Parameter, ResolveError>
    where
        'a: 'p,
    {
        let mut current = param;
        let mut seen: Vec<&'p str> = Vec::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(&**p),
                ParameterOrRef::Ref { ref_path } => {
                    guard_cycle(&mut seen, ref_path)?;
                    let name = expect_section(ref_path, Section::Parameters)?;
                    current = self
                        .parameters_table()
                        .and_then(|table| table.get(name.as_str()))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    /// Resolve a response, following references until an inline definition.
    pub fn response<'p>(&self, response: &'p ResponseOrRef) -> Result<&'p Response, ResolveError>
    where
        'a: 'p,
    {
        let mut current = response;
        let mut seen: Vec<&'p str> = Vec::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    guard_cycle(&mut seen, ref_path)?;
                    let name = expect_section(ref_path, Section::Responses)?;
                    current = self
                        .responses_table()
                        .and_then(|table| table.get(name.as_str()))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    /// Resolve a request body, following references until an inline definition.
    pub fn request_body<'p>(
        &self,
        body: &'p RequestBodyOrRef,
    ) -> Result<&'p RequestBody, ResolveError>
    where
        'a: 'p,
    {
        let mut current = body;
        let mut seen: Vec<&'p str> = Vec::new();
        loop {
            match current {
                RequestBodyOrRef::RequestBody(rb) => return Ok(rb),
                RequestBodyOrRef::Ref { ref_path } => {
                    guard_cycle(&mut seen, ref_path)?;
                    let name = expect_section(ref_path, Section::RequestBodies)?;
                    current = self
                        .spec
                        .components
                        .as_ref()
                        .and_then(|c| c.request_bodies.get(name.as_str()))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    /// Name of the schema a `$ref` points to, after checking that it exists.
    pub fn schema_name(&self, ref_path: &str) -> Result<String, ResolveError> {
        let name = expect_section(ref_path, Section::Schemas)?;
        if self.schemas_table().contains_key(name.as_str()) {
            Ok(name)
        } else {
            Err(ResolveError::RefTargetNotFound(ref_path.to_string()))
        }
    }

    fn schemas_table(&self) -> &'a IndexMap<String, SchemaOrRef> {
        match &self.spec.components {
            Some(c) if !self.spec.is_swagger2() => &c.schemas,
            _ => &self.spec.definitions,
        }
    }

    fn parameters_table(&self) -> Option<&'a IndexMap<String, ParameterOrRef>> {
        if self.spec.is_swagger2() {
            Some(&self.spec.parameters)
        } else {
            self.spec.components.as_ref().map(|c| &c.parameters)
        }
    }

    fn responses_table(&self) -> Option<&'a IndexMap<String, ResponseOrRef>> {
        if self.spec.is_swagger2() {
            Some(&self.spec.responses)
        } else {
            self.spec.components.as_ref().map(|c| &c.responses)
        }
    }
}

fn guard_cycle<'a>(seen: &mut Vec<&'a str>, ref_path: &'a str) -> Result<(), ResolveError> {
    if seen.contains(&ref_path) {
        return Err(ResolveError::CircularRef(ref_path.to_string()));
    }
    seen.push(ref_path);
    Ok(())
}

/// Parse a local `$ref` and check that it points into `expected`.
fn expect_section(ref_path: &str, expected: Section) -> Result<String, ResolveError> {
    let (section, name) = parse_ref(ref_path)?;
    if section != expected {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected a {:?} reference, got {}",
            expected, ref_path
        )));
    }
    Ok(name)
}

/// Split a `$ref` like `#/components/schemas/Foo` or `#/definitions/Foo`
/// into its section and (unescaped) name.
fn parse_ref(ref_path: &str) -> Result<(Section, String), ResolveError> {
    let invalid = || ResolveError::InvalidRefFormat(ref_path.to_string());

    let pointer = ref_path.strip_prefix("#/").ok_or_else(invalid)?;
    let (head, rest) = pointer.split_once('/').ok_or_else(invalid)?;

    let (section, name) = match head {
        "components" => {
            let (kind, name) = rest.split_once('/').ok_or_else(invalid)?;
            let section = match kind {
                "schemas" => Section::Schemas,
                "parameters" => Section::Parameters,
                "responses" => Section::Responses,
                "requestBodies" => Section::RequestBodies,
                _ => return Err(invalid()),
            };
            (section, name)
        }
        "definitions" => (Section::Schemas, rest),
        "parameters" => (Section::Parameters, rest),
        "responses" => (Section::Responses, rest),
        _ => return Err(invalid()),
    };

    if name.is_empty() || name.contains('/') {
        return Err(invalid());
    }

    // JSON Pointer escapes
    Ok((section, name.replace("~1", "/").replace("~0", "~")))
}
