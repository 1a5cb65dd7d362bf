use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use super::type_ref::IrType;
use super::types::NormalizedName;
use crate::error::ResolveError;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order path items are traversed.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// The verb as spelled in a path item (`get`, `post`, ...).
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved API operation, one per (path, method).
#[derive(Debug, Clone, PartialEq)]
pub struct IrOperation {
    pub service: NormalizedName,
    pub name: NormalizedName,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub method: HttpMethod,
    pub path: String,
    pub parameters: IrParameters,
    /// Referenced schema names. May repeat; deduplicated by the renderer.
    pub dependencies: Vec<String>,
    pub errors: Vec<IrOperationError>,
    pub results: Vec<IrResult>,
    pub response_header: Option<String>,
}

/// A response status key: an exact code, a range such as `4XX`, or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Code(u16),
    /// The leading digit of a `1XX`..`5XX` range.
    Range(u8),
    Default,
}

impl StatusCode {
    fn sort_key(&self) -> (u8, u16, u8) {
        match self {
            StatusCode::Code(code) => (0, *code, 0),
            StatusCode::Range(class) => (0, u16::from(*class) * 100, 1),
            StatusCode::Default => (1, 0, 0),
        }
    }
}

impl Ord for StatusCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for StatusCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for StatusCode {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolveError::InvalidStatusCode(s.to_string());
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(StatusCode::Default);
        }

        let bytes = trimmed.as_bytes();
        if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"XX") {
            return match bytes[0] {
                b'1'..=b'5' => Ok(StatusCode::Range(bytes[0] - b'0')),
                _ => Err(invalid()),
            };
        }

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let code: u16 = trimmed.parse().map_err(|_| invalid())?;
            if (100..=599).contains(&code) {
                return Ok(StatusCode::Code(code));
            }
        }

        Err(invalid())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Range(class) => write!(f, "{class}XX"),
            StatusCode::Default => f.write_str("default"),
        }
    }
}

/// A response classified as a success.
#[derive(Debug, Clone, PartialEq)]
pub struct IrResult {
    pub status: StatusCode,
    /// `Void` when the response has no content.
    pub result_type: IrType,
    pub media_type: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    /// Header this response nominates as a distinguished return value.
    pub header: Option<String>,
}

/// A response classified as a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct IrOperationError {
    pub status: StatusCode,
    pub description: Option<String>,
}

/// A resolved parameter in any location, including a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct IrParameter {
    pub name: NormalizedName,
    pub original_name: String,
    pub location: IrParameterLocation,
    pub param_type: IrType,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub description: Option<String>,
    /// Content type of a request body parameter.
    pub media_type: Option<String>,
}

impl IrParameter {
    /// Key parameters are unique by, across every location.
    pub fn key(&self) -> &str {
        &self.name.camel_case
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Form,
    Body,
}

impl IrParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrParameterLocation::Path => "path",
            IrParameterLocation::Query => "query",
            IrParameterLocation::Header => "header",
            IrParameterLocation::Cookie => "cookie",
            IrParameterLocation::Form => "form",
            IrParameterLocation::Body => "body",
        }
    }
}

/// The parameters of one operation: a single table keyed by name, each entry
/// tagged with its location.
///
/// Inserting a parameter evicts any entry with the same name from every
/// location, and inserting a body evicts any other body, so names stay unique
/// and there is never more than one body. Per-location views keep insertion
/// order. Only the transform stage writes to the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrParameters {
    entries: IndexMap<String, IrParameter>,
}

impl IrParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `param` at the end, replacing whatever it collides with.
    /// Returns the entry it displaced by name, if any.
    pub(crate) fn insert(&mut self, param: IrParameter) -> Option<IrParameter> {
        if param.location == IrParameterLocation::Body {
            self.entries
                .retain(|name, p| p.location != IrParameterLocation::Body || name == param.key());
        }
        let replaced = self.entries.shift_remove(param.key());
        self.entries.insert(param.key().to_string(), param);
        replaced
    }

    /// Override `self` with every parameter of `other`, in `other`'s order.
    pub(crate) fn merge(&mut self, other: IrParameters) {
        for param in other.entries.into_values() {
            self.insert(param);
        }
    }

    pub fn get(&self, name: &str) -> Option<&IrParameter> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IrParameter> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in one location, in insertion order.
    pub fn located(&self, location: IrParameterLocation) -> Vec<&IrParameter> {
        self.iter().filter(|p| p.location == location).collect()
    }

    pub fn path(&self) -> Vec<&IrParameter> {
        self.located(IrParameterLocation::Path)
    }

    pub fn query(&self) -> Vec<&IrParameter> {
        self.located(IrParameterLocation::Query)
    }

    pub fn form(&self) -> Vec<&IrParameter> {
        self.located(IrParameterLocation::Form)
    }

    pub fn header(&self) -> Vec<&IrParameter> {
        self.located(IrParameterLocation::Header)
    }

    pub fn cookie(&self) -> Vec<&IrParameter> {
        self.located(IrParameterLocation::Cookie)
    }

    pub fn body(&self) -> Option<&IrParameter> {
        self.iter().find(|p| p.location == IrParameterLocation::Body)
    }

    /// Named schemas referenced by the parameters, distinct, in order.
    pub fn dependencies(&self) -> Vec<String> {
        let names: IndexSet<String> = self
            .iter()
            .flat_map(|p| p.param_type.dependencies())
            .collect();
        names.into_iter().collect()
    }
}
