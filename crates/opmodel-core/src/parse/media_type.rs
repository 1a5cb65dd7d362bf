use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// A media type object inside a 3.x `content` map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// Media types whose bodies are sent as form fields.
pub const FORM_MEDIA_TYPES: [&str; 2] = ["multipart/form-data", "application/x-www-form-urlencoded"];

/// Whether `media_type` (ignoring parameters such as `; charset=`) is a form encoding.
pub fn is_form_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    FORM_MEDIA_TYPES
        .iter()
        .any(|form| form.eq_ignore_ascii_case(essence))
}
