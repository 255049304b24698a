use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// A media type object inside `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// Pick the media type generated code talks: JSON when offered, otherwise
/// the first declared content type.
pub fn preferred_media_type(
    content: &indexmap::IndexMap<String, MediaType>,
) -> Option<(&String, &MediaType)> {
    content
        .get_key_value("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(content_type, _)| content_type.ends_with("+json"))
        })
        .or_else(|| content.first())
}
