use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::schema::SchemaOrRef;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,
}

/// Top-level OpenAPI 3.x specification, reduced to what schema mapping needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiSpec {
    /// Named component schemas in document order.
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &SchemaOrRef)> {
        self.components
            .as_ref()
            .map(|c| c.schemas.iter())
            .into_iter()
            .flatten()
    }

    pub fn schema_count(&self) -> usize {
        self.components.as_ref().map_or(0, |c| c.schemas.len())
    }
}

/// Convenience for tests and callers that build documents in code.
impl From<IndexMap<String, SchemaOrRef>> for OpenApiSpec {
    fn from(schemas: IndexMap<String, SchemaOrRef>) -> Self {
        Self {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: "Untitled".to_string(),
                description: None,
                version: "0.0.0".to_string(),
            },
            components: Some(Components { schemas }),
        }
    }
}
