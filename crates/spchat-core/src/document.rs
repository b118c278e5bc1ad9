//! Document type produced by connectors

use serde::{Deserialize, Serialize};

/// A document fetched from the document store
///
/// Immutable once fetched. The `source` is the server-relative location used
/// for citations; `id` is what assistant answers cite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    pub source: String,
    pub metadata: serde_json::Value,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            source: source.into(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Attach metadata (library title, modified date, author, ...)
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = Document::new(
            "/sites/hr/Shared Documents/policy.txt",
            "policy.txt",
            "Vacation policy text",
            "/sites/hr/Shared Documents/policy.txt",
        )
        .with_metadata(json!({"library": "Shared Documents"}));

        assert_eq!(doc.name, "policy.txt");
        assert_eq!(doc.metadata["library"], "Shared Documents");
    }
}
