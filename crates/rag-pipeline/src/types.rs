//! Types exchanged with the search engine, the chat model and callers.

use serde::{Deserialize, Serialize};

/// A document stored in the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text that was indexed.
    pub text: String,
    /// Metadata supplied when the document was added.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    /// Relevance score; higher is better.
    pub score: f32,
}

/// A reply from the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text.
    pub response: String,
    /// Provider-specific fields (usage, model name, ...).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// A document handed to `RagSystem::initialize`.
///
/// `content` is indexed; the whole document, extra fields included, is
/// stored as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SourceDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Per-query overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Number of documents to retrieve.
    pub retrieve_count: Option<usize>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retrieve_count(mut self, count: usize) -> Self {
        self.retrieve_count = Some(count);
        self
    }
}

/// What the ontology knows about a concept mentioned in a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptContext {
    pub id: String,
    pub label: String,
    pub related: Vec<String>,
    pub prerequisites: Vec<String>,
}

/// The result of a RAG query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// Generated answer.
    pub response: String,
    /// Metadata returned by the chat model.
    pub metadata: serde_json::Value,
    /// Documents used as context. Empty when nothing relevant was found.
    pub sources: Vec<SearchHit>,
    /// Ontology background added to the prompt.
    pub concepts: Vec<ConceptContext>,
}
