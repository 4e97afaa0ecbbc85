//! Seams to the external search engine and chat model.

use async_trait::async_trait;

use crate::rag::Result;
use crate::types::{ChatResponse, SearchHit};

/// Document store with ranked retrieval.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Index `text`, keeping `metadata` alongside it.
    async fn add_document(&self, text: &str, metadata: serde_json::Value) -> Result<()>;

    /// Up to `k` documents ranked by relevance to `query`.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Chat-completion model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, prompt: &str) -> Result<ChatResponse>;
}
