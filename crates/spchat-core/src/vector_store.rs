//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A retrievable fragment of a document held by the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub document_id: String,
    pub document_name: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub score: Option<f32>,
}

/// Search result from the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub passages: Vec<Passage>,
    pub total: usize,
}

/// Configuration for similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: Some(0.1),
        }
    }
}

/// Trait for vector stores
///
/// Stores passages and serves similarity search over them. The store for a
/// session is rebuilt wholesale on reconnect via `clear` followed by fresh
/// stores; there is no incremental update path.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Initialize the vector store
    async fn connect(&mut self) -> Result<()>;

    /// Store a passage
    async fn store(&self, passage: Passage) -> Result<String>;

    /// Store multiple passages in batch
    async fn store_batch(&self, passages: Vec<Passage>) -> Result<Vec<String>>;

    /// Search for passages similar to a query string
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult>;

    /// Remove all passages
    async fn clear(&self) -> Result<()>;

    /// Total number of passages held
    async fn count(&self) -> Result<usize>;

    /// Ids of the distinct documents whose passages are held
    async fn document_ids(&self) -> Result<Vec<String>>;

    /// Whether the store is ready for use
    fn is_connected(&self) -> bool;
}
