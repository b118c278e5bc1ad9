//! Document indexer trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Document, Result};

/// Report of a successful indexing pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingReport {
    pub documents_indexed: usize,
    pub passages_stored: usize,
}

/// Configuration for document chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Trait for document indexers
///
/// An indexer consumes a document sequence and populates a vector store with
/// passages. Failure to process any document is fatal for the pass and
/// surfaces as `Error::Indexing`; a partial index is never left behind for a
/// failed pass because the caller rebuilds from scratch on the next attempt.
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    /// Index a single document
    async fn index_document(&self, document: &Document) -> Result<IndexingReport>;

    /// Index a document sequence
    async fn index_documents(&self, documents: &[Document]) -> Result<IndexingReport>;

    /// Indexing statistics
    async fn stats(&self) -> Result<serde_json::Value>;
}
