//! Document indexer implementation

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use spchat_core::{
    Document, DocumentIndexer, Error, IndexingConfig, IndexingReport, Passage, Result, VectorStore,
};

/// Local document indexer that works with any VectorStore
///
/// Chunking is a character window with overlap; passage ids derive from the
/// document id and chunk ordinal, so identical input content yields an
/// identical passage set on every rebuild.
pub struct LocalDocumentIndexer<V: VectorStore> {
    vector_store: Arc<V>,
    config: IndexingConfig,
}

impl<V: VectorStore> LocalDocumentIndexer<V> {
    /// Create a new local document indexer
    pub fn new(vector_store: Arc<V>) -> Self {
        Self {
            vector_store,
            config: IndexingConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(vector_store: Arc<V>, config: IndexingConfig) -> Self {
        Self {
            vector_store,
            config,
        }
    }

    /// Chunk a document into overlapping windows
    fn chunk_document(&self, content: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = content.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();
            chunks.push(chunk);

            if end >= chars.len() {
                break;
            }

            // The step stays positive even when the configured overlap
            // meets or exceeds the chunk size.
            start += self
                .config
                .chunk_size
                .saturating_sub(self.config.chunk_overlap)
                .max(1);
        }

        chunks
    }

    fn passage_id(document: &Document, ordinal: usize) -> String {
        format!("{:x}_{}", md5::compute(document.id.as_bytes()), ordinal)
    }
}

#[async_trait]
impl<V: VectorStore + 'static> DocumentIndexer for LocalDocumentIndexer<V> {
    async fn index_document(&self, document: &Document) -> Result<IndexingReport> {
        if document.content.trim().is_empty() {
            return Err(Error::Indexing(format!(
                "Document '{}' has no indexable text",
                document.name
            )));
        }

        let chunks = self.chunk_document(&document.content);
        let passages: Vec<Passage> = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Passage {
                id: Self::passage_id(document, i),
                document_id: document.id.clone(),
                document_name: document.name.clone(),
                content: chunk,
                embedding: None,
                score: None,
            })
            .collect();

        let stored = self.vector_store.store_batch(passages).await?;

        Ok(IndexingReport {
            documents_indexed: 1,
            passages_stored: stored.len(),
        })
    }

    async fn index_documents(&self, documents: &[Document]) -> Result<IndexingReport> {
        let mut passages_stored = 0;

        // Any unprocessable document fails the whole pass; the caller
        // rebuilds from scratch on the next connect attempt.
        for document in documents {
            let report = self.index_document(document).await?;
            passages_stored += report.passages_stored;
        }

        Ok(IndexingReport {
            documents_indexed: documents.len(),
            passages_stored,
        })
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let count = self.vector_store.count().await?;
        Ok(json!({
            "passages_stored": count,
            "chunk_size": self.config.chunk_size,
            "chunk_overlap": self.config.chunk_overlap,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalVectorStore;

    fn doc(id: &str, content: &str) -> Document {
        Document::new(id, id, content, id)
    }

    async fn connected_store() -> Arc<LocalVectorStore> {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_chunking_with_overlap() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = LocalDocumentIndexer::with_config(
            store,
            IndexingConfig {
                chunk_size: 10,
                chunk_overlap: 3,
            },
        );

        let chunks = indexer.chunk_document("abcdefghijklmnopqrst");
        assert_eq!(chunks[0], "abcdefghij");
        assert!(chunks[1].starts_with("hij"));

        let rejoined: String = chunks.concat();
        assert!(rejoined.contains("abcdefghij"));
        assert!(rejoined.contains("qrst"));
    }

    #[test]
    fn test_overlap_no_smaller_than_chunk_size_still_terminates() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = LocalDocumentIndexer::with_config(
            store,
            IndexingConfig {
                chunk_size: 4,
                chunk_overlap: 9,
            },
        );

        let chunks = indexer.chunk_document("abcdefgh");
        assert!(chunks.len() <= 8);
        assert_eq!(chunks[0], "abcd");
        assert!(chunks.last().unwrap().ends_with('h'));
    }

    #[test]
    fn test_short_document_is_one_chunk() {
        let store = Arc::new(LocalVectorStore::new());
        let indexer = LocalDocumentIndexer::new(store);
        let chunks = indexer.chunk_document("short text");
        assert_eq!(chunks, vec!["short text"]);
    }

    #[test]
    fn test_passage_ids_are_deterministic() {
        let document = doc("/sites/hr/policy.txt", "content");
        let a = LocalDocumentIndexer::<LocalVectorStore>::passage_id(&document, 0);
        let b = LocalDocumentIndexer::<LocalVectorStore>::passage_id(&document, 0);
        assert_eq!(a, b);

        let other = LocalDocumentIndexer::<LocalVectorStore>::passage_id(&document, 1);
        assert_ne!(a, other);
    }

    #[tokio::test]
    async fn test_index_documents_reports_counts() {
        let store = connected_store().await;
        let indexer = LocalDocumentIndexer::new(store.clone());

        let documents = vec![
            doc("a", "vacation policy details"),
            doc("b", "expense report instructions"),
            doc("c", "office opening hours"),
        ];

        let report = indexer.index_documents(&documents).await.unwrap();
        assert_eq!(report.documents_indexed, 3);
        assert_eq!(report.passages_stored, 3);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_document_is_fatal() {
        let store = connected_store().await;
        let indexer = LocalDocumentIndexer::new(store);

        let documents = vec![doc("a", "real content"), doc("b", "   ")];
        let result = indexer.index_documents(&documents).await;
        assert!(matches!(result, Err(Error::Indexing(_))));
    }
}
