//! In-memory vector store with deterministic hash embeddings

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use spchat_core::{Error, Passage, Result, SearchConfig, SearchResult, VectorStore};

const EMBEDDING_DIMENSION: usize = 384;

/// Local in-memory vector store
///
/// Embeddings are hash-derived features of words and bigrams, so identical
/// content always produces identical vectors and a rebuilt index answers a
/// fixed query with the same passages. Score ties break by passage id to
/// keep retrieval order stable across rebuilds.
pub struct LocalVectorStore {
    passages: Arc<RwLock<HashMap<String, Passage>>>,
    embedding_dimension: usize,
    connected: bool,
}

impl LocalVectorStore {
    /// Create a new local vector store
    pub fn new() -> Self {
        Self {
            passages: Arc::new(RwLock::new(HashMap::new())),
            embedding_dimension: EMBEDDING_DIMENSION,
            connected: false,
        }
    }

    /// Generate hash-feature embeddings for text
    fn embed(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut embedding = vec![0.0; self.embedding_dimension];

        for (pos, word) in words.iter().enumerate() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let hash = hasher.finish();

            let idx1 = (hash % self.embedding_dimension as u64) as usize;
            let idx2 = ((hash >> 16) % self.embedding_dimension as u64) as usize;
            let idx3 = ((hash >> 32) % self.embedding_dimension as u64) as usize;

            // Earlier words weigh more.
            let position_weight = 1.0 / (pos as f32 + 1.0);

            embedding[idx1] += position_weight;
            embedding[idx2] += position_weight * 0.7;
            embedding[idx3] += position_weight * 0.5;
        }

        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            let mut hasher = DefaultHasher::new();
            bigram.hash(&mut hasher);
            let idx = (hasher.finish() % self.embedding_dimension as u64) as usize;
            embedding[idx] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn store(&self, mut passage: Passage) -> Result<String> {
        if passage.embedding.is_none() {
            passage.embedding = Some(self.embed(&passage.content));
        }

        let id = passage.id.clone();
        let mut passages = self
            .passages
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        passages.insert(id.clone(), passage);
        Ok(id)
    }

    async fn store_batch(&self, batch: Vec<Passage>) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(batch.len());
        for passage in batch {
            ids.push(self.store(passage).await?);
        }
        Ok(ids)
    }

    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult> {
        let query_embedding = self.embed(query);

        let passages = self
            .passages
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut results: Vec<Passage> = passages
            .values()
            .map(|passage| {
                let score = passage
                    .embedding
                    .as_ref()
                    .map(|e| Self::cosine_similarity(&query_embedding, e))
                    .unwrap_or(0.0);
                let mut scored = passage.clone();
                scored.score = Some(score);
                scored
            })
            .filter(|passage| match config.score_threshold {
                Some(threshold) => passage.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        // Score descending; ties resolve by id so rebuilds stay stable.
        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        results.truncate(config.top_k);
        let total = results.len();

        Ok(SearchResult {
            passages: results,
            total,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut passages = self
            .passages
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        passages.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let passages = self
            .passages
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(passages.len())
    }

    async fn document_ids(&self) -> Result<Vec<String>> {
        let passages = self
            .passages
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut ids: Vec<String> = passages
            .values()
            .map(|p| p.document_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, document_id: &str, content: &str) -> Passage {
        Passage {
            id: id.to_string(),
            document_id: document_id.to_string(),
            document_name: document_id.to_string(),
            content: content.to_string(),
            embedding: None,
            score: None,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![1.0, 0.0, 0.0];
        let vec3 = vec![0.0, 1.0, 0.0];

        assert!((LocalVectorStore::cosine_similarity(&vec1, &vec2) - 1.0).abs() < 0.001);
        assert!((LocalVectorStore::cosine_similarity(&vec1, &vec3) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_embeddings_are_deterministic_and_normalized() {
        let store = LocalVectorStore::new();
        let a = store.embed("vacation policy for employees");
        let b = store.embed("vacation policy for employees");
        assert_eq!(a, b);

        let magnitude: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_store_and_count() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();

        store
            .store(passage("p1", "doc_a", "vacation policy"))
            .await
            .unwrap();
        store
            .store(passage("p2", "doc_a", "sick leave policy"))
            .await
            .unwrap();
        store
            .store(passage("p3", "doc_b", "expense reports"))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.document_ids().await.unwrap(), vec!["doc_a", "doc_b"]);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_content_first() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();

        store
            .store(passage(
                "p1",
                "policy.txt",
                "Employees accrue twenty days of vacation per year.",
            ))
            .await
            .unwrap();
        store
            .store(passage(
                "p2",
                "menu.txt",
                "The cafeteria serves lunch from noon until two.",
            ))
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 2,
            score_threshold: None,
        };
        let result = store
            .search("how many vacation days do employees get", &config)
            .await
            .unwrap();

        assert!(!result.passages.is_empty());
        assert_eq!(result.passages[0].document_id, "policy.txt");
    }

    #[tokio::test]
    async fn test_search_threshold_filters_everything_out() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();

        store
            .store(passage("p1", "menu.txt", "cafeteria lunch schedule"))
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 4,
            score_threshold: Some(0.99),
        };
        let result = store
            .search("unrelated quarterly revenue figures", &config)
            .await
            .unwrap();

        assert!(result.passages.is_empty());
        assert_eq!(result.total, 0);
    }
}
