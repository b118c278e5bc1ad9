//! Retrieval engine implementation

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use spchat_core::{
    Document, DocumentIndexer, Error, Passage, Result, Retrieval, RetrievalEngine, RetrievalQuery,
    SearchConfig, VectorStore,
};

/// Local retrieval engine
///
/// Owns the index lifecycle for a connection session: each `rebuild` clears
/// the vector store and re-indexes the full document set, then `retrieve`
/// serves similarity queries and assembles the context block handed to the
/// LLM.
pub struct LocalRetrievalEngine<V: VectorStore, D: DocumentIndexer> {
    vector_store: Arc<V>,
    indexer: Arc<D>,
    ready: bool,
}

impl<V: VectorStore, D: DocumentIndexer> LocalRetrievalEngine<V, D> {
    /// Create a new local retrieval engine
    pub fn new(vector_store: Arc<V>, indexer: Arc<D>) -> Self {
        Self {
            vector_store,
            indexer,
            ready: false,
        }
    }

    /// Ids of the documents the current index was built from
    pub async fn indexed_document_ids(&self) -> Result<Vec<String>> {
        self.vector_store.document_ids().await
    }
}

#[async_trait]
impl<V: VectorStore + 'static, D: DocumentIndexer + 'static> RetrievalEngine
    for LocalRetrievalEngine<V, D>
{
    async fn rebuild(&mut self, documents: &[Document]) -> Result<()> {
        if !self.vector_store.is_connected() {
            return Err(Error::VectorStore("Vector store not connected".to_string()));
        }

        self.ready = false;
        self.vector_store.clear().await?;
        self.indexer.index_documents(documents).await?;
        self.ready = true;
        Ok(())
    }

    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Retrieval> {
        if !self.ready {
            return Err(Error::InvalidInput(
                "Index not built yet; connect first".to_string(),
            ));
        }

        let search_config = SearchConfig {
            top_k: query.top_k,
            score_threshold: query.score_threshold,
        };

        let search_result = self.vector_store.search(&query.query, &search_config).await?;
        let context = self.build_context(&search_result.passages);

        Ok(Retrieval {
            passages: search_result.passages,
            context,
        })
    }

    fn build_context(&self, passages: &[Passage]) -> String {
        if passages.is_empty() {
            return String::new();
        }

        let mut context = String::from("Relevant passages from the document library:\n\n");

        for (i, passage) in passages.iter().enumerate() {
            context.push_str(&format!("{}. [{}] ", i + 1, passage.document_name));
            context.push_str(&passage.content);
            context.push_str("\n\n");
        }

        context
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let passage_count = self.vector_store.count().await?;
        let indexer_stats = self.indexer.stats().await?;

        Ok(json!({
            "ready": self.ready,
            "passage_count": passage_count,
            "indexer_stats": indexer_stats,
        }))
    }

    fn is_ready(&self) -> bool {
        self.ready && self.vector_store.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalDocumentIndexer, LocalVectorStore};

    async fn engine_with_documents(
        documents: &[Document],
    ) -> LocalRetrievalEngine<LocalVectorStore, LocalDocumentIndexer<LocalVectorStore>> {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();
        let store = Arc::new(store);

        let indexer = Arc::new(LocalDocumentIndexer::new(store.clone()));
        let mut engine = LocalRetrievalEngine::new(store, indexer);
        engine.rebuild(documents).await.unwrap();
        engine
    }

    fn hr_documents() -> Vec<Document> {
        vec![
            Document::new(
                "policy.txt",
                "policy.txt",
                "Employees accrue twenty days of vacation per year and may carry five over.",
                "/sites/hr/Shared Documents/policy.txt",
            ),
            Document::new(
                "expenses.txt",
                "expenses.txt",
                "Expense reports are due by the fifth business day of each month.",
                "/sites/hr/Shared Documents/expenses.txt",
            ),
        ]
    }

    #[tokio::test]
    async fn test_rebuild_and_retrieve() {
        let engine = engine_with_documents(&hr_documents()).await;
        assert!(engine.is_ready());

        let query = RetrievalQuery {
            query: "vacation days per year".to_string(),
            top_k: 2,
            score_threshold: None,
        };

        let retrieval = engine.retrieve(&query).await.unwrap();
        assert!(!retrieval.passages.is_empty());
        assert!(retrieval.context.contains("policy.txt"));
        assert_eq!(retrieval.source_ids()[0], "policy.txt");
    }

    #[tokio::test]
    async fn test_retrieve_before_rebuild_fails() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();
        let store = Arc::new(store);
        let indexer = Arc::new(LocalDocumentIndexer::new(store.clone()));
        let engine = LocalRetrievalEngine::new(store, indexer);

        assert!(!engine.is_ready());
        let result = engine.retrieve(&RetrievalQuery::default()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_index_wholesale() {
        let mut engine = engine_with_documents(&hr_documents()).await;

        let replacement = vec![Document::new(
            "menu.txt",
            "menu.txt",
            "The cafeteria serves lunch from noon until two.",
            "/sites/hr/Shared Documents/menu.txt",
        )];
        engine.rebuild(&replacement).await.unwrap();

        let ids = engine.indexed_document_ids().await.unwrap();
        assert_eq!(ids, vec!["menu.txt"]);
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic_across_rebuilds() {
        let documents = hr_documents();
        let query = RetrievalQuery {
            query: "when are expense reports due".to_string(),
            top_k: 2,
            score_threshold: None,
        };

        let first = engine_with_documents(&documents)
            .await
            .retrieve(&query)
            .await
            .unwrap();
        let second = engine_with_documents(&documents)
            .await
            .retrieve(&query)
            .await
            .unwrap();

        assert_eq!(first.source_ids(), second.source_ids());
        let first_ids: Vec<_> = first.passages.iter().map(|p| p.id.clone()).collect();
        let second_ids: Vec<_> = second.passages.iter().map(|p| p.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_no_match_yields_empty_retrieval() {
        let engine = engine_with_documents(&hr_documents()).await;

        let query = RetrievalQuery {
            query: "zzqy xylophone".to_string(),
            top_k: 4,
            score_threshold: Some(0.5),
        };

        let retrieval = engine.retrieve(&query).await.unwrap();
        assert!(retrieval.passages.is_empty());
        assert!(retrieval.context.is_empty());
        assert!(retrieval.source_ids().is_empty());
    }
}
