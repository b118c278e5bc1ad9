//! Retrieval engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Document, Passage, Result};

/// Query for passage retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub query: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for RetrievalQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 4,
            score_threshold: Some(0.1),
        }
    }
}

/// Result of passage retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retrieval {
    pub passages: Vec<Passage>,
    pub context: String,
}

impl Retrieval {
    /// Ids of the distinct documents the retrieved passages came from,
    /// in retrieval order. These are the only identifiers an answer may
    /// cite.
    pub fn source_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for passage in &self.passages {
            if !ids.contains(&passage.document_id) {
                ids.push(passage.document_id.clone());
            }
        }
        ids
    }
}

/// Trait for retrieval engines
///
/// A retrieval engine owns the index lifecycle for one connection session:
/// `rebuild` replaces the index wholesale from a fresh document set, and
/// `retrieve` serves similarity queries against it.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// Discard any existing index and build a new one from `documents`
    async fn rebuild(&mut self, documents: &[Document]) -> Result<()>;

    /// Retrieve passages relevant to a query
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Retrieval>;

    /// Build a context block from retrieved passages
    fn build_context(&self, passages: &[Passage]) -> String;

    /// Statistics about the engine
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Whether at least one successful rebuild has completed
    fn is_ready(&self) -> bool;
}
