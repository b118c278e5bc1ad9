//! Indexing and retrieval for spchat
//!
//! This crate provides the local implementations of the vector store,
//! document indexer, and retrieval engine traits.

mod engine;
mod indexer;
mod vector_store;

#[cfg(test)]
mod tests;

pub use engine::LocalRetrievalEngine;
pub use indexer::LocalDocumentIndexer;
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use spchat_core::{
    Document, DocumentIndexer, Error, IndexingConfig, IndexingReport, Passage, Result, Retrieval,
    RetrievalEngine, RetrievalQuery, SearchConfig, SearchResult, VectorStore,
};
