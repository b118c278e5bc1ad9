//! Core traits and types for spchat
//!
//! This crate defines the fundamental traits and types used across the spchat
//! system. It provides capability-facing interfaces for document connectors,
//! indexers, vector stores, retrieval engines, and LLM providers, making the
//! system test-friendly and extensible.

pub mod chat;
pub mod connector;
pub mod document;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod retrieval;
pub mod session;
pub mod vector_store;

pub use chat::{Answer, Message, Role};
pub use connector::DocumentConnector;
pub use document::Document;
pub use error::{Error, Result};
pub use indexer::{DocumentIndexer, IndexingConfig, IndexingReport};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider, PromptMessage};
pub use retrieval::{Retrieval, RetrievalEngine, RetrievalQuery};
pub use session::{ConnectionState, Session};
pub use vector_store::{Passage, SearchConfig, SearchResult, VectorStore};
