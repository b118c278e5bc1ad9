//! OpenAI-compatible LLM integration for spchat
//!
//! This crate provides the chat-completions implementation of the
//! LLMProvider trait. It works against api.openai.com and any compatible
//! endpoint.

mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use spchat_core::{Error, GenerationConfig, GenerationResult, LLMProvider, PromptMessage, Result};
