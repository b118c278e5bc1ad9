//! SharePoint Online integration for spchat
//!
//! This crate provides the SharePoint implementation of the
//! DocumentConnector trait.

mod client;
mod config;
mod content;


pub use client::SharePointClient;
pub use config::SharePointConfig;
pub use content::extract_text;

// Re-export core types for convenience
pub use spchat_core::{Document, DocumentConnector, Error, Result};
