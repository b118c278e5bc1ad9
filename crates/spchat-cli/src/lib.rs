//! Chat engine and terminal interface for spchat

mod chat;
mod ui;

#[cfg(test)]
mod tests;

pub use chat::{ChatEngine, ChatEngineConfig};
pub use ui::{
    display_banner, handle_input_with_history, print_documents, print_error, print_help,
    print_message, print_status, prompt_credential, prompt_secret,
};

// Re-export core types
pub use spchat_core::{Error, Result};
