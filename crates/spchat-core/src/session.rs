//! Process-wide session state

use serde::{Deserialize, Serialize};

use crate::{Answer, Document, Message};

/// Connection lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// The one mutable context object of the process
///
/// Holds connection state, the fetched document list, and the append-only
/// message history. Initialized empty at startup and mutated only by the
/// connect and ask actions; nothing survives a process restart.
///
/// State machine: `Disconnected -> Connecting -> Connected` on a successful
/// fetch+index cycle; any connect failure returns to `Disconnected` and
/// leaves the previous document list untouched. The chat affordance is
/// gated on `is_connected`.
#[derive(Debug, Default)]
pub struct Session {
    state: ConnectionState,
    documents: Vec<Document>,
    messages: Vec<Message>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Enter the connecting state. Prior documents are kept until the
    /// attempt succeeds so a failed reconnect leaves them unchanged.
    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Complete a successful fetch+index cycle
    pub fn complete_connect(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        self.state = ConnectionState::Connected;
    }

    /// Record a failed connect attempt
    pub fn fail_connect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Append the two messages of a successful chat turn, user first
    pub fn record_turn(&mut self, query: &str, answer: &Answer) {
        self.messages.push(Message::user(query));
        self.messages
            .push(Message::assistant(&answer.text, answer.sources.clone()));
    }
}
