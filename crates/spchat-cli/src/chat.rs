//! Chat engine: one retrieval + generation round trip per query

use serde::{Deserialize, Serialize};

use spchat_core::{
    Answer, Error, GenerationConfig, LLMProvider, Message, PromptMessage, Result, RetrievalEngine,
    RetrievalQuery, Role, Session,
};

/// Tuning for the chat round trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEngineConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
    /// How many prior messages accompany each query
    pub history_window: usize,
}

impl Default for ChatEngineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: Some(0.1),
            history_window: 8,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are an assistant answering questions about a team's SharePoint \
document library. Answer using only the passages provided in the context block. If the passages \
do not contain the answer, say that the documents do not cover it. Be concise.";

/// Chat engine combining a retrieval engine and an LLM provider
///
/// Each accepted query is a stateless request/response cycle: retrieve
/// passages, prompt the provider with context plus recent history, and
/// return the answer with the ids of the documents the passages came from.
/// Source ids are taken from retrieval alone; the provider's text never
/// adds to them.
pub struct ChatEngine<L: LLMProvider, R: RetrievalEngine> {
    llm: L,
    retrieval: R,
    config: ChatEngineConfig,
}

impl<L: LLMProvider, R: RetrievalEngine> ChatEngine<L, R> {
    /// Create a new chat engine
    pub fn new(llm: L, retrieval: R) -> Self {
        Self {
            llm,
            retrieval,
            config: ChatEngineConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(llm: L, retrieval: R, config: ChatEngineConfig) -> Self {
        Self {
            llm,
            retrieval,
            config,
        }
    }

    /// Whether the underlying index is ready for queries
    pub fn is_ready(&self) -> bool {
        self.retrieval.is_ready()
    }

    /// Rebuild the underlying index from a fresh document set
    pub async fn rebuild_index(&mut self, documents: &[spchat_core::Document]) -> Result<()> {
        self.retrieval.rebuild(documents).await
    }

    /// Answer a query against the current index and conversation history
    pub async fn answer(&self, query: &str, history: &[Message]) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Empty query".to_string()));
        }

        let retrieval_query = RetrievalQuery {
            query: query.to_string(),
            top_k: self.config.top_k,
            score_threshold: self.config.score_threshold,
        };

        let retrieval = self.retrieval.retrieve(&retrieval_query).await?;
        let sources = retrieval.source_ids();

        let messages = self.build_messages(query, history, &retrieval.context);

        let generation_config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            ..Default::default()
        };

        let result = self.llm.chat(&messages, &generation_config).await?;

        Ok(Answer {
            text: result.text,
            sources,
        })
    }

    /// Chat gate used by the shell: yields the engine only while the
    /// session is connected, so no provider call can happen otherwise
    pub fn for_session<'a>(
        engine: Option<&'a Self>,
        session: &Session,
    ) -> Option<&'a Self> {
        engine.filter(|_| session.is_connected())
    }

    fn build_messages(
        &self,
        query: &str,
        history: &[Message],
        context: &str,
    ) -> Vec<PromptMessage> {
        let system = if context.is_empty() {
            format!(
                "{}\n\nNo passages matched this question; say so if you cannot answer.",
                SYSTEM_PROMPT
            )
        } else {
            format!("{}\n\n{}", SYSTEM_PROMPT, context)
        };

        let mut messages = vec![PromptMessage::system(system)];

        let window_start = history.len().saturating_sub(self.config.history_window);
        for message in &history[window_start..] {
            match message.role {
                Role::User => messages.push(PromptMessage::user(&message.content)),
                Role::Assistant => messages.push(PromptMessage::assistant(&message.content)),
            }
        }

        messages.push(PromptMessage::user(query));
        messages
    }
}
