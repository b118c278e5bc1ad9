//! Chat engine tests against mock collaborators

#[cfg(test)]
mod chat_engine_tests {
    use crate::{ChatEngine, ChatEngineConfig};
    use async_trait::async_trait;
    use serde_json::json;
    use spchat_core::{
        Document, Error, GenerationConfig, GenerationResult, LLMProvider, Message, Passage,
        PromptMessage, Result, Retrieval, RetrievalEngine, RetrievalQuery, Session,
    };
    use std::sync::{Arc, Mutex};

    struct MockLlm {
        reply: Option<String>,
        prompt_lengths: Arc<Mutex<Vec<usize>>>,
    }

    impl MockLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompt_lengths: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompt_lengths: Arc::default(),
            }
        }

        fn prompt_lengths(&self) -> Arc<Mutex<Vec<usize>>> {
            self.prompt_lengths.clone()
        }
    }

    #[async_trait]
    impl LLMProvider for MockLlm {
        async fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        async fn chat(
            &self,
            messages: &[PromptMessage],
            config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            self.prompt_lengths.lock().unwrap().push(messages.len());
            match &self.reply {
                Some(reply) => Ok(GenerationResult {
                    text: reply.clone(),
                    model_id: config.model_id.clone(),
                    tokens_used: None,
                }),
                None => Err(Error::Generation("rate limited".to_string())),
            }
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }
    }

    struct MockRetrieval {
        passages: Vec<Passage>,
        ready: bool,
    }

    impl MockRetrieval {
        fn with_passages(pairs: &[(&str, &str)]) -> Self {
            let passages = pairs
                .iter()
                .enumerate()
                .map(|(i, (document_id, content))| Passage {
                    id: format!("{}_{}", document_id, i),
                    document_id: document_id.to_string(),
                    document_name: document_id.to_string(),
                    content: content.to_string(),
                    embedding: None,
                    score: Some(0.9),
                })
                .collect();
            Self {
                passages,
                ready: true,
            }
        }
    }

    #[async_trait]
    impl RetrievalEngine for MockRetrieval {
        async fn rebuild(&mut self, _documents: &[Document]) -> Result<()> {
            self.ready = true;
            Ok(())
        }

        async fn retrieve(&self, _query: &RetrievalQuery) -> Result<Retrieval> {
            let context = self.build_context(&self.passages);
            Ok(Retrieval {
                passages: self.passages.clone(),
                context,
            })
        }

        fn build_context(&self, passages: &[Passage]) -> String {
            passages
                .iter()
                .map(|p| p.content.clone())
                .collect::<Vec<_>>()
                .join("\n")
        }

        async fn stats(&self) -> Result<serde_json::Value> {
            Ok(json!({"passages": self.passages.len()}))
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    #[tokio::test]
    async fn test_answer_cites_only_retrieved_documents() {
        let retrieval = MockRetrieval::with_passages(&[
            ("policy.txt", "Twenty days of vacation per year."),
            ("handbook.aspx", "Vacation requests go through the portal."),
            ("policy.txt", "Five days may be carried over."),
        ]);
        let llm = MockLlm::replying("Twenty days, five carry over.");

        let engine = ChatEngine::new(llm, retrieval);
        let answer = engine.answer("How much vacation do I get?", &[]).await.unwrap();

        assert_eq!(answer.text, "Twenty days, five carry over.");
        assert_eq!(answer.sources, vec!["policy.txt", "handbook.aspx"]);
    }

    #[tokio::test]
    async fn test_empty_retrieval_yields_empty_sources_not_error() {
        let retrieval = MockRetrieval {
            passages: vec![],
            ready: true,
        };
        let llm = MockLlm::replying("The documents do not cover that.");

        let engine = ChatEngine::new(llm, retrieval);
        let answer = engine
            .answer("What is the vacation policy?", &[])
            .await
            .unwrap();

        assert!(answer.sources.is_empty());
        assert!(!answer.text.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_generation_error() {
        let retrieval = MockRetrieval::with_passages(&[("policy.txt", "vacation")]);
        let llm = MockLlm::failing();

        let engine = ChatEngine::new(llm, retrieval);
        let result = engine.answer("anything", &[]).await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_untouched() {
        let retrieval = MockRetrieval::with_passages(&[("policy.txt", "vacation")]);
        let llm = MockLlm::failing();
        let engine = ChatEngine::new(llm, retrieval);

        let mut session = Session::new();
        session.complete_connect(vec![Document::new("policy.txt", "policy.txt", "x", "y")]);

        // The shell only records a turn on success.
        if let Ok(answer) = engine.answer("anything", session.messages()).await {
            session.record_turn("anything", &answer);
        }

        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_retrieval() {
        let retrieval = MockRetrieval::with_passages(&[("policy.txt", "vacation")]);
        let llm = MockLlm::replying("unused");
        let calls = llm.prompt_lengths();

        let engine = ChatEngine::new(llm, retrieval);
        let result = engine.answer("   ", &[]).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disconnected_session_gates_the_engine() {
        let retrieval = MockRetrieval::with_passages(&[("policy.txt", "vacation")]);
        let engine = ChatEngine::new(MockLlm::replying("unused"), retrieval);

        let mut session = Session::new();
        assert!(ChatEngine::for_session(Some(&engine), &session).is_none());

        session.begin_connect();
        assert!(ChatEngine::for_session(Some(&engine), &session).is_none());

        session.fail_connect();
        assert!(ChatEngine::for_session(Some(&engine), &session).is_none());

        session.complete_connect(vec![Document::new("policy.txt", "policy.txt", "x", "y")]);
        assert!(ChatEngine::for_session(Some(&engine), &session).is_some());

        // No engine yet means no call either, connected or not.
        assert!(ChatEngine::<MockLlm, MockRetrieval>::for_session(None, &session).is_none());
    }

    #[tokio::test]
    async fn test_history_window_limits_prompt_turns() {
        let retrieval = MockRetrieval::with_passages(&[("policy.txt", "vacation")]);
        let llm = MockLlm::replying("ok");
        let calls = llm.prompt_lengths();

        let config = ChatEngineConfig {
            history_window: 2,
            ..Default::default()
        };
        let engine = ChatEngine::with_config(llm, retrieval, config);

        let history: Vec<Message> = (0..6)
            .map(|i| Message::user(format!("question {}", i)))
            .collect();

        let answer = engine.answer("latest question", &history).await.unwrap();
        assert_eq!(answer.text, "ok");

        // One provider call: system prompt + 2 windowed history messages
        // + the current question, the other 4 history messages dropped.
        assert_eq!(*calls.lock().unwrap(), vec![4]);
    }
}
