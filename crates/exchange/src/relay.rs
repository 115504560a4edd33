//! The exchange orchestrator.
//!
//! Stateless across invocations: every call fetches its own window, makes
//! one LLM round trip, and appends both sides of the exchange. The two
//! appends are sequential and NOT atomic as a pair — if the reply append
//! fails after the user turn landed, the partition is left with an
//! unanswered user turn and the caller sees the failure.

use crate::assembler::assemble_context;
use chatrelay_core::clock::TurnClock;
use chatrelay_core::turn::{ChatTurn, UserId};
use chatrelay_core::{HistoryStore, LlmClient, Result, CONTEXT_WINDOW};
use std::sync::Arc;
use tracing::{debug, info};

/// Drives one user↔bot exchange through the store and the LLM.
pub struct Exchange {
    store: Arc<dyn HistoryStore>,
    llm: Arc<dyn LlmClient>,
    clock: TurnClock,
}

impl Exchange {
    pub fn new(store: Arc<dyn HistoryStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            store,
            llm,
            clock: TurnClock::new(),
        }
    }

    /// The history store this exchange persists to.
    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Run one exchange: assemble context, obtain the reply, persist both
    /// turns, return the reply text.
    pub async fn handle(&self, user_id: &UserId, prompt: &str) -> Result<String> {
        let history = self.store.recent(user_id, CONTEXT_WINDOW).await?;
        debug!(user = %user_id, window = history.len(), "Context window fetched");

        let contents = assemble_context(&history, prompt);
        let reply = self.llm.generate(&contents).await?;

        // Persistence happens only after a reply is obtained; user turn
        // first, reply second.
        self.store
            .append(ChatTurn::user(
                user_id.clone(),
                prompt,
                self.clock.next_millis(),
            ))
            .await?;
        self.store
            .append(ChatTurn::bot(
                user_id.clone(),
                reply.clone(),
                self.clock.next_millis(),
            ))
            .await?;

        info!(user = %user_id, reply_len = reply.len(), "Exchange complete");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatrelay_core::error::LlmError;
    use chatrelay_core::turn::Role;
    use chatrelay_core::wire::Content;
    use chatrelay_history::InMemoryStore;
    use std::sync::Mutex;

    /// Stub LLM that records every content sequence it is sent.
    struct StubLlm {
        reply: std::result::Result<String, LlmError>,
        seen: Mutex<Vec<Vec<Content>>>,
    }

    impl StubLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(LlmError::ApiError {
                    status_code: 503,
                    message: "upstream down".into(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, contents: &[Content]) -> std::result::Result<String, LlmError> {
            self.seen.lock().unwrap().push(contents.to_vec());
            self.reply.clone()
        }
    }

    fn exchange_with(llm: Arc<StubLlm>) -> (Exchange, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (Exchange::new(store.clone(), llm), store)
    }

    #[tokio::test]
    async fn first_exchange_persists_both_turns_in_order() {
        let llm = Arc::new(StubLlm::replying("Hi there"));
        let (exchange, store) = exchange_with(llm.clone());
        let user = UserId::from("u1");

        let reply = exchange.handle(&user, "Hello").await.unwrap();
        assert_eq!(reply, "Hi there");

        // with no history, the LLM saw exactly the new prompt
        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            vec![Content::text(chatrelay_core::wire::WireRole::User, "Hello")]
        );
        drop(seen);

        let turns = store.recent(&user, CONTEXT_WINDOW).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hello");
        assert_eq!(turns[1].role, Role::Bot);
        assert_eq!(turns[1].content, "Hi there");
        assert!(turns[0].timestamp < turns[1].timestamp);
    }

    #[tokio::test]
    async fn full_window_is_sent_with_prompt_appended() {
        let llm = Arc::new(StubLlm::replying("ok"));
        let (exchange, store) = exchange_with(llm.clone());
        let user = UserId::from("u2");

        for i in 0..6i64 {
            let role = if i % 2 == 0 { Role::User } else { Role::Bot };
            store
                .append(ChatTurn {
                    user_id: user.clone(),
                    timestamp: i,
                    role,
                    content: format!("old{i}"),
                })
                .await
                .unwrap();
        }

        exchange.handle(&user, "new question").await.unwrap();

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 7);
        assert_eq!(seen[0][0].parts[0].text, "old0");
        assert_eq!(seen[0][6].parts[0].text, "new question");
    }

    #[tokio::test]
    async fn oldest_turn_falls_out_of_the_window_but_stays_stored() {
        let llm = Arc::new(StubLlm::replying("reply"));
        let (exchange, store) = exchange_with(llm);
        let user = UserId::from("u2");

        for i in 0..6i64 {
            store
                .append(ChatTurn {
                    user_id: user.clone(),
                    timestamp: i,
                    role: Role::User,
                    content: format!("old{i}"),
                })
                .await
                .unwrap();
        }

        exchange.handle(&user, "new question").await.unwrap();

        // nothing is ever deleted
        assert_eq!(store.count(&user).await.unwrap(), 8);

        // the next window contains the new exchange and has dropped the
        // oldest of the original turns
        let window = store.recent(&user, CONTEXT_WINDOW).await.unwrap();
        assert_eq!(window.len(), 6);
        assert!(window.iter().all(|t| t.content != "old0"));
        assert!(window.iter().all(|t| t.content != "old1"));
        assert_eq!(window[4].content, "new question");
        assert_eq!(window[5].content, "reply");
    }

    #[tokio::test]
    async fn llm_failure_leaves_store_untouched() {
        let llm = Arc::new(StubLlm::failing());
        let (exchange, store) = exchange_with(llm);
        let user = UserId::from("u3");

        let err = exchange.handle(&user, "Hello").await.unwrap_err();
        assert!(matches!(err, chatrelay_core::Error::Llm(_)));
        assert_eq!(store.count(&user).await.unwrap(), 0);
    }
}
