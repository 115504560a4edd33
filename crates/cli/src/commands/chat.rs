//! `chatrelay chat` — One-shot exchange from the terminal.

use chatrelay_config::AppConfig;
use chatrelay_core::turn::UserId;
use chatrelay_core::LlmClient;
use chatrelay_exchange::Exchange;
use std::sync::Arc;

pub async fn run(message: String, user: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let store = chatrelay_history::build_from_config(&config.history).await?;
    let llm: Arc<dyn LlmClient> = Arc::new(chatrelay_llm::build_from_config(&config));
    let exchange = Exchange::new(store, llm);

    let user_id = user.map(UserId::new).unwrap_or_default();
    let reply = exchange.handle(&user_id, &message).await?;

    println!("{reply}");
    Ok(())
}
