//! `chatrelay doctor` — Diagnose configuration and store health.

use chatrelay_config::{AppConfig, API_KEY_ENV};
use chatrelay_core::turn::UserId;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("chatrelay doctor");
    println!("================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok] Configuration loaded ({API_KEY_ENV} present)");
            Some(config)
        }
        Err(e) => {
            println!("  [!!] {e}");
            issues += 1;
            None
        }
    };

    if let Some(config) = config {
        println!("       model:   {}", config.llm.model);
        println!("       backend: {}", config.history.backend);

        match chatrelay_history::build_from_config(&config.history).await {
            Ok(store) => {
                let default_count = store.count(&UserId::default()).await.unwrap_or(0);
                println!(
                    "  [ok] History store reachable ({}, {} turn(s) for {})",
                    store.name(),
                    default_count,
                    UserId::default()
                );
            }
            Err(e) => {
                println!("  [!!] History store: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
