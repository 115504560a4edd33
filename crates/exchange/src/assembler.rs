//! Context assembly — stored window plus the new prompt, in wire shape.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical inputs always produce identical
//! outputs. No store mutation happens here — the synthetic turn for the
//! new prompt exists only in memory until the reply is persisted.

use chatrelay_core::turn::ChatTurn;
use chatrelay_core::wire::{Content, WireRole};

/// Map an oldest-first history window and the new user prompt into the
/// ordered `contents` sequence the LLM expects.
///
/// Every stored turn becomes one content entry (`user` stays `user`, any
/// other role becomes `model`); the new prompt is appended last as a
/// `user` entry.
pub fn assemble_context(history: &[ChatTurn], new_prompt: &str) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content::text(WireRole::from(turn.role), turn.content.clone()))
        .collect();

    contents.push(Content::text(WireRole::User, new_prompt));
    contents
}
