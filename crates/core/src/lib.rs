//! # Chatrelay Core
//!
//! Domain types, traits, and error definitions for the chatrelay service.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the history store and the LLM endpoint —
//! are defined as traits here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod clock;
pub mod error;
pub mod history;
pub mod llm;
pub mod turn;
pub mod wire;

// Re-export key types at crate root for ergonomics
pub use clock::TurnClock;
pub use error::{Error, HistoryError, LlmError, Result};
pub use history::HistoryStore;
pub use llm::LlmClient;
pub use turn::{ChatTurn, Role, UserId, DEFAULT_USER};
pub use wire::{Content, Part, WireRole};

/// How many prior turns form a conversation's usable context (3 exchanges).
pub const CONTEXT_WINDOW: usize = 6;
