//! The exchange pipeline — the heart of chatrelay.
//!
//! One exchange is a single request/response round trip:
//!
//! 1. **Fetch** the most recent context window from the history store
//! 2. **Assemble** the window plus the new prompt into the LLM wire schema
//! 3. **Send** the assembled contents to the LLM endpoint
//! 4. **Persist** the user turn, then the reply turn
//! 5. **Return** the reply text
//!
//! Nothing is written to the store until a reply has been obtained, so a
//! failed LLM call leaves history untouched.

pub mod assembler;
pub mod relay;

pub use assembler::assemble_context;
pub use relay::Exchange;
