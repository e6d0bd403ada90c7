//! Run-scoped state.
//!
//! This module provides:
//! - The append-only run context that accumulates stage outputs
//! - Ephemeral per-stage conversations

mod conversation;
mod run_context;

pub use conversation::Conversation;
pub use run_context::{RunContext, PROMPT_DATE_FORMAT};
