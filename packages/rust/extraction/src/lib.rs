//! LLM-backed contact extraction.
//!
//! Sends a formatted search summary to a chat-completions endpoint under a
//! strict extraction contract, then recovers a validated, deduplicated list
//! of [`ExtractedContact`](dmfinder_shared::ExtractedContact) records from
//! whatever text comes back.

mod client;
mod prompt;
mod recovery;
mod records;

pub use client::ContactExtractor;
pub use prompt::{SYSTEM_PROMPT, user_message};
pub use recovery::{parse_contacts, recover_json};
pub use records::{classify, dedup_contacts};
