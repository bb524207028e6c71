//! sitedb-generate
//!
//! The generation capability: agent prompt templates, an OpenAI-compatible
//! chat-completions client, and the bounded retry wrapper every call goes
//! through.

pub mod openai;
pub mod prompt;
pub mod retry;

pub use openai::OpenAiGenerator;
pub use retry::{backoff, invoke_with_retry, RetryPolicy};
