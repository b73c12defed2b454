//! LLM provider implementations
//!
//! Concrete implementations of the JudgeProvider trait. The arena's
//! judging backends speak the OpenAI chat-completions wire format,
//! which Groq, OpenAI, and most self-hosted gateways all accept.

pub mod openai_compat;

pub use openai_compat::{ChatClient, ChatJudgeProvider};

use agon_core::{AgonError, LlmError};

pub(crate) fn request_failed(provider: &str, status: i32, message: impl Into<String>) -> AgonError {
    AgonError::Llm(LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> AgonError {
    AgonError::Llm(LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}
