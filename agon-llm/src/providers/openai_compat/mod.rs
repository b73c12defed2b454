//! OpenAI-compatible chat-completions provider

mod client;
mod judge;
mod types;

pub use client::ChatClient;
pub use judge::ChatJudgeProvider;
