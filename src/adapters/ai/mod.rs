//! AI provider adapters - interchangeable TextCompletion backends.
//!
//! Gemini is the conversational default; DeepSeek and Groq speak the
//! OpenAI-compatible chat-completions API and share one adapter. The
//! failover wrapper chains a fallback behind the primary for transient
//! failures.

mod failover;
mod gemini;
mod mock;
mod null;
mod openai_compat;

pub use failover::FailoverCompletion;
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::{MockCompletion, ScriptedReply};
pub use null::NullCompletion;
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
