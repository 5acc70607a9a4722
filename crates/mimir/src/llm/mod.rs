//! Language model access
//!
//! All text generation goes through the [`LanguageModel`] trait. The only
//! production implementation talks to OpenAI-compatible HTTP APIs.

pub mod provider;
pub mod remote;

pub use provider::{LanguageModel, LlmError};
pub use remote::RemoteModel;
