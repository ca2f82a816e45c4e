//! gemchat: console chat for Google's Gemini multimodal generation API.
//!
//! Module map:
//! - [`config`] / [`error`] / [`logger`]  ambient plumbing
//! - [`session`]   append-only conversation state, one per running session
//! - [`llm`]       provider adapters (Gemini over REST, dummy echo)
//! - [`chat`]      the turn controller tying input, state, and provider together
//! - [`console`]   the interactive stdin/stdout surface
//!
//! The `gemchat` binary wires these together; `gemchat-models` is a
//! standalone diagnostic that lists the models available to the API key.

pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod llm;
pub mod logger;
pub mod session;

pub use error::AppError;
