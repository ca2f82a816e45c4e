//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("attachment error: {0}")]
    Attachment(String),

    #[error("llm error: {0}")]
    Llm(#[from] ProviderError),
}
