use thiserror::Error;

use mediflow_core::error::MediflowError;

/// Errors from the chat-completion client.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured; set OPENAI_API_KEY or [llm].api_key")]
    MissingApiKey,

    #[error("cannot reach completion service at {0}")]
    Connection(String),

    #[error("completion request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("completion service returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for MediflowError {
    fn from(err: LlmError) -> Self {
        MediflowError::Completion(err.to_string())
    }
}
