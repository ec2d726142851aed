use thiserror::Error;
use uuid::Uuid;

use mediflow_core::error::MediflowError;
use mediflow_llm::LlmError;

/// Errors from the conversation agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("completion service failed: {0}")]
    Completion(#[from] LlmError),
}

impl From<AgentError> for MediflowError {
    fn from(err: AgentError) -> Self {
        MediflowError::Agent(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(AgentError::EmptyMessage.to_string(), "message cannot be empty");
        let id = Uuid::new_v4();
        assert!(AgentError::ConversationNotFound(id)
            .to_string()
            .contains(&id.to_string()));
    }

    #[test]
    fn test_llm_error_converts() {
        let err: AgentError = LlmError::MissingApiKey.into();
        assert!(matches!(err, AgentError::Completion(_)));
    }
}
