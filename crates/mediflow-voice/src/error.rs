use thiserror::Error;

use mediflow_core::error::MediflowError;

/// Errors from the speech provider client.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("no API key configured; set DEEPGRAM_API_KEY or [voice].api_key")]
    MissingApiKey,

    #[error("cannot reach speech service at {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("speech service returned {status}: {body}")]
    Provider { status: u16, body: String },
}

impl From<VoiceError> for MediflowError {
    fn from(err: VoiceError) -> Self {
        MediflowError::Voice(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = VoiceError::Provider {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_converts_to_mediflow_error() {
        let err: MediflowError = VoiceError::MissingApiKey.into();
        assert!(matches!(err, MediflowError::Voice(_)));
    }
}
