//! Deepgram REST client for transcription and synthesis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mediflow_core::config::VoiceConfig;

use crate::error::VoiceError;
use crate::{chunk_text, SpeechService};

/// Synthesis requests above this length are chunked at sentence boundaries.
const MAX_SYNTHESIS_CHARS: usize = 2000;

/// Transcription response shape (the fields we read).
#[derive(Deserialize)]
struct ListenResponse {
    results: Option<ListenResults>,
}

#[derive(Deserialize)]
struct ListenResults {
    channels: Vec<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: String,
}

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

/// HTTP client for the Deepgram speech API.
pub struct DeepgramClient {
    base_url: String,
    stt_model: String,
    tts_voice: String,
    api_key: String,
    client: reqwest::Client,
}

impl DeepgramClient {
    /// Build a client from configuration; fails when no API key is set.
    pub fn from_config(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let api_key = config.resolve_api_key().ok_or(VoiceError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Http(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stt_model: config.stt_model.clone(),
            tts_voice: config.tts_voice.clone(),
            api_key,
            client,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> VoiceError {
        if e.is_connect() {
            VoiceError::Connection(self.base_url.clone())
        } else {
            VoiceError::Http(e.to_string())
        }
    }

    async fn synthesize_chunk(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let url = format!("{}/v1/speak?model={}", self.base_url, self.tts_voice);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&SpeakRequest { text })
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechService for DeepgramClient {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, VoiceError> {
        if audio.is_empty() {
            return Ok(String::new());
        }

        let url = format!("{}/v1/listen?model={}", self.base_url, self.stt_model);
        debug!(bytes = audio.len(), mime_type, "Transcribing audio");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", mime_type)
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ListenResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Http(e.to_string()))?;

        // A response with no alternatives is treated as silence, not an error.
        let transcript = parsed
            .results
            .and_then(|r| r.channels.into_iter().next())
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .unwrap_or_default();
        Ok(transcript)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut audio = Vec::new();
        for chunk in chunk_text(text, MAX_SYNTHESIS_CHARS) {
            let part = self.synthesize_chunk(&chunk).await?;
            audio.extend_from_slice(&part);
        }
        debug!(text_len = text.len(), audio_bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }
}
