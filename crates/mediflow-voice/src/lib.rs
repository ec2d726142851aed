//! Mediflow voice crate - thin STT/TTS wrapper over a hosted speech provider.
//!
//! Two operations: transcribe audio bytes to text, and synthesize text to
//! audio bytes. Both are direct pass-throughs to the provider's REST API;
//! a mock implementation covers tests and offline development.

mod client;
mod error;

pub use client::DeepgramClient;
pub use error::VoiceError;

use async_trait::async_trait;

/// Speech service: speech-to-text and text-to-speech.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Transcribe audio to text. Empty audio yields an empty transcript.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, VoiceError>;

    /// Synthesize text to audio bytes. Empty text yields empty audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError>;
}

/// Mock speech service for tests.
///
/// Transcribes everything to a fixed phrase and synthesizes text to its
/// UTF-8 bytes, preserving the empty-input contract.
#[derive(Debug, Clone)]
pub struct MockSpeechService {
    pub transcript: String,
}

impl MockSpeechService {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
        }
    }
}

#[async_trait]
impl SpeechService for MockSpeechService {
    async fn transcribe(&self, audio: &[u8], _mime_type: &str) -> Result<String, VoiceError> {
        if audio.is_empty() {
            return Ok(String::new());
        }
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        Ok(text.as_bytes().to_vec())
    }
}

/// Split text into chunks at sentence boundaries, each at most `max_chars`.
///
/// The synthesis endpoint caps request length; long replies are chunked and
/// the audio concatenated.
pub(crate) fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if current.len() + sentence.len() <= max_chars {
            current.push_str(&sentence);
            continue;
        }
        if !current.is_empty() {
            chunks.push(current.trim().to_string());
            current = String::new();
        }
        if sentence.len() <= max_chars {
            current = sentence;
        } else {
            // A single sentence longer than the cap: hard-cut at char boundaries.
            let mut rest = sentence.as_str();
            while rest.len() > max_chars {
                // Last char boundary whose end still fits within the cap;
                // a single oversized char is taken whole so the loop advances.
                let cut = rest
                    .char_indices()
                    .map(|(i, c)| i + c.len_utf8())
                    .take_while(|end| *end <= max_chars)
                    .last()
                    .unwrap_or_else(|| {
                        rest.chars().next().map_or(rest.len(), char::len_utf8)
                    });
                chunks.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            current = rest.to_string();
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

/// Rough sentence splitter: breaks after '.', '!' or '?' followed by a space.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek() == Some(&' ') {
            chars.next(); // consume the space
            current.push(' ');
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}
