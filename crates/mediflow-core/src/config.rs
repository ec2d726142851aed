use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Mediflow application.
///
/// Loaded from `~/.mediflow/config.toml` by default. Each section covers one
/// subsystem; all sections fall back to sensible defaults so a missing or
/// partial file still yields a runnable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediflowConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl MediflowConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MediflowConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Bind address for the API server.
    pub host: String,
    /// API server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        }
    }
}

/// Chat-completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key. Falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Provider base URL.
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: config value first, then OPENAI_API_KEY.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Speech provider settings (STT + TTS).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// API key. Falls back to the DEEPGRAM_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Provider base URL.
    pub base_url: String,
    /// Transcription model.
    pub stt_model: String,
    /// Synthesis voice model.
    pub tts_voice: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepgram.com".to_string(),
            stt_model: "nova-3".to_string(),
            tts_voice: "aura-2-asteria-en".to_string(),
        }
    }
}

impl VoiceConfig {
    /// Resolve the API key: config value first, then DEEPGRAM_API_KEY.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("DEEPGRAM_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Source table locations and persistence behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the provider table.
    pub providers_path: String,
    /// Path to the schedule table.
    pub schedules_path: String,
    /// Rewrite the schedule table after each booking.
    pub persist_bookings: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            providers_path: "data/providers.csv".to_string(),
            schedules_path: "data/schedules.csv".to_string(),
            persist_bookings: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MediflowConfig::default();
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.voice.stt_model, "nova-3");
        assert!(config.data.persist_bookings);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MediflowConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.host, "127.0.0.1");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = MediflowConfig::default();
        config.general.port = 9000;
        config.llm.model = "gpt-4o".to_string();
        config.save(&path).unwrap();

        let loaded = MediflowConfig::load(&path).unwrap();
        assert_eq!(loaded.general.port, 9000);
        assert_eq!(loaded.llm.model, "gpt-4o");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nport = 8080\n").unwrap();

        let config = MediflowConfig::load(&path).unwrap();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.llm.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_llm_api_key_from_config_wins() {
        let mut llm = LlmConfig::default();
        llm.api_key = Some("sk-from-config".to_string());
        assert_eq!(llm.resolve_api_key().as_deref(), Some("sk-from-config"));
    }

    #[test]
    fn test_empty_api_key_treated_as_absent() {
        let mut llm = LlmConfig::default();
        llm.api_key = Some(String::new());
        // Empty string should not count as a configured key (env may still apply).
        let resolved = llm.resolve_api_key();
        assert!(resolved.is_none() || !resolved.unwrap().is_empty());
    }
}
