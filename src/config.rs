//! Configuration for the assistant client
//!
//! Provides centralized configuration for the backend connection, the speech
//! backends and the window. Values are read from `config.toml` in the user's
//! configuration directory and fall back to defaults.

use crate::{AssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backend connection settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Scheme, host and port of the assistant backend
    pub base_url: String,

    /// Path of the query endpoint
    pub query_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            query_path: "/query".to_string(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the query endpoint
    pub fn query_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.query_path.trim_start_matches('/')
        )
    }
}

/// Speech input and output settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP 47 locale tag used for recognition and synthesis
    pub language: String,

    /// Whether partial transcripts are reported
    pub interim_results: bool,

    /// Maximum alternative transcripts per utterance
    pub max_alternatives: u32,

    /// Explicit synthesizer command; the text is appended as last argument,
    /// so end the list with `--` for programs that parse options
    pub tts_command: Option<Vec<String>>,

    /// Read-aloud speed in words per minute
    pub speech_rate: u32,

    /// Read-aloud volume from 0.0 to 1.0
    pub speech_volume: f32,

    /// Preferred synthesis voice, matched against voice ids and names
    pub voice: Option<String>,

    /// Path to the Whisper model file
    pub whisper_model: PathBuf,

    /// How long to wait for speech to begin (seconds)
    pub listen_timeout_secs: f32,

    /// Longest phrase recorded once speech began (seconds)
    pub phrase_time_limit_secs: f32,

    /// Trailing silence that ends a phrase (seconds)
    pub silence_secs: f32,

    /// RMS level above which a frame counts as speech
    pub energy_threshold: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
            tts_command: None,
            speech_rate: 130,
            speech_volume: 1.0,
            voice: None,
            whisper_model: PathBuf::from("models/ggml-base.en.bin"),
            listen_timeout_secs: 5.0,
            phrase_time_limit_secs: 5.0,
            silence_secs: 0.8,
            energy_threshold: 0.01,
        }
    }
}

/// Native window settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "AI Assistant".to_string(),
            width: 500.0,
            height: 650.0,
        }
    }
}

/// Configuration for the complete client
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistConfig {
    pub backend: BackendConfig,
    pub speech: SpeechConfig,
    pub window: WindowConfig,
}

impl AssistConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vassist").join("config.toml"))
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| AssistError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        info!("Loaded configuration from {:?}", path);
        Self::from_toml(&text)
    }

    /// Load from the default location, or use defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Point the client at another backend
    pub fn with_backend_url(mut self, base_url: impl Into<String>) -> Self {
        self.backend.base_url = base_url.into();
        self
    }

    /// Set the speech locale
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.speech.language = language.into();
        self
    }

    /// Use an explicit synthesizer command
    pub fn with_tts_command(mut self, argv: Vec<String>) -> Self {
        self.speech.tts_command = Some(argv);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AssistError::ConfigError(format!(
                "Backend URL must use http or https: {}",
                url
            )));
        }

        if self.speech.language.trim().is_empty() {
            return Err(AssistError::ConfigError(
                "Speech language must not be empty".to_string(),
            ));
        }

        if self.speech.max_alternatives == 0 {
            return Err(AssistError::ConfigError(
                "max_alternatives must be at least 1".to_string(),
            ));
        }

        if let Some(argv) = &self.speech.tts_command {
            if argv.is_empty() {
                return Err(AssistError::ConfigError(
                    "tts_command must name a program".to_string(),
                ));
            }
        }

        if self.speech.speech_rate == 0 {
            return Err(AssistError::ConfigError(
                "speech_rate must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.speech.speech_volume) {
            return Err(AssistError::ConfigError(format!(
                "speech_volume must be between 0.0 and 1.0, got {}",
                self.speech.speech_volume
            )));
        }

        let timings = [
            ("listen_timeout_secs", self.speech.listen_timeout_secs),
            ("phrase_time_limit_secs", self.speech.phrase_time_limit_secs),
            ("silence_secs", self.speech.silence_secs),
        ];
        for (name, value) in timings {
            if value <= 0.0 {
                return Err(AssistError::ConfigError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssistConfig::default();
        assert_eq!(config.backend.query_url(), "http://127.0.0.1:5000/query");
        assert_eq!(config.speech.language, "en-US");
        assert!(!config.speech.interim_results);
        assert_eq!(config.speech.max_alternatives, 1);
        assert_eq!(config.speech.speech_rate, 130);
        assert_eq!(config.speech.speech_volume, 1.0);
        assert_eq!(config.speech.voice, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_voice_settings_from_toml() {
        let config = AssistConfig::from_toml(
            r#"
            [speech]
            speech_rate = 100
            speech_volume = 0.8
            voice = "david"
            "#,
        )
        .unwrap();

        assert_eq!(config.speech.speech_rate, 100);
        assert_eq!(config.speech.speech_volume, 0.8);
        assert_eq!(config.speech.voice.as_deref(), Some("david"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_voice_settings() {
        let mut config = AssistConfig::default();
        config.speech.speech_volume = 1.5;
        assert!(matches!(config.validate(), Err(AssistError::ConfigError(_))));

        let mut config = AssistConfig::default();
        config.speech.speech_rate = 0;
        assert!(matches!(config.validate(), Err(AssistError::ConfigError(_))));
    }

    #[test]
    fn test_query_url_joins_slashes() {
        let backend = BackendConfig {
            base_url: "http://localhost:8080/".to_string(),
            query_path: "query".to_string(),
        };
        assert_eq!(backend.query_url(), "http://localhost:8080/query");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AssistConfig::from_toml(
            r#"
            [backend]
            base_url = "https://assistant.example"

            [speech]
            language = "de-DE"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.query_url(), "https://assistant.example/query");
        assert_eq!(config.speech.language, "de-DE");
        assert_eq!(config.speech.max_alternatives, 1);
        assert_eq!(config.window.title, "AI Assistant");
    }

    #[test]
    fn test_validation_failures() {
        let config = AssistConfig::default().with_backend_url("ftp://nowhere");
        assert!(matches!(config.validate(), Err(AssistError::ConfigError(_))));

        let config = AssistConfig::default().with_language("  ");
        assert!(config.validate().is_err());

        let config = AssistConfig::default().with_tts_command(Vec::new());
        assert!(config.validate().is_err());

        let mut config = AssistConfig::default();
        config.speech.silence_secs = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AssistConfig::from_toml("backend = 3").is_err());
    }
}
