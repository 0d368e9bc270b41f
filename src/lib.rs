#[cfg(feature = "audio-io")]
pub mod audio;
pub mod config;
pub mod markup;
pub mod messages;
pub mod query;
pub mod session;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AssistError {
    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Backend returned HTTP {status}: {message}")]
    BackendStatus { status: u16, message: String },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Speech recognition error: {0}")]
    RecognitionError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for AssistError {
    fn from(e: std::io::Error) -> Self {
        AssistError::IOError(e.to_string())
    }
}

impl AssistError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The next submission may well succeed
            AssistError::RequestError(_) => true,
            AssistError::BackendStatus { status, .. } => *status >= 500,
            AssistError::ParseError(_) => true,
            AssistError::SynthesisError(_) => true,
            AssistError::RecognitionError(_) => true,
            // Hardware/device errors may require user intervention
            AssistError::AudioDeviceError(_) => false,
            AssistError::ModelLoadError(_) => false,
            AssistError::AudioProcessingError(_) => true,
            AssistError::ConfigError(_) => false,
            AssistError::ChannelError(_) => false,
            AssistError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            AssistError::RequestError(_) => {
                "Could not reach the assistant. Please check the backend is running.".to_string()
            }
            AssistError::BackendStatus { status, .. } => {
                format!("The assistant backend answered with HTTP {}.", status)
            }
            AssistError::ParseError(_) => {
                "The assistant sent a response that could not be read.".to_string()
            }
            AssistError::SynthesisError(_) => {
                "Text-to-speech failed. The response is still shown as text.".to_string()
            }
            AssistError::RecognitionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            AssistError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone.".to_string()
            }
            AssistError::ModelLoadError(_) => {
                "Failed to load the speech model. Please verify model files are present."
                    .to_string()
            }
            AssistError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            AssistError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            AssistError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            AssistError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistError>;
