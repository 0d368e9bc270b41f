//! Speech-to-text input
//!
//! A [`SpeechRecognizer`] is detected once at startup. When none exists the
//! microphone control stays disabled for the lifetime of the window. When
//! one exists it is configured once and reused for every click; results
//! and errors arrive asynchronously as [`RecognitionEvent`]s.

use crate::config::SpeechConfig;
use crate::Result;
use crossbeam_channel::Receiver;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Recognition session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// BCP 47 locale tag
    pub language: String,
    /// Report partial transcripts while listening
    pub interim_results: bool,
    /// Maximum alternatives per recognized segment
    pub max_alternatives: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

impl From<&SpeechConfig> for RecognitionSettings {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            interim_results: config.interim_results,
            max_alternatives: config.max_alternatives,
        }
    }
}

/// One candidate transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

/// Recognized segments, each with its ranked alternatives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub segments: Vec<Vec<Alternative>>,
}

impl RecognitionResult {
    /// Result holding a single segment with a single alternative
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            segments: vec![vec![Alternative {
                transcript: transcript.into(),
                confidence: None,
            }]],
        }
    }

    /// Best transcript of the first segment
    pub fn top_transcript(&self) -> Option<&str> {
        self.segments
            .first()
            .and_then(|alternatives| alternatives.first())
            .map(|alt| alt.transcript.as_str())
    }
}

/// Recognition failure, named by its platform error code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("no-speech")]
    NoSpeech,

    #[error("audio-capture")]
    AudioCapture,

    #[error("not-allowed")]
    NotAllowed,

    #[error("network")]
    Network,

    #[error("aborted")]
    Aborted,

    #[error("language-not-supported")]
    LanguageNotSupported,

    #[error("service-not-allowed")]
    ServiceNotAllowed,

    /// The local recognition model could not be loaded
    #[error("model-unavailable")]
    ModelUnavailable,

    /// Audio was captured but could not be turned into text
    #[error("transcription-failed")]
    TranscriptionFailed,
}

impl RecognitionError {
    /// Platform error code as reported to the user
    pub fn code(&self) -> String {
        self.to_string()
    }
}

/// Asynchronous recognizer notifications
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// The session started capturing audio
    Start,
    Result(RecognitionResult),
    Error(RecognitionError),
    /// The session ended, after a result or an error
    End,
}

/// Platform speech recognition capability
pub trait SpeechRecognizer: Send {
    /// Apply session settings; called once before the first start
    fn configure(&mut self, settings: &RecognitionSettings) -> Result<()>;

    /// Begin listening; returns immediately, outcome arrives as events
    fn start(&mut self) -> Result<()>;

    /// Receiver for this recognizer's events
    fn events(&self) -> Receiver<RecognitionEvent>;
}

/// What a recognition event means for the UI
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Replace the query field with this transcript
    Transcript(String),
    /// Show a blocking alert with this message
    Alert(String),
}

/// Microphone control: starts recognition and surfaces its results
pub struct SpeechInputCapture {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    events: Option<Receiver<RecognitionEvent>>,
    listening: bool,
}

impl SpeechInputCapture {
    /// Wire the control to a detected recognizer, or disable it for good
    pub fn new(
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        settings: &RecognitionSettings,
    ) -> Self {
        let recognizer = recognizer.and_then(|mut recognizer| match recognizer.configure(settings) {
            Ok(()) => Some(recognizer),
            Err(e) => {
                warn!("Speech recognizer rejected settings: {}", e);
                None
            }
        });

        let events = recognizer.as_ref().map(|r| r.events());
        if recognizer.is_none() {
            info!("Speech recognition unavailable, microphone disabled");
        }

        Self {
            recognizer,
            events,
            listening: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Tooltip for the disabled control
    pub fn unavailable_reason(&self) -> Option<&'static str> {
        if self.is_available() {
            None
        } else {
            Some("Speech recognition not supported on this system.")
        }
    }

    /// A session is running and further clicks are ignored
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Handle a click on the microphone control
    ///
    /// Returns `true` if a recognition session was started.
    pub fn click(&mut self) -> Result<bool> {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return Ok(false);
        };

        if self.listening {
            debug!("Recognition already in progress, ignoring click");
            return Ok(false);
        }

        recognizer.start()?;
        self.listening = true;
        debug!("Recognition session started");
        Ok(true)
    }

    /// Drain recognizer events into UI outcomes
    pub fn poll(&mut self) -> Vec<CaptureOutcome> {
        let Some(events) = &self.events else {
            return Vec::new();
        };

        let mut outcomes = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                RecognitionEvent::Start => self.listening = true,
                RecognitionEvent::Result(result) => match result.top_transcript() {
                    Some(transcript) => {
                        debug!("Transcript: {:?}", transcript);
                        outcomes.push(CaptureOutcome::Transcript(transcript.to_string()));
                    }
                    None => debug!("Recognition result without segments"),
                },
                RecognitionEvent::Error(error) => {
                    warn!("Speech recognition error: {}", error.code());
                    self.listening = false;
                    outcomes.push(CaptureOutcome::Alert(format!(
                        "Speech recognition error: {}",
                        error.code()
                    )));
                }
                RecognitionEvent::End => self.listening = false,
            }
        }

        outcomes
    }
}

/// Find the speech recognizer for this platform, if any
pub fn detect_recognizer(config: &SpeechConfig) -> Option<Box<dyn SpeechRecognizer>> {
    #[cfg(feature = "whisper")]
    {
        match crate::speech::whisper::WhisperRecognizer::detect(config) {
            Ok(recognizer) => return Some(Box::new(recognizer)),
            Err(e) => info!("Whisper recognizer unavailable: {}", e),
        }
    }

    #[cfg(not(feature = "whisper"))]
    {
        let _ = config;
        info!("Dictation disabled: built without a recognizer (enable the `whisper` feature)");
    }

    None
}
