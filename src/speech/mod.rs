//! Speech input and output
//!
//! This module provides:
//! - Read-aloud of assistant replies through a [`SpeechSynthesizer`]
//! - Dictation into the query field through a [`SpeechRecognizer`]
//! - Whisper-based local recognition (feature `whisper`)

pub mod endpoint;
pub mod stt;
pub mod tts;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use stt::{
    detect_recognizer, CaptureOutcome, RecognitionError, RecognitionEvent, RecognitionResult,
    RecognitionSettings, SpeechInputCapture, SpeechRecognizer,
};
pub use tts::{
    detect_synthesizer, CommandSynthesizer, SpeechOutputTrigger, SpeechSynthesizer, TextDelivery,
    Utterance, VoiceSettings,
};
