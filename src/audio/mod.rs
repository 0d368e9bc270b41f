//! Microphone capture and resampling for local speech recognition

pub mod input;
pub mod resampler;

pub use input::{downmix, Microphone};
pub use resampler::{resample_audio, AudioResampler};
