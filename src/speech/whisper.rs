//! Local speech recognition with Whisper
//!
//! Each session opens the default microphone, lets the [`Endpointer`]
//! decide when the phrase is over, resamples the phrase to 16 kHz and runs
//! it through Whisper. The model is loaded on first use and kept for later
//! sessions.

use crate::audio::{resample_audio, Microphone};
use crate::config::SpeechConfig;
use crate::speech::endpoint::{EndpointConfig, EndpointState, Endpointer};
use crate::speech::stt::{
    RecognitionError, RecognitionEvent, RecognitionResult, RecognitionSettings, SpeechRecognizer,
};
use crate::{AssistError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

const WHISPER_SAMPLE_RATE: u32 = 16000;

pub struct WhisperRecognizer {
    model_path: PathBuf,
    language: Option<String>,
    endpoint: EndpointConfig,
    context: Arc<Mutex<Option<Arc<WhisperContext>>>>,
    busy: Arc<AtomicBool>,
    events_tx: Sender<RecognitionEvent>,
    events_rx: Receiver<RecognitionEvent>,
}

impl WhisperRecognizer {
    pub fn new(config: &SpeechConfig) -> Self {
        let (events_tx, events_rx) = unbounded();

        Self {
            model_path: config.whisper_model.clone(),
            language: whisper_language(&config.language),
            endpoint: EndpointConfig {
                sample_rate: WHISPER_SAMPLE_RATE,
                listen_timeout_secs: config.listen_timeout_secs,
                phrase_time_limit_secs: config.phrase_time_limit_secs,
                silence_secs: config.silence_secs,
                energy_threshold: config.energy_threshold,
            },
            context: Arc::new(Mutex::new(None)),
            busy: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx,
        }
    }

    /// Build a recognizer if both the model file and a microphone exist
    pub fn detect(config: &SpeechConfig) -> Result<Self> {
        if !config.whisper_model.exists() {
            return Err(AssistError::ModelLoadError(format!(
                "Whisper model not found: {:?}",
                config.whisper_model
            )));
        }

        if !Microphone::is_present() {
            return Err(AssistError::AudioDeviceError(
                "No input device available".into(),
            ));
        }

        info!("Whisper recognizer available ({:?})", config.whisper_model);
        Ok(Self::new(config))
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn configure(&mut self, settings: &RecognitionSettings) -> Result<()> {
        self.language = whisper_language(&settings.language);

        if settings.interim_results {
            warn!("Whisper does not produce interim results; only final transcripts are sent");
        }
        debug!(
            "Whisper configured: language {:?}, {} alternative(s)",
            self.language, settings.max_alternatives
        );
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("Whisper session already running");
            return Ok(());
        }

        let session = ListenSession {
            model_path: self.model_path.clone(),
            language: self.language.clone(),
            endpoint: self.endpoint,
            context: Arc::clone(&self.context),
            events_tx: self.events_tx.clone(),
        };
        let busy = Arc::clone(&self.busy);
        let events_tx = self.events_tx.clone();

        std::thread::Builder::new()
            .name("whisper-session".to_string())
            .spawn(move || {
                let _ = session.events_tx.send(RecognitionEvent::Start);
                let event = match session.run() {
                    Ok(result) => RecognitionEvent::Result(result),
                    Err(error) => RecognitionEvent::Error(error),
                };
                let _ = session.events_tx.send(event);
                let _ = session.events_tx.send(RecognitionEvent::End);
                busy.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.busy.store(false, Ordering::SeqCst);
                let _ = events_tx.send(RecognitionEvent::Error(RecognitionError::Aborted));
                AssistError::RecognitionError(format!("Failed to spawn session: {}", e))
            })?;

        Ok(())
    }

    fn events(&self) -> Receiver<RecognitionEvent> {
        self.events_rx.clone()
    }
}

struct ListenSession {
    model_path: PathBuf,
    language: Option<String>,
    endpoint: EndpointConfig,
    context: Arc<Mutex<Option<Arc<WhisperContext>>>>,
    events_tx: Sender<RecognitionEvent>,
}

impl ListenSession {
    fn run(&self) -> std::result::Result<RecognitionResult, RecognitionError> {
        let (phrase, sample_rate) = self.capture()?;

        let samples = resample_audio(&phrase, sample_rate, WHISPER_SAMPLE_RATE)
            .map_err(|e| recognition_failure(&e))?;

        let context = self.context().map_err(|e| recognition_failure(&e))?;

        let text = transcribe(&context, self.language.as_deref(), &samples)
            .map_err(|e| recognition_failure(&e))?;

        if text.is_empty() {
            return Err(RecognitionError::NoSpeech);
        }
        Ok(RecognitionResult::single(text))
    }

    fn capture(&self) -> std::result::Result<(Vec<f32>, u32), RecognitionError> {
        let microphone = Microphone::open().map_err(|e| recognition_failure(&e))?;
        let sample_rate = microphone.sample_rate();

        let mut endpointer = Endpointer::new(EndpointConfig {
            sample_rate,
            ..self.endpoint
        });

        let state = microphone
            .listen(&mut endpointer)
            .map_err(|e| recognition_failure(&e))?;
        if state == EndpointState::TimedOut {
            return Err(RecognitionError::NoSpeech);
        }

        let phrase = endpointer.into_phrase();
        debug!(
            "Captured {:.2}s of speech",
            phrase.len() as f32 / sample_rate as f32
        );
        Ok((phrase, sample_rate))
    }

    fn context(&self) -> Result<Arc<WhisperContext>> {
        let mut slot = self.context.lock();
        if let Some(context) = slot.as_ref() {
            return Ok(Arc::clone(context));
        }

        info!("Loading Whisper model from: {:?}", self.model_path);
        let path = self
            .model_path
            .to_str()
            .ok_or_else(|| AssistError::ModelLoadError("Invalid model path".to_string()))?;
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| {
                AssistError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e))
            })?;

        let context = Arc::new(context);
        *slot = Some(Arc::clone(&context));
        Ok(context)
    }
}

fn transcribe(context: &WhisperContext, language: Option<&str>, samples: &[f32]) -> Result<String> {
    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(4);
    params.set_translate(false);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_language(language);

    let mut state = context.create_state().map_err(|e| {
        AssistError::RecognitionError(format!("Failed to create state: {:?}", e))
    })?;

    state
        .full(params, samples)
        .map_err(|e| AssistError::RecognitionError(format!("Transcription failed: {:?}", e)))?;

    let segments = state
        .full_n_segments()
        .map_err(|e| AssistError::RecognitionError(format!("Failed to get segments: {:?}", e)))?;

    let mut text = String::new();
    for i in 0..segments {
        let segment = state.full_get_segment_text(i).map_err(|e| {
            AssistError::RecognitionError(format!("Failed to get segment text: {:?}", e))
        })?;
        text.push_str(&segment);
    }

    Ok(text.trim().to_string())
}

/// Error code reported to the user for a failed session
fn recognition_failure(error: &AssistError) -> RecognitionError {
    error!("{}", error);
    match error {
        AssistError::AudioDeviceError(_) => RecognitionError::AudioCapture,
        AssistError::ModelLoadError(_) => RecognitionError::ModelUnavailable,
        _ => RecognitionError::TranscriptionFailed,
    }
}

/// Whisper takes bare language codes: `en-US` becomes `en`
fn whisper_language(tag: &str) -> Option<String> {
    let code = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}
