//! Text-to-speech output
//!
//! The read-aloud control hands the last assistant reply to a
//! [`SpeechSynthesizer`]. Submission is fire-and-forget: the synthesizer
//! queues or plays the utterance on its own and reports nothing back.
//!
//! Two backends are provided. [`CommandSynthesizer`] runs an external
//! speech program (`espeak-ng`, `espeak`, `say`, or a configured command);
//! [`NativeSynthesizer`] uses the platform speech API through the `tts`
//! crate when the `native-tts` feature is enabled.

use crate::config::SpeechConfig;
use crate::session::Session;
use crate::{AssistError, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Speaking rate that speech engines treat as their normal pace
#[cfg(feature = "native-tts")]
const NORMAL_WORDS_PER_MINUTE: f32 = 175.0;

/// A unit of text submitted for audible playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// BCP 47 locale tag, e.g. `en-US`
    pub language: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}

/// Voice parameters applied by every synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// BCP 47 locale tag, used as the voice when none is preferred
    pub language: String,
    /// Words per minute
    pub rate: u32,
    /// 0.0 (silent) to 1.0 (full volume)
    pub volume: f32,
    /// Preferred voice, matched case-insensitively against voice ids and names
    pub voice: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

impl From<&SpeechConfig> for VoiceSettings {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            rate: config.speech_rate,
            volume: config.speech_volume,
            voice: config.voice.clone(),
        }
    }
}

impl VoiceSettings {
    fn volume_fraction(&self) -> f32 {
        self.volume.clamp(0.0, 1.0)
    }
}

/// Platform speech synthesis capability
pub trait SpeechSynthesizer {
    /// Submit an utterance for playback without waiting for it to finish
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;

    /// Short backend name for logs and tooltips
    fn name(&self) -> &str;
}

/// How the utterance text reaches a speech program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDelivery {
    /// Appended after all configured arguments
    Argument,
    /// Written to the program's standard input
    Stdin,
}

/// Synthesizer that runs an external speech program per utterance
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    delivery: TextDelivery,
}

impl CommandSynthesizer {
    /// Run `program args.. <text>` for every utterance
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            delivery: TextDelivery::Argument,
        }
    }

    /// Feed the text on standard input instead of the command line
    pub fn with_stdin(mut self) -> Self {
        self.delivery = TextDelivery::Stdin;
        self
    }

    /// Build from an argv list such as `["espeak-ng", "-s", "160", "--"]`
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AssistError::ConfigError("tts_command must name a program".into()))?;
        Ok(Self::new(program, args.to_vec()))
    }

    /// Find a known speech program on `PATH`
    pub fn detect(settings: &VoiceSettings) -> Option<Self> {
        Self::detect_in(settings, std::env::var_os("PATH"))
    }

    /// Find a known speech program in an explicit search path
    pub fn detect_in(settings: &VoiceSettings, search_path: Option<OsString>) -> Option<Self> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let find = |name: &str| which::which_in(name, search_path.as_ref(), &cwd).ok();

        let synth = ["espeak-ng", "espeak"]
            .into_iter()
            .find_map(&find)
            .map(|program| Self::new(program, espeak_args(settings)))
            .or_else(|| find("say").map(|program| Self::new(program, say_args(settings)).with_stdin()))?;

        info!("Using speech program {:?}", synth.program);
        Some(synth)
    }

    /// Arguments passed for one utterance
    pub fn command_args(&self, utterance: &Utterance) -> Vec<String> {
        let mut args = self.args.clone();
        if self.delivery == TextDelivery::Argument {
            args.push(utterance.text.clone());
        }
        args
    }

    pub fn delivery(&self) -> TextDelivery {
        self.delivery
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// espeak options; `--` ends option parsing so replies starting with `-` stay text
fn espeak_args(settings: &VoiceSettings) -> Vec<String> {
    let voice = settings
        .voice
        .clone()
        .unwrap_or_else(|| settings.language.to_ascii_lowercase());
    let amplitude = (settings.volume_fraction() * 100.0).round() as u32;

    vec![
        "-v".to_string(),
        voice,
        "-s".to_string(),
        settings.rate.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
        "--".to_string(),
    ]
}

/// `say` options; the text itself goes over stdin
fn say_args(settings: &VoiceSettings) -> Vec<String> {
    let mut args = vec!["-r".to_string(), settings.rate.to_string()];
    if let Some(voice) = &settings.voice {
        args.push("-v".to_string());
        args.push(voice.clone());
    }
    args
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let stdin = match self.delivery {
            TextDelivery::Argument => Stdio::null(),
            TextDelivery::Stdin => Stdio::piped(),
        };

        let mut child = Command::new(&self.program)
            .args(self.command_args(utterance))
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AssistError::SynthesisError(format!(
                    "Failed to start {:?}: {}",
                    self.program, e
                ))
            })?;

        debug!("Speaking {} chars with pid {}", utterance.text.len(), child.id());

        let text = utterance.text.clone();
        // Feed and reap the child without blocking the caller
        std::thread::spawn(move || {
            if let Some(mut input) = child.stdin.take() {
                if let Err(e) = input.write_all(text.as_bytes()) {
                    warn!("Failed to pass text to speech program: {}", e);
                }
            }

            match child.wait() {
                Ok(status) if !status.success() => warn!("Speech program exited with {}", status),
                Ok(_) => {}
                Err(e) => warn!("Failed to wait for speech program: {}", e),
            }
        });

        Ok(())
    }

    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("command")
    }
}

/// Whether a voice id or name contains the preferred voice name
pub fn voice_matches(id: &str, name: &str, preferred: &str) -> bool {
    let preferred = preferred.to_lowercase();
    id.to_lowercase().contains(&preferred) || name.to_lowercase().contains(&preferred)
}

/// Synthesizer backed by the operating system's speech API
#[cfg(feature = "native-tts")]
pub struct NativeSynthesizer {
    tts: tts::Tts,
}

#[cfg(feature = "native-tts")]
impl NativeSynthesizer {
    pub fn new(settings: &VoiceSettings) -> Result<Self> {
        let mut tts = tts::Tts::default()
            .map_err(|e| AssistError::SynthesisError(format!("Native TTS unavailable: {}", e)))?;
        let features = tts.supported_features();

        if features.rate {
            let rate = tts.normal_rate() * settings.rate as f32 / NORMAL_WORDS_PER_MINUTE;
            let rate = rate.clamp(tts.min_rate(), tts.max_rate());
            tts.set_rate(rate)
                .map_err(|e| AssistError::SynthesisError(format!("Failed to set rate: {}", e)))?;
        }

        if features.volume {
            let (min, max) = (tts.min_volume(), tts.max_volume());
            tts.set_volume(min + settings.volume_fraction() * (max - min))
                .map_err(|e| AssistError::SynthesisError(format!("Failed to set volume: {}", e)))?;
        }

        if let (true, Some(preferred)) = (features.voice, settings.voice.as_deref()) {
            let voices = tts
                .voices()
                .map_err(|e| AssistError::SynthesisError(format!("Failed to list voices: {}", e)))?;
            match voices
                .iter()
                .find(|v| voice_matches(&v.id(), &v.name(), preferred))
            {
                Some(voice) => {
                    tts.set_voice(voice).map_err(|e| {
                        AssistError::SynthesisError(format!("Failed to set voice: {}", e))
                    })?;
                    info!("Using voice {}", voice.name());
                }
                None => warn!("Preferred voice {:?} not found, using default", preferred),
            }
        }

        info!("Initialized native speech synthesis");
        Ok(Self { tts })
    }
}

#[cfg(feature = "native-tts")]
impl SpeechSynthesizer for NativeSynthesizer {
    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        // Queue behind anything already speaking
        self.tts
            .speak(utterance.text.clone(), false)
            .map_err(|e| AssistError::SynthesisError(format!("Native TTS failed: {}", e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "native"
    }
}

/// Pick the synthesizer for this platform, if any
pub fn detect_synthesizer(config: &SpeechConfig) -> Option<Box<dyn SpeechSynthesizer>> {
    let settings = VoiceSettings::from(config);

    if let Some(argv) = &config.tts_command {
        match CommandSynthesizer::from_argv(argv) {
            Ok(synth) => return Some(Box::new(synth)),
            Err(e) => warn!("Ignoring tts_command: {}", e),
        }
    }

    #[cfg(feature = "native-tts")]
    {
        match NativeSynthesizer::new(&settings) {
            Ok(synth) => return Some(Box::new(synth)),
            Err(e) => warn!("{}", e),
        }
    }

    match CommandSynthesizer::detect(&settings) {
        Some(synth) => Some(Box::new(synth)),
        None => {
            info!("No speech synthesizer available");
            None
        }
    }
}

/// Read-aloud control: speaks the last assistant reply on demand
pub struct SpeechOutputTrigger {
    session: Session,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    language: String,
}

impl SpeechOutputTrigger {
    pub fn new(
        session: Session,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            session,
            synthesizer,
            language: language.into(),
        }
    }

    /// Whether a synthesizer backend exists at all
    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Tooltip for the control when no backend exists
    pub fn unavailable_reason(&self) -> Option<&'static str> {
        if self.is_available() {
            None
        } else {
            Some("Speech synthesis not supported on this system.")
        }
    }

    /// Speak the last reply; returns `false` when there was nothing to speak
    pub fn trigger(&mut self) -> Result<bool> {
        let Some(text) = self.session.last_response() else {
            debug!("No response to speak yet");
            return Ok(false);
        };

        let Some(synth) = self.synthesizer.as_mut() else {
            return Ok(false);
        };

        debug!("Submitting utterance to {}", synth.name());
        synth.speak(&Utterance::new(text, self.language.clone()))?;
        Ok(true)
    }
}
