//! Energy-based end-of-speech detection
//!
//! Decides when a recognition session has heard enough. Audio is fed in
//! chunks; the endpointer waits for the level to rise above a threshold,
//! keeps everything from that point on, and finishes after a stretch of
//! trailing silence or when the phrase time limit is reached.

/// Endpointer parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointConfig {
    pub sample_rate: u32,
    /// Give up if speech has not started within this many seconds
    pub listen_timeout_secs: f32,
    /// Stop recording this many seconds after speech started
    pub phrase_time_limit_secs: f32,
    /// Trailing silence that ends the phrase
    pub silence_secs: f32,
    /// RMS level above which a chunk counts as speech
    pub energy_threshold: f32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            listen_timeout_secs: 5.0,
            phrase_time_limit_secs: 5.0,
            silence_secs: 0.8,
            energy_threshold: 0.01,
        }
    }
}

/// Where the session stands after the latest chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Still waiting for speech to begin
    Waiting,
    /// Speech is being recorded
    Speaking,
    /// The phrase is complete
    Complete,
    /// No speech arrived before the listen timeout
    TimedOut,
}

pub struct Endpointer {
    config: EndpointConfig,
    state: EndpointState,
    waited: usize,
    trailing_silence: usize,
    phrase: Vec<f32>,
}

impl Endpointer {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            state: EndpointState::Waiting,
            waited: 0,
            trailing_silence: 0,
            phrase: Vec::new(),
        }
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    fn samples_for(&self, secs: f32) -> usize {
        (secs * self.config.sample_rate as f32) as usize
    }

    /// Feed a mono chunk and report the new state
    pub fn feed(&mut self, chunk: &[f32]) -> EndpointState {
        if chunk.is_empty() {
            return self.state;
        }

        let loud = rms(chunk) >= self.config.energy_threshold;

        match self.state {
            EndpointState::Waiting => {
                if loud {
                    self.state = EndpointState::Speaking;
                    self.phrase.extend_from_slice(chunk);
                } else {
                    self.waited += chunk.len();
                    if self.waited >= self.samples_for(self.config.listen_timeout_secs) {
                        self.state = EndpointState::TimedOut;
                    }
                }
            }
            EndpointState::Speaking => {
                self.phrase.extend_from_slice(chunk);
                if loud {
                    self.trailing_silence = 0;
                } else {
                    self.trailing_silence += chunk.len();
                }

                if self.trailing_silence >= self.samples_for(self.config.silence_secs)
                    || self.phrase.len() >= self.samples_for(self.config.phrase_time_limit_secs)
                {
                    self.state = EndpointState::Complete;
                }
            }
            EndpointState::Complete | EndpointState::TimedOut => {}
        }

        self.state
    }

    /// Recorded phrase with the trailing silence trimmed off
    pub fn into_phrase(mut self) -> Vec<f32> {
        let keep = self.phrase.len().saturating_sub(self.trailing_silence);
        self.phrase.truncate(keep);
        self.phrase
    }
}

/// Root mean square level of a chunk
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}
