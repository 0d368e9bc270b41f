//! Microphone capture for one dictation phrase
//!
//! A [`Microphone`] is opened per recognition session. [`Microphone::listen`]
//! runs an input stream only for as long as the [`Endpointer`] is still
//! waiting for or recording speech, then closes it.

use crate::speech::endpoint::{EndpointState, Endpointer};
use crate::{AssistError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A device that goes quiet for this long is treated as lost
const STALL_TIMEOUT: Duration = Duration::from_secs(1);

/// Default input device and the format it captures in
pub struct Microphone {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
}

impl Microphone {
    /// Open the default input device
    pub fn open() -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| AssistError::AudioDeviceError("No input device available".into()))?;

        let supported = device.default_input_config().map_err(|e| {
            AssistError::AudioDeviceError(format!("Failed to get input config: {}", e))
        })?;

        info!(
            "Microphone: {} ({} Hz, {} ch, {:?})",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            supported.sample_rate().0,
            supported.channels(),
            supported.sample_format()
        );

        Ok(Self {
            device,
            format: supported.sample_format(),
            config: supported.into(),
        })
    }

    /// Whether the host reports any input device
    pub fn is_present() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Capture until the endpointer completes or times out
    ///
    /// The endpointer must be configured for [`Microphone::sample_rate`].
    pub fn listen(&self, endpointer: &mut Endpointer) -> Result<EndpointState> {
        let (chunk_tx, chunk_rx) = bounded(64);
        let stream = self.build_stream(chunk_tx)?;
        stream.play().map_err(|e| {
            AssistError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;
        debug!("Listening at {} Hz", self.sample_rate());

        let state = loop {
            match chunk_rx.recv_timeout(STALL_TIMEOUT) {
                Ok(chunk) => match endpointer.feed(&chunk) {
                    EndpointState::Waiting | EndpointState::Speaking => {}
                    done => break done,
                },
                Err(RecvTimeoutError::Timeout) => {
                    return Err(AssistError::AudioDeviceError(
                        "Microphone stopped delivering audio".into(),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AssistError::AudioDeviceError("Input stream closed".into()));
                }
            }
        };

        drop(stream);
        debug!("Stopped listening: {:?}", state);
        Ok(state)
    }

    fn build_stream(&self, chunk_tx: Sender<Vec<f32>>) -> Result<Stream> {
        match self.format {
            SampleFormat::F32 => self.build_typed::<f32>(chunk_tx),
            SampleFormat::I16 => self.build_typed::<i16>(chunk_tx),
            SampleFormat::U16 => self.build_typed::<u16>(chunk_tx),
            other => Err(AssistError::AudioDeviceError(format!(
                "Unsupported sample format: {:?}",
                other
            ))),
        }
    }

    fn build_typed<T>(&self, chunk_tx: Sender<Vec<f32>>) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.config.channels as usize;

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    // The listener is behind; losing a chunk only shortens the phrase
                    if chunk_tx.try_send(downmix(data, channels)).is_err() {
                        warn!("Dropping microphone chunk");
                    }
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| AssistError::AudioDeviceError(format!("Failed to build input stream: {}", e)))
    }
}

/// Average interleaved frames down to mono f32
pub fn downmix<T>(data: &[T], channels: usize) -> Vec<f32>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| {
            frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>() / frame.len() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo_f32() {
        let mono = downmix(&[0.5f32, -0.5, 1.0, 0.0], 2);
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn test_downmix_converts_integer_samples() {
        let mono = downmix(&[i16::MAX, i16::MAX, 0, 0], 2);
        assert!((mono[0] - 1.0).abs() < 1e-3);
        assert_eq!(mono[1], 0.0);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        assert_eq!(downmix(&[0.25f32, 0.75], 1), vec![0.25, 0.75]);
    }
}
