use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::audio::wav::encode_wav;

/// Microphone acquisition failed; the recorder stays idle.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("no input device available")]
    NoInputDevice,
    #[error("could not read the input device configuration: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("could not open the input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start the input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// A finished recording, already finalized as WAV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub wav_bytes: Vec<u8>,
    pub sample_rate: u32,
}

struct ActiveCapture {
    // Held only to keep the device open; dropping it releases the stream.
    _stream: cpal::Stream,
    samples: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

/// Push-to-talk capture over the default input device. Two states: idle, or
/// holding a live stream that appends mono samples to a shared buffer.
#[derive(Default)]
pub struct Recorder {
    active: Option<ActiveCapture>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Acquire the default input device and start buffering. On any failure
    /// the recorder is left idle with no stream held.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.active.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(RecorderError::NoInputDevice)?;
        let config = device.default_input_config()?;
        let sample_rate = config.sample_rate();
        let channels = config.channels() as usize;

        let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
        let buffer = samples.clone();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| {
                    let mono: Vec<i16> = if channels > 1 {
                        data.chunks(channels)
                            .map(|frame| {
                                ((frame.iter().sum::<f32>() / channels as f32)
                                    * i16::MAX as f32) as i16
                            })
                            .collect()
                    } else {
                        data.iter().map(|&s| (s * i16::MAX as f32) as i16).collect()
                    };
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(mono);
                    }
                },
                |err| tracing::warn!(error = %err, "input stream error"),
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| {
                    let mono: Vec<i16> = if channels > 1 {
                        data.chunks(channels)
                            .map(|frame| {
                                (frame.iter().map(|&s| s as i32).sum::<i32>()
                                    / frame.len() as i32) as i16
                            })
                            .collect()
                    } else {
                        data.to_vec()
                    };
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(mono);
                    }
                },
                |err| tracing::warn!(error = %err, "input stream error"),
                None,
            )?,
            other => return Err(RecorderError::UnsupportedFormat(other)),
        };

        stream.play()?;
        tracing::debug!(sample_rate, channels, "recording started");

        self.active = Some(ActiveCapture {
            _stream: stream,
            samples,
            sample_rate,
        });
        Ok(())
    }

    /// Stop capturing and finalize the buffered audio. The stream is dropped
    /// before anything else happens, so the device is released even if the
    /// recording turns out to be empty or submission later fails. Returns
    /// `None` when not recording.
    pub fn stop(&mut self) -> Option<AudioClip> {
        let capture = self.active.take()?;
        let ActiveCapture {
            _stream,
            samples,
            sample_rate,
        } = capture;
        drop(_stream);

        let samples = samples.lock().map(|buf| buf.clone()).unwrap_or_default();
        tracing::debug!(samples = samples.len(), "recording finished");
        Some(AudioClip {
            wav_bytes: encode_wav(&samples, sample_rate, 1),
            sample_rate,
        })
    }
}
