//! Microphone capture and WAV finalization.

pub mod recorder;
pub mod wav;

pub use recorder::{AudioClip, Recorder, RecorderError};
