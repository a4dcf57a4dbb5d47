use serde::{Deserialize, Serialize};

/// JSON body for a text submission.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest<'a> {
    pub text: &'a str,
}

/// Response body shared by all three modalities. `translation` is optional
/// because deployments have been seen returning 2xx with an empty body on
/// filtered inputs; callers substitute a fixed placeholder.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslateResponse {
    #[serde(default)]
    pub translation: Option<String>,
    /// Only present for audio submissions, and only when the server managed
    /// to transcribe the recording.
    #[serde(default)]
    pub transcription: Option<String>,
}

/// Validated image bytes ready for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Finalized recording ready for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub wav_bytes: Vec<u8>,
}

pub mod client;

pub use client::{TranslateError, TranslatorApi, TranslatorClient};
