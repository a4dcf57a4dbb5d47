use async_trait::async_trait;
use reqwest::multipart;
use thiserror::Error;

use crate::api::{AudioPayload, ImagePayload, TranslateRequest, TranslateResponse};
use crate::core::config::Endpoints;
use crate::core::constants::AUDIO_UPLOAD_NAME;

/// Failure of one submission. Every non-2xx status collapses into
/// [`TranslateError::Status`]; the code is kept for the diagnostic log but
/// is not otherwise inspected.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Seam between the submission pipeline and the wire. The chat loop talks to
/// the real [`TranslatorClient`]; tests drive the pipeline with a stub.
#[async_trait]
pub trait TranslatorApi: Send + Sync {
    async fn translate_text(&self, text: &str) -> Result<TranslateResponse, TranslateError>;
    async fn translate_image(
        &self,
        image: ImagePayload,
    ) -> Result<TranslateResponse, TranslateError>;
    async fn translate_audio(
        &self,
        audio: AudioPayload,
    ) -> Result<TranslateResponse, TranslateError>;
}

#[derive(Clone)]
pub struct TranslatorClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl TranslatorClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn decode(response: reqwest::Response) -> Result<TranslateResponse, TranslateError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TranslatorApi for TranslatorClient {
    async fn translate_text(&self, text: &str) -> Result<TranslateResponse, TranslateError> {
        let response = self
            .http
            .post(self.endpoints.text_url())
            .json(&TranslateRequest { text })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn translate_image(
        &self,
        image: ImagePayload,
    ) -> Result<TranslateResponse, TranslateError> {
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        let form = multipart::Form::new().part("image", part);
        let response = self
            .http
            .post(self.endpoints.image_url())
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn translate_audio(
        &self,
        audio: AudioPayload,
    ) -> Result<TranslateResponse, TranslateError> {
        let part = multipart::Part::bytes(audio.wav_bytes)
            .file_name(AUDIO_UPLOAD_NAME)
            .mime_str("audio/wav")?;
        let form = multipart::Form::new().part("audio", part);
        let response = self
            .http
            .post(self.endpoints.audio_url())
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }
}
