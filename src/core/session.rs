//! Chat session orchestration.
//!
//! [`SessionState`] owns the conversation and enforces the one-request-at-a-
//! time rule: every `begin_*` operation checks the busy gate before touching
//! state, and [`SessionState::complete`] releases it on every outcome.
//! [`SubmissionService`] carries the network leg on a spawned task and
//! reports back over a channel, so the gate is released by the event loop's
//! drain step no matter how the request ended.

use std::collections::VecDeque;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::api::{AudioPayload, ImagePayload, TranslateResponse, TranslatorApi};
use crate::core::constants::{
    AUDIO_ERROR_REPLY, GREETING, IMAGE_ERROR_REPLY, MAX_IMAGE_BYTES, NO_TRANSLATION_FALLBACK,
    TEXT_ERROR_REPLY,
};
use crate::core::message::Turn;

/// Input kind of a submission. Selects the endpoint route, the payload
/// encoding, and the fixed reply shown when the request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Image,
    Audio,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Audio => "audio",
        }
    }

    pub fn error_reply(self) -> &'static str {
        match self {
            Modality::Text => TEXT_ERROR_REPLY,
            Modality::Image => IMAGE_ERROR_REPLY,
            Modality::Audio => AUDIO_ERROR_REPLY,
        }
    }
}

/// Microphone capture is a discrete two-state machine; `Recording` is only
/// reachable from `Idle` while no submission is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

/// A `begin_*` precondition failed; state is unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("still waiting for the previous reply")]
    Busy,
    #[error("nothing to send")]
    EmptyInput,
    #[error("no image attached; use /attach <path> first")]
    NoPendingImage,
}

/// `select_image` rejected the file; the pending attachment is unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{0} is not an image file")]
    NotAnImage(String),
    #[error("{0} is larger than the 5 MB limit")]
    TooLarge(String),
}

/// A validated image waiting for `/send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl PendingImage {
    fn to_payload(&self) -> ImagePayload {
        ImagePayload {
            file_name: self.file_name.clone(),
            mime: self.mime,
            bytes: self.bytes.clone(),
        }
    }
}

/// Sniff the attachment's media type from its magic bytes. Extensions lie;
/// the bytes decide.
fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

/// The session: an append-only transcript plus the pending input, pending
/// attachment, busy gate, and recording state. Created fresh with a seeded
/// greeting; never persisted.
#[derive(Debug)]
pub struct SessionState {
    turns: VecDeque<Turn>,
    pub pending_input: String,
    pending_attachment: Option<PendingImage>,
    busy: bool,
    recording: RecordingState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let mut turns = VecDeque::new();
        turns.push_back(Turn::bot(GREETING));
        Self {
            turns,
            pending_input: String::new(),
            pending_attachment: None,
            busy: false,
            recording: RecordingState::Idle,
        }
    }

    pub fn turns(&self) -> &VecDeque<Turn> {
        &self.turns
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_recording(&self) -> bool {
        self.recording == RecordingState::Recording
    }

    pub fn pending_attachment(&self) -> Option<&PendingImage> {
        self.pending_attachment.as_ref()
    }

    /// Take the pending input as a text submission: appends the user turn
    /// with the raw text, sets the busy gate, and hands back what to send.
    pub fn begin_text(&mut self) -> Result<String, SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        if self.pending_input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        let text = std::mem::take(&mut self.pending_input);
        self.turns.push_back(Turn::user(text.clone()));
        self.busy = true;
        Ok(text)
    }

    /// Stage an image for submission. Rejections leave the pending
    /// attachment exactly as it was.
    pub fn select_image(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<(), AttachmentError> {
        let Some(mime) = sniff_image_mime(&bytes) else {
            return Err(AttachmentError::NotAnImage(file_name.to_string()));
        };
        if bytes.len() as u64 > MAX_IMAGE_BYTES {
            return Err(AttachmentError::TooLarge(file_name.to_string()));
        }
        self.pending_attachment = Some(PendingImage {
            file_name: file_name.to_string(),
            mime,
            bytes,
        });
        Ok(())
    }

    /// Submit the staged image: appends a user turn carrying the preview
    /// reference and sets the busy gate. The attachment itself is cleared on
    /// completion, not here, so a failed request leaves it available.
    pub fn begin_image(&mut self) -> Result<ImagePayload, SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        let pending = self
            .pending_attachment
            .as_ref()
            .ok_or(SubmitError::NoPendingImage)?;
        let payload = pending.to_payload();
        self.turns.push_back(Turn::user_image(pending.file_name.clone()));
        self.busy = true;
        Ok(payload)
    }

    /// Submit a finished recording: appends the fixed voice placeholder and
    /// sets the busy gate. The caller already holds the blob.
    pub fn begin_audio(&mut self) -> Result<(), SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        self.turns.push_back(Turn::user_voice());
        self.busy = true;
        Ok(())
    }

    pub fn start_recording(&mut self) -> Result<(), SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        self.recording = RecordingState::Recording;
        Ok(())
    }

    pub fn finish_recording(&mut self) {
        self.recording = RecordingState::Idle;
    }

    /// Land the outcome of a submission: append the bot turn (translation,
    /// or the modality's fixed error reply) and release the busy gate. The
    /// release is unconditional; every submission ends here exactly once.
    pub fn complete(&mut self, modality: Modality, result: Result<TranslateResponse, String>) {
        let turn = match result {
            Ok(response) => {
                let text = response
                    .translation
                    .unwrap_or_else(|| NO_TRANSLATION_FALLBACK.to_string());
                match response.transcription {
                    Some(heard) => Turn::bot_with_transcription(text, heard),
                    None => Turn::bot(text),
                }
            }
            Err(_) => Turn::bot(modality.error_reply()),
        };
        self.turns.push_back(turn);
        if modality == Modality::Image {
            self.pending_attachment = None;
        }
        self.busy = false;
    }
}

/// Completion of one submission. Exactly one of these is emitted per
/// `submit_*`, on success and failure alike; the error has already been
/// logged and is carried only for tests and debugging.
#[derive(Debug)]
pub enum SubmissionEvent {
    Finished {
        modality: Modality,
        result: Result<TranslateResponse, String>,
        submission_id: u64,
    },
}

/// Runs the network leg of a submission off the UI loop. Shaped like a
/// one-shot request/reply service: the chat loop keeps the receiver and
/// drains it every tick.
#[derive(Clone)]
pub struct SubmissionService {
    tx: mpsc::UnboundedSender<SubmissionEvent>,
}

impl SubmissionService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SubmissionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn submit_text<C>(&self, api: C, text: String, submission_id: u64)
    where
        C: TranslatorApi + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.translate_text(&text).await;
            Self::finish(&tx, Modality::Text, result, submission_id);
        });
    }

    pub fn submit_image<C>(&self, api: C, image: ImagePayload, submission_id: u64)
    where
        C: TranslatorApi + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.translate_image(image).await;
            Self::finish(&tx, Modality::Image, result, submission_id);
        });
    }

    pub fn submit_audio<C>(&self, api: C, audio: AudioPayload, submission_id: u64)
    where
        C: TranslatorApi + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.translate_audio(audio).await;
            Self::finish(&tx, Modality::Audio, result, submission_id);
        });
    }

    fn finish(
        tx: &mpsc::UnboundedSender<SubmissionEvent>,
        modality: Modality,
        result: Result<TranslateResponse, crate::api::TranslateError>,
        submission_id: u64,
    ) {
        let result = result.map_err(|err| {
            tracing::error!(
                modality = modality.as_str(),
                error = %err,
                "translate request failed"
            );
            err.to_string()
        });
        let _ = tx.send(SubmissionEvent::Finished {
            modality,
            result,
            submission_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TranslateError;
    use crate::core::constants::VOICE_TURN_LABEL;
    use crate::core::message::Sender;
    use async_trait::async_trait;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(len, 0);
        bytes
    }

    fn ok_response(translation: &str) -> Result<TranslateResponse, String> {
        Ok(TranslateResponse {
            translation: Some(translation.to_string()),
            transcription: None,
        })
    }

    #[test]
    fn new_sessions_seed_the_greeting() {
        let session = SessionState::new();
        assert_eq!(session.turns().len(), 1);
        let greeting = &session.turns()[0];
        assert!(greeting.is_bot());
        assert_eq!(greeting.text, GREETING);
        assert!(!session.is_busy());
        assert!(!session.is_recording());
    }

    #[test]
    fn text_happy_path_appends_user_then_bot() {
        let mut session = SessionState::new();
        session.pending_input = "Hello".to_string();

        let sent = session.begin_text().expect("submission should start");
        assert_eq!(sent, "Hello");
        assert!(session.is_busy());
        assert!(session.pending_input.is_empty());

        session.complete(Modality::Text, ok_response("Salam"));
        assert!(!session.is_busy());

        // Exactly two turns appended: user, then bot.
        assert_eq!(session.turns().len(), 3);
        let last = session.turns().back().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "Salam");
        assert_eq!(session.turns()[1].text, "Hello");
        assert!(session.turns()[1].is_user());
    }

    #[test]
    fn text_failure_path_appends_the_fixed_reply() {
        let mut session = SessionState::new();
        session.pending_input = "Hello".to_string();
        session.begin_text().unwrap();

        session.complete(Modality::Text, Err("server returned HTTP 500".to_string()));

        assert!(!session.is_busy());
        assert_eq!(session.turns().len(), 3);
        let last = session.turns().back().unwrap();
        assert!(last.is_bot());
        assert_eq!(
            last.text,
            "Sorry, I encountered an error connecting to the server."
        );
    }

    #[test]
    fn missing_translation_falls_back_to_the_placeholder() {
        let mut session = SessionState::new();
        session.pending_input = "Hello".to_string();
        session.begin_text().unwrap();
        session.complete(Modality::Text, Ok(TranslateResponse::default()));
        assert_eq!(
            session.turns().back().unwrap().text,
            NO_TRANSLATION_FALLBACK
        );
    }

    #[test]
    fn empty_or_blank_input_is_rejected_without_a_turn() {
        let mut session = SessionState::new();
        assert_eq!(session.begin_text(), Err(SubmitError::EmptyInput));
        session.pending_input = "   ".to_string();
        assert_eq!(session.begin_text(), Err(SubmitError::EmptyInput));
        assert_eq!(session.turns().len(), 1);
        assert!(!session.is_busy());
    }

    #[test]
    fn busy_gate_rejects_every_begin_operation() {
        let mut session = SessionState::new();
        session.pending_input = "first".to_string();
        session.begin_text().unwrap();
        assert!(session.is_busy());

        session.pending_input = "second".to_string();
        assert_eq!(session.begin_text(), Err(SubmitError::Busy));
        assert_eq!(session.begin_image(), Err(SubmitError::Busy));
        assert_eq!(session.begin_audio(), Err(SubmitError::Busy));
        assert_eq!(session.start_recording(), Err(SubmitError::Busy));

        // Nothing appended by the rejected attempts.
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.pending_input, "second");
    }

    #[test]
    fn select_image_rejects_non_image_bytes() {
        let mut session = SessionState::new();
        let result = session.select_image("notes.txt", b"hello world".to_vec());
        assert_eq!(
            result,
            Err(AttachmentError::NotAnImage("notes.txt".to_string()))
        );
        assert!(session.pending_attachment().is_none());
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn select_image_rejects_oversized_files() {
        let mut session = SessionState::new();
        let six_megabytes = png_bytes(6 * 1024 * 1024);
        let result = session.select_image("big.png", six_megabytes);
        assert_eq!(
            result,
            Err(AttachmentError::TooLarge("big.png".to_string()))
        );
        assert!(session.pending_attachment().is_none());
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn select_image_accepts_a_file_at_the_limit() {
        let mut session = SessionState::new();
        session
            .select_image("ok.png", png_bytes(MAX_IMAGE_BYTES as usize))
            .expect("file at the limit should be accepted");
        let pending = session.pending_attachment().unwrap();
        assert_eq!(pending.mime, "image/png");
        assert_eq!(pending.file_name, "ok.png");
    }

    #[test]
    fn reselecting_replaces_the_pending_attachment() {
        let mut session = SessionState::new();
        session.select_image("one.png", png_bytes(64)).unwrap();
        session.select_image("two.png", png_bytes(64)).unwrap();
        assert_eq!(session.pending_attachment().unwrap().file_name, "two.png");

        // A rejected pick keeps the previous attachment.
        let _ = session.select_image("bad.txt", b"nope".to_vec());
        assert_eq!(session.pending_attachment().unwrap().file_name, "two.png");
    }

    #[test]
    fn image_flow_clears_the_attachment_on_completion() {
        let mut session = SessionState::new();
        session.select_image("photo.png", png_bytes(128)).unwrap();

        let payload = session.begin_image().expect("submission should start");
        assert_eq!(payload.mime, "image/png");
        assert!(session.is_busy());
        assert!(session.pending_attachment().is_some());
        assert_eq!(session.turns().back().unwrap().text, "[image: photo.png]");

        session.complete(Modality::Image, ok_response("Tswira"));
        assert!(!session.is_busy());
        assert!(session.pending_attachment().is_none());
        assert_eq!(session.turns().back().unwrap().text, "Tswira");
    }

    #[test]
    fn begin_image_without_an_attachment_is_rejected() {
        let mut session = SessionState::new();
        assert_eq!(session.begin_image(), Err(SubmitError::NoPendingImage));
        assert!(!session.is_busy());
    }

    #[test]
    fn image_failure_uses_the_image_reply() {
        let mut session = SessionState::new();
        session.select_image("photo.png", png_bytes(128)).unwrap();
        session.begin_image().unwrap();
        session.complete(Modality::Image, Err("boom".to_string()));
        assert_eq!(session.turns().back().unwrap().text, IMAGE_ERROR_REPLY);
        assert!(!session.is_busy());
    }

    #[test]
    fn audio_flow_shows_transcription_and_translation() {
        let mut session = SessionState::new();
        session.start_recording().unwrap();
        assert!(session.is_recording());
        session.finish_recording();
        assert!(!session.is_recording());

        session.begin_audio().unwrap();
        assert_eq!(session.turns().back().unwrap().text, VOICE_TURN_LABEL);

        session.complete(
            Modality::Audio,
            Ok(TranslateResponse {
                translation: Some("Zwina".to_string()),
                transcription: Some("nice".to_string()),
            }),
        );
        let last = session.turns().back().unwrap();
        assert_eq!(last.text, "Zwina");
        assert_eq!(last.transcription.as_deref(), Some("nice"));
        assert!(!session.is_busy());
    }

    #[test]
    fn audio_failure_uses_the_audio_reply() {
        let mut session = SessionState::new();
        session.begin_audio().unwrap();
        session.complete(Modality::Audio, Err("boom".to_string()));
        assert_eq!(session.turns().back().unwrap().text, AUDIO_ERROR_REPLY);
    }

    struct StubApi {
        fail: bool,
    }

    #[async_trait]
    impl TranslatorApi for StubApi {
        async fn translate_text(&self, _text: &str) -> Result<TranslateResponse, TranslateError> {
            if self.fail {
                Err(TranslateError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ))
            } else {
                Ok(TranslateResponse {
                    translation: Some("Salam".to_string()),
                    transcription: None,
                })
            }
        }

        async fn translate_image(
            &self,
            _image: ImagePayload,
        ) -> Result<TranslateResponse, TranslateError> {
            Ok(TranslateResponse::default())
        }

        async fn translate_audio(
            &self,
            _audio: AudioPayload,
        ) -> Result<TranslateResponse, TranslateError> {
            Ok(TranslateResponse::default())
        }
    }

    #[tokio::test]
    async fn service_emits_one_event_per_submission() {
        let (service, mut rx) = SubmissionService::new();

        service.submit_text(StubApi { fail: false }, "Hello".to_string(), 1);
        let SubmissionEvent::Finished {
            modality,
            result,
            submission_id,
        } = rx.recv().await.expect("event for the ok submission");
        assert_eq!(modality, Modality::Text);
        assert_eq!(submission_id, 1);
        assert_eq!(result.unwrap().translation.as_deref(), Some("Salam"));

        service.submit_text(StubApi { fail: true }, "Hello".to_string(), 2);
        let SubmissionEvent::Finished {
            result,
            submission_id,
            ..
        } = rx.recv().await.expect("event for the failed submission");
        assert_eq!(submission_id, 2);
        let err = result.unwrap_err();
        assert!(err.contains("500"), "error should carry the status: {err}");
    }

    #[tokio::test]
    async fn service_drives_the_session_through_a_full_cycle() {
        let (service, mut rx) = SubmissionService::new();
        let mut session = SessionState::new();
        session.pending_input = "Hello".to_string();

        let text = session.begin_text().unwrap();
        service.submit_text(StubApi { fail: false }, text, 1);

        let SubmissionEvent::Finished {
            modality, result, ..
        } = rx.recv().await.unwrap();
        session.complete(modality, result);

        assert!(!session.is_busy());
        assert_eq!(session.turns().back().unwrap().text, "Salam");
    }
}
