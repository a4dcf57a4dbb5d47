use serde::{Deserialize, Serialize};

use crate::core::constants::VOICE_TURN_LABEL;

/// Author of a turn. The transcript only ever contains these two; app-level
/// notices (validation alerts, microphone errors) live on the status line
/// instead of in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_bot(self) -> bool {
        self == Sender::Bot
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Local preview reference for an image turn. The bytes themselves travel in
/// the request; the transcript only needs something to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub file_name: String,
}

/// One message in the conversation. Immutable once appended; insertion order
/// is display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
    /// What the server heard, for voice submissions. Rendered quoted above
    /// the translation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

impl Turn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            attachment: None,
            transcription: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// User turn carrying a local preview reference to an attached image.
    pub fn user_image(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            sender: Sender::User,
            text: format!("[image: {file_name}]"),
            attachment: Some(AttachmentRef { file_name }),
            transcription: None,
        }
    }

    /// User turn standing in for a just-recorded voice note.
    pub fn user_voice() -> Self {
        Self::new(Sender::User, VOICE_TURN_LABEL)
    }

    pub fn bot_with_transcription(
        text: impl Into<String>,
        transcription: impl Into<String>,
    ) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            attachment: None,
            transcription: Some(transcription.into()),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    pub fn is_bot(&self) -> bool {
        self.sender.is_bot()
    }
}
