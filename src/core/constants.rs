//! Shared constants used across the application

/// Host the original deployment answers on, used when neither the CLI flag,
/// the environment, nor the config file names one.
pub const DEFAULT_BASE_URL: &str = "https://moroccan-dialect-translator-backend.onrender.com";

/// Every modality posts here unless the config routes it elsewhere.
pub const DEFAULT_TRANSLATE_PATH: &str = "api/translator/translate";

/// Environment override for the base URL.
pub const BASE_URL_ENV: &str = "TARJEMLI_BASE_URL";

/// Hard ceiling on attached image size (5 MB), enforced before any network
/// call.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Bot turn seeded into every fresh session.
pub const GREETING: &str =
    "Salam! I can translate anything to Darija. What do you want to translate?";

/// Shown in place of a translation when a 2xx response carries none.
pub const NO_TRANSLATION_FALLBACK: &str = "(No translation received)";

/// Fixed user-facing replies for failed submissions, one per modality. The
/// underlying error goes to the diagnostic log, never to the transcript.
pub const TEXT_ERROR_REPLY: &str = "Sorry, I encountered an error connecting to the server.";
pub const IMAGE_ERROR_REPLY: &str = "Sorry, I couldn't read that image. Please try another one.";
pub const AUDIO_ERROR_REPLY: &str = "Sorry, I couldn't make out that recording. Please try again.";

/// Placeholder text for the user turn of a voice submission; the server-side
/// transcription arrives with the reply, not before.
pub const VOICE_TURN_LABEL: &str = "[voice message]";

/// File name the audio blob is uploaded under.
pub const AUDIO_UPLOAD_NAME: &str = "recording.wav";
