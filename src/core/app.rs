use std::time::Instant;

use ratatui::text::Line;

use crate::api::{ImagePayload, TranslateResponse, TranslatorClient};
use crate::audio::Recorder;
use crate::core::config::Endpoints;
use crate::core::session::{Modality, SessionState, SubmitError};
use crate::utils::logging::LoggingState;
use crate::utils::scroll::ScrollCalculator;

/// Everything one run of the chat interface holds: the session itself plus
/// the recorder, the HTTP client, transcript logging, and the bits of UI
/// state (scroll, status line, busy pulse) the renderer reads.
pub struct App {
    pub session: SessionState,
    pub recorder: Recorder,
    pub client: TranslatorClient,
    pub logging: LoggingState,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub pulse_start: Instant,
    pub status: Option<String>,
    pub exit_requested: bool,
    submission_seq: u64,
}

impl App {
    pub fn new(
        endpoints: Endpoints,
        log_file: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let logging = LoggingState::new(log_file)?;

        Ok(App {
            session: SessionState::new(),
            recorder: Recorder::new(),
            client: TranslatorClient::new(endpoints),
            logging,
            scroll_offset: 0,
            auto_scroll: true,
            pulse_start: Instant::now(),
            status: None,
            exit_requested: false,
            submission_seq: 0,
        })
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn build_display_lines(&self) -> Vec<Line<'static>> {
        ScrollCalculator::build_display_lines(self.session.turns())
    }

    pub fn calculate_wrapped_line_count(&self, terminal_width: u16) -> u16 {
        let lines = self.build_display_lines();
        ScrollCalculator::calculate_wrapped_line_count(&lines, terminal_width)
    }

    pub fn calculate_max_scroll_offset(&self, available_height: u16, terminal_width: u16) -> u16 {
        ScrollCalculator::calculate_max_scroll_offset(
            self.session.turns(),
            terminal_width,
            available_height,
        )
    }

    /// Pin the view to the bottom when auto-scroll is engaged.
    pub fn update_scroll_position(&mut self, available_height: u16, terminal_width: u16) {
        if self.auto_scroll {
            self.scroll_offset = ScrollCalculator::calculate_scroll_to_bottom(
                self.session.turns(),
                terminal_width,
                available_height,
            );
        }
    }

    fn next_submission_id(&mut self) -> u64 {
        self.submission_seq += 1;
        self.submission_seq
    }

    fn log_last_turn(&self) {
        if let Some(turn) = self.session.turns().back() {
            if let Err(e) = self.logging.log_turn(turn) {
                tracing::warn!(error = %e, "failed to write transcript log");
            }
        }
    }

    /// Start a text submission: user turn appended, busy gate set, pulse
    /// restarted. Returns the text and the submission id for the service.
    pub fn begin_text_submission(&mut self) -> Result<(String, u64), SubmitError> {
        let text = self.session.begin_text()?;
        self.log_last_turn();
        self.pulse_start = Instant::now();
        Ok((text, self.next_submission_id()))
    }

    pub fn begin_image_submission(&mut self) -> Result<(ImagePayload, u64), SubmitError> {
        let payload = self.session.begin_image()?;
        self.log_last_turn();
        self.pulse_start = Instant::now();
        Ok((payload, self.next_submission_id()))
    }

    pub fn begin_audio_submission(&mut self) -> Result<u64, SubmitError> {
        self.session.begin_audio()?;
        self.log_last_turn();
        self.pulse_start = Instant::now();
        Ok(self.next_submission_id())
    }

    /// Land a submission outcome: bot turn appended, busy gate released,
    /// transcript logged, view pinned to the bottom.
    pub fn complete_submission(
        &mut self,
        modality: Modality,
        result: Result<TranslateResponse, String>,
        available_height: u16,
        terminal_width: u16,
    ) {
        self.session.complete(modality, result);
        self.log_last_turn();
        self.update_scroll_position(available_height, terminal_width);
    }

    pub fn get_logging_status(&self) -> String {
        self.logging.get_status_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    fn test_app() -> App {
        let endpoints = Endpoints::resolve_with_env(&Config::default(), None, None);
        App::new(endpoints, None).expect("app should build without a log file")
    }

    #[test]
    fn submission_ids_are_monotonic() {
        let mut app = test_app();
        app.session.pending_input = "one".to_string();
        let (_, first) = app.begin_text_submission().unwrap();
        app.complete_submission(Modality::Text, Err("boom".to_string()), 20, 80);
        app.session.pending_input = "two".to_string();
        let (_, second) = app.begin_text_submission().unwrap();
        assert!(second > first);
    }

    #[test]
    fn completion_releases_the_gate_and_pins_the_view() {
        let mut app = test_app();
        app.session.pending_input = "Hello".to_string();
        app.begin_text_submission().unwrap();
        assert!(app.session.is_busy());

        app.complete_submission(
            Modality::Text,
            Ok(TranslateResponse {
                translation: Some("Salam".to_string()),
                transcription: None,
            }),
            20,
            80,
        );
        assert!(!app.session.is_busy());
        assert_eq!(app.scroll_offset, 0);
        assert_eq!(app.session.turns().back().unwrap().text, "Salam");
    }

    #[test]
    fn status_line_is_settable_and_clearable() {
        let mut app = test_app();
        app.set_status("Attached photo.png");
        assert_eq!(app.status.as_deref(), Some("Attached photo.png"));
        app.clear_status();
        assert!(app.status.is_none());
    }
}
