use crate::core::message::Turn;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::collections::VecDeque;

/// Handles transcript line building and all scroll-related calculations
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Build display lines for the whole transcript
    pub fn build_display_lines(turns: &VecDeque<Turn>) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for turn in turns {
            Self::add_turn_lines(&mut lines, turn);
        }

        lines
    }

    /// Add lines for a single turn to the lines vector
    fn add_turn_lines(lines: &mut Vec<Line<'static>>, turn: &Turn) {
        if turn.is_user() {
            // User turns: cyan with "You:" prefix; image turns carry their
            // preview label as the text
            lines.push(Line::from(vec![
                Span::styled(
                    "You: ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(turn.text.clone(), Style::default().fg(Color::Cyan)),
            ]));
            lines.push(Line::from("")); // Empty line for spacing
        } else if !turn.text.is_empty() {
            // What the server heard, quoted and dim, above the translation
            if let Some(heard) = &turn.transcription {
                lines.push(Line::from(Span::styled(
                    format!("\u{201c}{heard}\u{201d}"),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
            // Bot turns: no prefix, content in white/default color
            for content_line in turn.text.lines() {
                if content_line.trim().is_empty() {
                    lines.push(Line::from(""));
                } else {
                    lines.push(Line::from(Span::styled(
                        content_line.to_string(),
                        Style::default().fg(Color::White),
                    )));
                }
            }
            lines.push(Line::from("")); // Empty line for spacing
        }
    }

    /// Calculate how many wrapped lines the given lines will take
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        let mut total_wrapped_lines = 0u16;

        for line in lines {
            let line_text = line.to_string();
            let trimmed_text = line_text.trim();

            if trimmed_text.is_empty() || terminal_width == 0 {
                total_wrapped_lines = total_wrapped_lines.saturating_add(1);
            } else {
                // Word-based wrapping to match ratatui's behavior
                let wrapped_count = Self::calculate_word_wrapped_lines(trimmed_text, terminal_width);
                total_wrapped_lines = total_wrapped_lines.saturating_add(wrapped_count);
            }
        }

        total_wrapped_lines
    }

    /// Calculate how many lines a single text string will wrap to
    fn calculate_word_wrapped_lines(text: &str, terminal_width: u16) -> u16 {
        let mut current_line_len = 0;
        let mut line_count = 1u16;

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            // Start new line if adding this word would exceed width
            if current_line_len > 0 && current_line_len + 1 + word_len > terminal_width as usize {
                line_count = line_count.saturating_add(1);
                current_line_len = word_len;
            } else {
                if current_line_len > 0 {
                    current_line_len += 1; // Add space
                }
                current_line_len += word_len;
            }
        }

        line_count
    }

    /// Calculate scroll offset to show the bottom of the transcript
    pub fn calculate_scroll_to_bottom(
        turns: &VecDeque<Turn>,
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        let lines = Self::build_display_lines(turns);
        let total_wrapped_lines = Self::calculate_wrapped_line_count(&lines, terminal_width);

        total_wrapped_lines.saturating_sub(available_height)
    }

    /// Calculate maximum scroll offset
    pub fn calculate_max_scroll_offset(
        turns: &VecDeque<Turn>,
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        Self::calculate_scroll_to_bottom(turns, terminal_width, available_height)
    }
}
