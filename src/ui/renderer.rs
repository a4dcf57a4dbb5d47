use crate::core::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let lines = app.build_display_lines();

    // Calculate scroll position using wrapped line count
    let available_height = chunks[0].height.saturating_sub(1); // Account for title
    let total_wrapped_lines = app.calculate_wrapped_line_count(chunks[0].width);

    // Always use the app's scroll_offset, but ensure it's within bounds
    let max_offset = total_wrapped_lines.saturating_sub(available_height);
    let scroll_offset = app.scroll_offset.min(max_offset);

    let title = format!(
        "Tarjemli v{} - Darija translator • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        app.get_logging_status()
    );

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));

    f.render_widget(transcript, chunks[0]);

    // Status line: the terminal stand-in for browser alerts
    let status = Paragraph::new(app.status.as_deref().unwrap_or(""))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status, chunks[1]);

    let input_style = if app.session.is_recording() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let input_title = if app.session.is_recording() {
        "Recording… (Ctrl+R to stop and send, Ctrl+C to quit)"
    } else if app.session.is_busy() {
        "Translating… (Ctrl+C to quit)"
    } else {
        "Type your message (Enter to send, Ctrl+R to record, /help for help, Ctrl+C to quit)"
    };

    // Overlay the pulsing busy indicator at the right edge while a request
    // is in flight
    let pending_input = &app.session.pending_input;
    let input_text = if app.session.is_busy() {
        // Pulse animation phase (2 cycles per second)
        let elapsed = app.pulse_start.elapsed().as_millis() as f32 / 1000.0;
        let pulse_phase = (elapsed * 2.0) % 2.0;
        let pulse_intensity = if pulse_phase < 1.0 {
            pulse_phase
        } else {
            2.0 - pulse_phase
        };

        let symbol = if pulse_intensity < 0.33 {
            "○"
        } else if pulse_intensity < 0.66 {
            "◐"
        } else {
            "●"
        };

        // Build a string exactly as wide as the box interior with the
        // indicator pinned at the right edge
        let inner_width = chunks[2].width.saturating_sub(2) as usize;
        let mut result = vec![' '; inner_width];

        let input_chars: Vec<char> = pending_input.chars().collect();
        let max_input_len = inner_width.saturating_sub(3);

        for (i, &ch) in input_chars.iter().take(max_input_len).enumerate() {
            result[i] = ch;
        }

        if input_chars.len() > max_input_len && max_input_len >= 3 {
            result[max_input_len - 3] = '.';
            result[max_input_len - 2] = '.';
            result[max_input_len - 1] = '.';
        }

        if inner_width > 1 {
            if let Some(symbol_char) = symbol.chars().next() {
                result[inner_width - 2] = symbol_char;
            }
        }

        result.into_iter().collect()
    } else {
        pending_input.clone()
    };

    let input = Paragraph::new(input_text.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Reset))
                .title(input_title),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(input, chunks[2]);

    // Cursor sits after the typed input, clear of the indicator
    if !app.session.is_recording() {
        let max_cursor_pos = if app.session.is_busy() {
            chunks[2].width.saturating_sub(6)
        } else {
            chunks[2].width.saturating_sub(2)
        };

        let cursor_x = (pending_input.chars().count() as u16 + 1).min(max_cursor_pos);
        f.set_cursor_position((chunks[2].x + cursor_x, chunks[2].y + 1));
    }
}
