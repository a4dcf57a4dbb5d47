//! Main chat event loop
//!
//! Draws the interface, handles user input, and drains submission results.
//! The network legs run on spawned tasks; this loop only ever waits on the
//! 50 ms event poll, so already-rendered content stays scrollable while a
//! request is in flight.

use crate::api::AudioPayload;
use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::config::{Config, Endpoints};
use crate::core::session::{SubmissionEvent, SubmissionService, SubmitError};
use crate::ui::renderer::ui;
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, sync::Arc, time::Duration};
use tokio::sync::Mutex;

pub async fn run_chat(
    log: Option<String>,
    base_url_flag: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let endpoints = Endpoints::resolve(&config, base_url_flag);

    let app = Arc::new(Mutex::new(match App::new(endpoints, log) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            std::process::exit(1);
        }
    }));

    // Setup terminal only after successful app creation
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (service, mut rx) = SubmissionService::new();

    let result = 'main_loop: loop {
        {
            let app_guard = app.lock().await;
            if app_guard.exit_requested {
                break 'main_loop Ok(());
            }
            terminal.draw(|f| ui(f, &app_guard))?;
        }

        // Cache terminal size for this tick; 1 title line, 1 status line,
        // 3 input lines
        let term_size = terminal.size().unwrap_or_default();
        let available_height = term_size.height.saturating_sub(5);

        // Handle events
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let ctrl = key.modifiers.contains(event::KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Char('c') if ctrl => {
                            break 'main_loop Ok(());
                        }
                        KeyCode::Char('l') if ctrl => {
                            let mut app_guard = app.lock().await;
                            app_guard.clear_status();
                        }
                        KeyCode::Char('r') if ctrl => {
                            let mut app_guard = app.lock().await;
                            toggle_recording(
                                &mut app_guard,
                                &service,
                                available_height,
                                term_size.width,
                            );
                        }
                        KeyCode::Enter => {
                            let mut app_guard = app.lock().await;
                            handle_enter(&mut app_guard, &service, available_height, term_size.width);
                        }
                        KeyCode::Char(c) if !ctrl => {
                            let mut app_guard = app.lock().await;
                            app_guard.session.pending_input.push(c);
                        }
                        KeyCode::Backspace => {
                            let mut app_guard = app.lock().await;
                            app_guard.session.pending_input.pop();
                        }
                        KeyCode::Up => {
                            let mut app_guard = app.lock().await;
                            scroll_up(&mut app_guard, 1);
                        }
                        KeyCode::Down => {
                            let mut app_guard = app.lock().await;
                            scroll_down(&mut app_guard, 1, available_height, term_size.width);
                        }
                        KeyCode::PageUp => {
                            let mut app_guard = app.lock().await;
                            scroll_up(&mut app_guard, available_height);
                        }
                        KeyCode::PageDown => {
                            let mut app_guard = app.lock().await;
                            scroll_down(
                                &mut app_guard,
                                available_height,
                                available_height,
                                term_size.width,
                            );
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let mut app_guard = app.lock().await;
                        scroll_up(&mut app_guard, 3);
                    }
                    MouseEventKind::ScrollDown => {
                        let mut app_guard = app.lock().await;
                        scroll_down(&mut app_guard, 3, available_height, term_size.width);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Drain completed submissions; each one releases the busy gate
        let mut received_any = false;
        while let Ok(event) = rx.try_recv() {
            let SubmissionEvent::Finished {
                modality, result, ..
            } = event;
            let mut app_guard = app.lock().await;
            app_guard.complete_submission(modality, result, available_height, term_size.width);
            received_any = true;
        }
        if received_any {
            continue; // Force a redraw after processing all updates
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn handle_enter(
    app: &mut App,
    service: &SubmissionService,
    available_height: u16,
    terminal_width: u16,
) {
    let input = app.session.pending_input.clone();
    if input.trim().is_empty() {
        return;
    }

    match process_input(app, &input) {
        CommandResult::Continue => {
            app.session.pending_input.clear();
        }
        CommandResult::SubmitPendingImage => {
            app.session.pending_input.clear();
            match app.begin_image_submission() {
                Ok((payload, submission_id)) => {
                    service.submit_image(app.client.clone(), payload, submission_id);
                    app.auto_scroll = true;
                    app.update_scroll_position(available_height, terminal_width);
                }
                Err(e) => app.set_status(e.to_string()),
            }
        }
        CommandResult::ProcessAsMessage(_) => match app.begin_text_submission() {
            Ok((text, submission_id)) => {
                service.submit_text(app.client.clone(), text, submission_id);
                app.auto_scroll = true;
                app.update_scroll_position(available_height, terminal_width);
            }
            // Blank input never reaches here, so any rejection is the busy gate
            Err(e) => app.set_status(e.to_string()),
        },
    }
}

/// Ctrl+R: press to start capturing, press again to stop. Stopping releases
/// the microphone first and submits whatever was captured; there is no
/// review step.
fn toggle_recording(
    app: &mut App,
    service: &SubmissionService,
    available_height: u16,
    terminal_width: u16,
) {
    if app.session.is_recording() {
        app.session.finish_recording();
        let clip = app.recorder.stop();
        app.clear_status();
        if let Some(clip) = clip {
            match app.begin_audio_submission() {
                Ok(submission_id) => {
                    service.submit_audio(
                        app.client.clone(),
                        AudioPayload {
                            wav_bytes: clip.wav_bytes,
                        },
                        submission_id,
                    );
                    app.auto_scroll = true;
                    app.update_scroll_position(available_height, terminal_width);
                }
                Err(e) => app.set_status(e.to_string()),
            }
        }
    } else {
        match app.session.start_recording() {
            Ok(()) => match app.recorder.start() {
                Ok(()) => app.set_status("Recording… press Ctrl+R again to stop and send"),
                Err(e) => {
                    // Permission or device failure: revert to idle, alert,
                    // never submit
                    app.session.finish_recording();
                    tracing::warn!(error = %e, "could not start recording");
                    app.set_status(format!("Microphone unavailable: {e}"));
                }
            },
            Err(SubmitError::Busy) => app.set_status(SubmitError::Busy.to_string()),
            Err(e) => app.set_status(e.to_string()),
        }
    }
}

fn scroll_up(app: &mut App, amount: u16) {
    // Manual scrolling away from the bottom disengages auto-scroll
    app.auto_scroll = false;
    app.scroll_offset = app.scroll_offset.saturating_sub(amount);
}

fn scroll_down(app: &mut App, amount: u16, available_height: u16, terminal_width: u16) {
    let max_scroll = app.calculate_max_scroll_offset(available_height, terminal_width);
    app.scroll_offset = app.scroll_offset.saturating_add(amount).min(max_scroll);
    // Reaching the bottom re-engages auto-scroll
    if app.scroll_offset >= max_scroll {
        app.auto_scroll = true;
    }
}
