use std::path::Path;

use crate::core::app::App;
use crate::core::constants::MAX_IMAGE_BYTES;
use crate::core::session::AttachmentError;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// `/send`: the chat loop owns the submission service, so it performs
    /// the actual submission.
    SubmitPendingImage,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let (command, remainder) = match trimmed.split_once(char::is_whitespace) {
        Some((command, remainder)) => (command, remainder.trim()),
        None => (trimmed, ""),
    };

    match command {
        "/log" => {
            if remainder.is_empty() {
                // Just "/log" - toggle logging if file is set
                match app.logging.toggle_logging() {
                    Ok(message) => app.set_status(message),
                    Err(e) => app.set_status(format!("Error: {e}")),
                }
            } else {
                // "/log <filename>" - set log file and enable logging
                match app.logging.set_log_file(remainder.to_string()) {
                    Ok(message) => app.set_status(message),
                    Err(e) => app.set_status(format!("Error setting log file: {e}")),
                }
            }
            CommandResult::Continue
        }
        "/attach" => {
            if remainder.is_empty() {
                app.set_status("Usage: /attach <path> - Stage an image, then /send to translate it");
            } else {
                attach_image(app, remainder);
            }
            CommandResult::Continue
        }
        "/send" => CommandResult::SubmitPendingImage,
        "/help" => {
            app.set_status(
                "Enter send • /attach <path> stage image • /send submit image • \
                 Ctrl+R record/stop • /log [file] transcript • Ctrl+C quit",
            );
            CommandResult::Continue
        }
        // Not a command, process as regular message
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

/// Read a file from disk and stage it as the pending image. All rejections
/// land on the status line; the pending attachment is untouched by them.
fn attach_image(app: &mut App, path_arg: &str) {
    let path = Path::new(path_arg);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_arg.to_string());

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            app.set_status(format!("Cannot read {path_arg}: {e}"));
            return;
        }
    };
    // Size check before reading, so an oversized file is never pulled into
    // memory just to be rejected
    if metadata.len() > MAX_IMAGE_BYTES {
        app.set_status(AttachmentError::TooLarge(file_name).to_string());
        return;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            app.set_status(format!("Cannot read {path_arg}: {e}"));
            return;
        }
    };

    match app.session.select_image(&file_name, bytes) {
        Ok(()) => {
            let pending = app.session.pending_attachment().expect("just selected");
            app.set_status(format!(
                "Attached {} ({} KB). /send to translate it.",
                pending.file_name,
                pending.bytes.len() / 1024
            ));
        }
        Err(e) => app.set_status(e.to_string()),
    }
}
