use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::core::message::Turn;

/// Opt-in transcript export: an append-only file mirroring what the
/// transcript shows. Write-only — nothing is ever read back, and the
/// session is not restorable from it.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: log_file,
            is_active: false,
        };

        // A log file provided on the command line enables logging immediately
        if logging.file_path.is_some() {
            logging.is_active = true;
            logging.write_session_header()?;
        }

        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.write_session_header()?;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Append one turn in the on-screen format: `You:` prefix for user
    /// turns, the quoted transcription (when present) above bot text.
    pub fn log_turn(&self, turn: &Turn) -> Result<(), Box<dyn std::error::Error>> {
        if turn.is_user() {
            self.log_message(&format!("You: {}", turn.text))
        } else {
            let mut content = String::new();
            if let Some(heard) = &turn.transcription {
                content.push_str(&format!("\u{201c}{heard}\u{201d}\n"));
            }
            content.push_str(&turn.text);
            self.log_message(&content)
        }
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active || self.file_path.is_none() {
            return Ok(());
        }

        let file_path = self.file_path.as_ref().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        // Write each line of content, preserving the exact formatting
        for line in content.lines() {
            writeln!(file, "{line}")?;
        }

        // Add an empty line after each message for spacing (matching screen display)
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }

    fn write_session_header(&self) -> Result<(), Box<dyn std::error::Error>> {
        let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        self.log_message(&format!("## Session started {started}"))
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        // Try to create/open the file to ensure we have write permissions
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        // Test write access
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_path(dir: &TempDir) -> String {
        dir.path().join("chat.log").to_string_lossy().into_owned()
    }

    #[test]
    fn turns_are_written_in_transcript_format() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut logging = LoggingState::new(None).unwrap();
        logging.set_log_file(path.clone()).unwrap();

        logging.log_turn(&Turn::user("Hello")).unwrap();
        logging
            .log_turn(&Turn::bot_with_transcription("Zwina", "nice"))
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Session started"));
        assert!(written.contains("You: Hello"));
        assert!(written.contains("\u{201c}nice\u{201d}\nZwina"));
    }

    #[test]
    fn toggling_without_a_file_is_an_error() {
        let mut logging = LoggingState::new(None).unwrap();
        assert!(logging.toggle_logging().is_err());
        assert_eq!(logging.get_status_string(), "disabled");
    }

    #[test]
    fn paused_logging_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let mut logging = LoggingState::new(Some(path.clone())).unwrap();

        logging.toggle_logging().unwrap(); // pause
        logging.log_turn(&Turn::user("while paused")).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("while paused"));
        assert!(logging.get_status_string().starts_with("paused"));

        logging.toggle_logging().unwrap(); // resume
        logging.log_turn(&Turn::user("after resume")).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("after resume"));
    }
}
