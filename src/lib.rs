//! Tarjemli is a terminal-first chat client for a remote Darija translation
//! API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns session state: the conversation transcript, the pending
//!   input and attachment, the busy gate that keeps at most one request in
//!   flight, and the submission pipeline that talks to the API.
//! - [`api`] defines the translate payloads and the HTTP client used to
//!   submit text, image, and audio turns.
//! - [`audio`] captures microphone input and finalizes it into a WAV blob.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions.

pub mod api;
pub mod audio;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
