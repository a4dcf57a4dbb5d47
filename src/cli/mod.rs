//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands.

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "tarjemli")]
#[command(about = "A terminal chat client for a Darija translation API")]
#[command(
    long_about = "Tarjemli is a full-screen terminal chat client that sends text, images, and \
voice notes to a remote Darija translation API and shows the replies as a \
conversation.\n\n\
Environment Variables:\n\
  TARJEMLI_BASE_URL Override the translator host (optional)\n\
  RUST_LOG          Enable diagnostic logging to stderr (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Ctrl+R            Start/stop a voice recording (stopping sends it)\n\
  Up/Down/Mouse     Scroll through the conversation\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /attach <path>    Stage an image for translation\n\
  /send             Submit the staged image\n\
  /log [filename]   Enable transcript logging, or toggle pause/resume\n\
  /help             Show the key summary"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Override the translator base URL for this run
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key; omit to print the current configuration
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr, and only when asked for; the alternate
    // screen owns stdout
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(value) = value else {
                config.print_all();
                return Ok(());
            };
            match key.as_str() {
                "base-url" => config.base_url = Some(value.clone()),
                "translate-path" => config.translate_path = Some(value.clone()),
                "image-path" => config.image_path = Some(value.clone()),
                "audio-path" => config.audio_path = Some(value.clone()),
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "base-url" => config.base_url = None,
                "translate-path" => config.translate_path = None,
                "image-path" => config.image_path = None,
                "audio-path" => config.audio_path = None,
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Chat => run_chat(args.log, args.base_url).await,
    }
}
