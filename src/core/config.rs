use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::constants::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TRANSLATE_PATH};
use crate::utils::url::join_endpoint;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Host the translator answers on. Overridden by the CLI flag and the
    /// environment; see [`Endpoints::resolve`].
    pub base_url: Option<String>,
    /// Endpoint path for text submissions.
    pub translate_path: Option<String>,
    /// Dedicated path for image submissions. Deployments disagree on whether
    /// images share the text endpoint, so this is routable; unset means the
    /// shared path.
    pub image_path: Option<String>,
    /// Dedicated path for audio submissions; unset means the shared path.
    pub audio_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "tarjemli")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match &self.translate_path {
            Some(path) => println!("  translate-path: {path}"),
            None => println!("  translate-path: (unset, using {DEFAULT_TRANSLATE_PATH})"),
        }
        match &self.image_path {
            Some(path) => println!("  image-path: {path}"),
            None => println!("  image-path: (unset, shared with translate-path)"),
        }
        match &self.audio_path {
            Some(path) => println!("  audio-path: {path}"),
            None => println!("  audio-path: (unset, shared with translate-path)"),
        }
    }
}

/// Fully resolved request routing for one run of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    translate_path: String,
    image_path: String,
    audio_path: String,
}

impl Endpoints {
    /// Resolve routing from the usual precedence chain: CLI flag, then the
    /// `TARJEMLI_BASE_URL` environment override, then the config file, then
    /// the fixed default host.
    pub fn resolve(config: &Config, flag_base_url: Option<String>) -> Self {
        Self::resolve_with_env(config, flag_base_url, std::env::var(BASE_URL_ENV).ok())
    }

    pub fn resolve_with_env(
        config: &Config,
        flag_base_url: Option<String>,
        env_base_url: Option<String>,
    ) -> Self {
        let base_url = flag_base_url
            .or(env_base_url)
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let translate_path = config
            .translate_path
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSLATE_PATH.to_string());
        let image_path = config
            .image_path
            .clone()
            .unwrap_or_else(|| translate_path.clone());
        let audio_path = config
            .audio_path
            .clone()
            .unwrap_or_else(|| translate_path.clone());
        Self {
            base_url,
            translate_path,
            image_path,
            audio_path,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn text_url(&self) -> String {
        join_endpoint(&self.base_url, &self.translate_path)
    }

    pub fn image_url(&self) -> String {
        join_endpoint(&self.base_url, &self.image_path)
    }

    pub fn audio_url(&self) -> String {
        join_endpoint(&self.base_url, &self.audio_path)
    }
}
