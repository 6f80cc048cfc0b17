// src/config.rs
use crate::domain::error::DomainResult;
use crate::util::path::default_cache_root;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Backend descriptor used when resolution gets no specifier
    #[serde(default = "default_backend")]
    pub default_backend: String,

    /// Root of the on-disk model cache; models land in `<cache_dir>/models`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Base URL of the hosted OpenAI-compatible API
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,
}

fn default_backend() -> String {
    "default".to_string()
}

fn default_cache_dir() -> String {
    default_cache_root().to_string_lossy().to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
            cache_dir: default_cache_dir(),
            openai_api_url: default_openai_api_url(),
        }
    }
}

impl Settings {
    /// Cache root with `~` and environment references expanded.
    pub fn cache_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.cache_dir).as_ref())
    }
}

// Load settings from config files and environment variables
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    // Start with default settings
    let mut settings = Settings::default();

    // Explicit config file first, then the standard location
    let config_sources = [
        config_file.map(|p| p.to_path_buf()),
        dirs::home_dir().map(|p| p.join(".config/embr/config.toml")),
    ];

    // Load from config files if they exist
    for config_path in config_sources.iter().flatten() {
        if config_path.exists() {
            trace!("Loading config from: {:?}", config_path);

            if let Ok(config_text) = std::fs::read_to_string(config_path) {
                if let Ok(file_settings) = toml::from_str::<Settings>(&config_text) {
                    settings = file_settings;
                    break;
                }
            }
        }
    }

    // Override with environment variables
    if let Ok(default_backend) = std::env::var("EMBR_DEFAULT_BACKEND") {
        trace!("Using EMBR_DEFAULT_BACKEND from environment: {}", default_backend);
        settings.default_backend = default_backend;
    }

    if let Ok(cache_dir) = std::env::var("EMBR_CACHE_DIR") {
        trace!("Using EMBR_CACHE_DIR from environment: {}", cache_dir);
        settings.cache_dir = cache_dir;
    }

    if let Ok(openai_api_url) = std::env::var("EMBR_OPENAI_API_URL") {
        trace!("Using EMBR_OPENAI_API_URL from environment: {}", openai_api_url);
        settings.openai_api_url = openai_api_url;
    }

    trace!("Settings loaded: {:?}", settings);
    Ok(settings)
}

/// Annotated default configuration, for `--generate-config`.
pub fn generate_default_config() -> String {
    let defaults = Settings::default();
    format!(
        r#"# embr configuration file
# Place at ~/.config/embr/config.toml or pass with --config

# Backend used when no --backend is given.
# Accepted: "default", "local[:<model-name>]", "clip[:<model-name>]",
#           "azure-openai:<endpoint>:<model-name>:<api-version>"
default_backend = "{}"

# Root of the model cache; local models are stored in "<cache_dir>/models".
cache_dir = "{}"

# Base URL of the hosted OpenAI-compatible API.
openai_api_url = "{}"
"#,
        defaults.default_backend, defaults.cache_dir, defaults.openai_api_url
    )
}
