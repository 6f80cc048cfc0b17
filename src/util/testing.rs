// src/util/testing.rs

use std::env;
use std::sync::OnceLock;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::app_state::AppState;

/// Marker for one-time global test initialization.
static TEST_ENV: OnceLock<()> = OnceLock::new();

/// Initializes the global test environment exactly once.
/// - Sets up logging
/// - Resets the global AppState to defaults
pub fn init_test_env() {
    TEST_ENV.get_or_init(|| {
        setup_test_logging(); // set up logger only once
        AppState::update_global(AppState::default()).expect("Failed to update global AppState");
        info!("Test environment initialized");
    });
}

/// Logging setup only runs once; subsequent calls do nothing if `tracing` is already set.
fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "debug");
    }

    // Silence spammy modules
    let noisy_modules = ["reqwest", "mio", "want", "hyper_util", "ort", "tokenizers"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Saves the embedding-related environment on creation and restores it on
/// drop, so env-mutating tests cannot leak state into each other.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    is_testing: Option<String>,
    openai_api_key: Option<String>,
    azure_openai_api_key: Option<String>,
    default_backend: Option<String>,
    cache_dir: Option<String>,
    openai_api_url: Option<String>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            is_testing: env::var("IS_TESTING").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            azure_openai_api_key: env::var("AZURE_OPENAI_API_KEY").ok(),
            default_backend: env::var("EMBR_DEFAULT_BACKEND").ok(),
            cache_dir: env::var("EMBR_CACHE_DIR").ok(),
            openai_api_url: env::var("EMBR_OPENAI_API_URL").ok(),
        }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        restore("IS_TESTING", &self.is_testing);
        restore("OPENAI_API_KEY", &self.openai_api_key);
        restore("AZURE_OPENAI_API_KEY", &self.azure_openai_api_key);
        restore("EMBR_DEFAULT_BACKEND", &self.default_backend);
        restore("EMBR_CACHE_DIR", &self.cache_dir);
        restore("EMBR_OPENAI_API_URL", &self.openai_api_url);
    }
}

fn restore(name: &str, value: &Option<String>) {
    match value {
        Some(val) => env::set_var(name, val),
        None => env::remove_var(name),
    }
}
