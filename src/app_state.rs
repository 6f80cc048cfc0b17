// src/app_state.rs
use crate::config::{load_settings, Settings};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbeddingTracker, TracingTracker};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, instrument};

/// Holds the process-wide default services.
pub struct Context {
    pub tracker: Arc<dyn EmbeddingTracker>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("tracker", &"Arc<dyn EmbeddingTracker>")
            .finish()
    }
}

impl Context {
    pub fn new(tracker: Arc<dyn EmbeddingTracker>) -> Self {
        Self { tracker }
    }
}

/// Global application state: default tracker plus configuration settings.
///
/// Resolution never reads this directly; `ResolveContext::from_global()`
/// snapshots it once at the edge.
#[derive(Debug)]
pub struct AppState {
    pub context: Context,
    pub settings: Settings,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(TracingTracker))
    }
}

impl AppState {
    pub fn new(tracker: Arc<dyn EmbeddingTracker>) -> Self {
        Self::new_with_config_file(tracker, None)
    }

    pub fn new_with_config_file(
        tracker: Arc<dyn EmbeddingTracker>,
        config_file: Option<&Path>,
    ) -> Self {
        let settings = load_settings(config_file).unwrap_or_else(|e| {
            debug!("Failed to load settings: {}. Using defaults.", e);
            Settings::default()
        });

        Self {
            context: Context::new(tracker),
            settings,
        }
    }
}

pub static APP_STATE: OnceLock<RwLock<AppState>> = OnceLock::new();

//
// --- Public API for global access ---
impl AppState {
    /// Returns the global AppState lock (initializing if necessary).
    pub fn global() -> &'static RwLock<AppState> {
        APP_STATE.get_or_init(|| RwLock::new(AppState::default()))
    }

    /// Acquire a read guard for the global AppState.
    #[instrument(level = "debug")]
    pub fn read_global() -> std::sync::RwLockReadGuard<'static, AppState> {
        Self::global()
            .read()
            .expect("Failed to acquire read lock for AppState")
    }

    /// Acquire a write guard and replace the global AppState.
    #[instrument(level = "debug")]
    pub fn update_global(new_state: AppState) -> DomainResult<()> {
        let mut guard = Self::global()
            .write()
            .map_err(|e| DomainError::Other(format!("Write lock error: {}", e)))?;
        *guard = new_state;
        Ok(())
    }

    /// Reload settings from the configuration files and environment variables.
    pub fn reload_settings() -> DomainResult<()> {
        Self::reload_settings_with_config(None)
    }

    /// Reload settings with a specific config file
    pub fn reload_settings_with_config(config_file: Option<&Path>) -> DomainResult<()> {
        let mut guard = Self::global()
            .write()
            .map_err(|e| DomainError::Other(format!("Write lock error: {}", e)))?;

        guard.settings = load_settings(config_file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{init_test_env, EnvGuard};
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn given_no_environment_when_new_then_defaults() {
        let _ = init_test_env();
        let _guard = EnvGuard::new();
        env::remove_var("EMBR_DEFAULT_BACKEND");
        env::remove_var("EMBR_CACHE_DIR");

        let state = AppState::default();
        assert_eq!(state.settings.default_backend, "default");
        assert!(state.settings.cache_dir.contains("embr"));
    }

    #[test]
    #[serial]
    fn given_env_vars_when_new_then_overrides() {
        let _ = init_test_env();
        let _guard = EnvGuard::new();
        env::set_var("EMBR_DEFAULT_BACKEND", "local:all-MiniLM-L6-v2");

        let state = AppState::default();
        assert_eq!(state.settings.default_backend, "local:all-MiniLM-L6-v2");
    }

    #[test]
    #[serial]
    fn given_global_state_when_update_then_state_changes() {
        let _guard = EnvGuard::new();
        let mut state = AppState::default();
        state.settings.default_backend = "clip".to_string();
        AppState::update_global(state).unwrap();

        let global = AppState::read_global();
        assert_eq!(global.settings.default_backend, "clip");
    }

    #[test]
    #[serial]
    fn given_modified_env_when_reload_then_settings_change() {
        let _guard = EnvGuard::new();

        let mut initial = AppState::default();
        initial.settings.default_backend = "before-reload".to_string();
        AppState::update_global(initial).unwrap();

        env::set_var("EMBR_DEFAULT_BACKEND", "local");
        AppState::reload_settings().unwrap();

        let reloaded = AppState::read_global();
        assert_eq!(reloaded.settings.default_backend, "local");
    }
}
