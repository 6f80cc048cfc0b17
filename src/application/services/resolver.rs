// src/application/services/resolver.rs
use crate::app_state::AppState;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::Embedder;
use crate::domain::instrumentation::EmbeddingTracker;
use crate::domain::specifier::{BackendDescriptor, EmbedSpec};
use crate::infrastructure::embeddings::azure_provider::{
    AzureOpenAiEmbedding, AZURE_OPENAI_API_KEY,
};
use crate::infrastructure::embeddings::mock_provider::MockEmbedding;
use crate::infrastructure::embeddings::registry::{
    BackendFamily, BackendRegistry, BackendRequest,
};
use crate::util::path::models_cache_dir;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Dimensionality of the mock embedder substituted under `IS_TESTING`.
const TESTING_EMBED_DIM: usize = 8;

/// Dimensionality of the mock embedder substituted when embeddings are
/// explicitly disabled.
const DISABLED_EMBED_DIM: usize = 1;

/// Everything resolution needs from the environment, snapshotted up front.
pub struct ResolveContext {
    /// Descriptor substituted when no specifier is given.
    pub default_backend: String,
    /// Tracker bound to every resolved embedder.
    pub tracker: Arc<dyn EmbeddingTracker>,
    /// Root under which the shared `models/` cache folder lives.
    pub cache_root: PathBuf,
    /// Base URL for the hosted OpenAI-compatible API.
    pub openai_api_url: String,
}

impl ResolveContext {
    /// Snapshot of the global application state. Ambient state is read here,
    /// once, and nowhere else in the resolution path.
    pub fn from_global() -> Self {
        let app_state = AppState::read_global();
        Self {
            default_backend: app_state.settings.default_backend.clone(),
            tracker: app_state.context.tracker.clone(),
            cache_root: app_state.settings.cache_root(),
            openai_api_url: app_state.settings.openai_api_url.clone(),
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn EmbeddingTracker>) -> Self {
        self.tracker = tracker;
        self
    }
}

/// Resolves an embed specifier into one concrete, tracker-bound embedder.
///
/// Each call performs a fresh resolution; nothing is cached or pooled.
pub struct EmbedderResolver {
    registry: BackendRegistry,
    context: ResolveContext,
}

impl EmbedderResolver {
    pub fn new(context: ResolveContext) -> Self {
        Self {
            registry: BackendRegistry::probe(),
            context,
        }
    }

    pub fn with_registry(registry: BackendRegistry, context: ResolveContext) -> Self {
        Self { registry, context }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Resolve `spec` into an embedder.
    ///
    /// `None` falls back to the context's default backend descriptor. Exactly
    /// one embedder is returned per call, or one error; the returned embedder
    /// always carries the context's tracker binding.
    #[instrument(skip_all)]
    pub fn resolve(&self, spec: Option<EmbedSpec>) -> ApplicationResult<Arc<dyn Embedder>> {
        let spec =
            spec.unwrap_or_else(|| EmbedSpec::Descriptor(self.context.default_backend.clone()));
        debug!("Resolving embed specifier: {:?}", spec);

        match spec {
            EmbedSpec::Disabled => {
                // Notice goes to stdout so it shows up next to piped vector
                // output, not in the log stream.
                println!("Embeddings have been explicitly disabled. Using mock embeddings.");
                Ok(self.bind(Arc::new(MockEmbedding::new(DISABLED_EMBED_DIM))))
            }
            EmbedSpec::Instance(embedder) => Ok(self.bind(embedder)),
            #[cfg(feature = "compat")]
            EmbedSpec::Legacy(inner) => {
                let embedder = self
                    .registry
                    .construct(BackendFamily::Compat, BackendRequest::Compat { inner })?;
                Ok(self.bind(embedder))
            }
            EmbedSpec::Descriptor(raw) => self.resolve_descriptor(&raw),
        }
    }

    fn resolve_descriptor(&self, raw: &str) -> ApplicationResult<Arc<dyn Embedder>> {
        let descriptor: BackendDescriptor = raw.parse()?;

        match descriptor {
            BackendDescriptor::Default => {
                if is_testing() {
                    debug!("IS_TESTING is set, substituting mock embedder");
                    return Ok(self.bind(Arc::new(MockEmbedding::new(TESTING_EMBED_DIM))));
                }
                let embedder = self.registry.construct(
                    BackendFamily::OpenAi,
                    BackendRequest::OpenAi {
                        api_url: self.context.openai_api_url.clone(),
                    },
                )?;
                Ok(self.bind(embedder))
            }
            BackendDescriptor::Clip { model } => {
                let embedder = self
                    .registry
                    .construct(BackendFamily::Clip, BackendRequest::Clip { model })?;
                Ok(self.bind(embedder))
            }
            BackendDescriptor::Local { model } => {
                let cache_folder = models_cache_dir(&self.context.cache_root)?;
                let embedder = self.registry.construct(
                    BackendFamily::Local,
                    BackendRequest::Local {
                        model,
                        cache_folder,
                    },
                )?;
                Ok(self.bind(embedder))
            }
            BackendDescriptor::AzureOpenAi {
                endpoint,
                model,
                api_version,
            } => {
                let api_key = env::var(AZURE_OPENAI_API_KEY)
                    .map_err(|_| ApplicationError::MissingEnvVar(AZURE_OPENAI_API_KEY))?;
                let embedder: Arc<dyn Embedder> = Arc::new(AzureOpenAiEmbedding::new(
                    endpoint,
                    model,
                    api_version,
                    api_key,
                ));
                Ok(self.bind(embedder))
            }
        }
    }

    fn bind(&self, embedder: Arc<dyn Embedder>) -> Arc<dyn Embedder> {
        embedder.bind_tracker(self.context.tracker.clone());
        embedder
    }
}

fn is_testing() -> bool {
    env::var("IS_TESTING")
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrumentation::{EmbedEvent, TracingTracker};
    use crate::util::testing::{init_test_env, EnvGuard};
    use serial_test::serial;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingTracker {
        events: AtomicUsize,
    }

    impl RecordingTracker {
        fn new() -> Self {
            Self {
                events: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingTracker for RecordingTracker {
        fn record(&self, _event: &EmbedEvent) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn test_context() -> ResolveContext {
        let _ = init_test_env();
        ResolveContext {
            default_backend: "default".to_string(),
            tracker: Arc::new(TracingTracker),
            cache_root: tempfile::tempdir().unwrap().keep(),
            openai_api_url: "https://api.openai.com".to_string(),
        }
    }

    #[test]
    #[serial]
    fn given_is_testing_when_resolve_default_then_mock_with_dim_8() {
        let _guard = EnvGuard::new();
        env::set_var("IS_TESTING", "1");

        let resolver = EmbedderResolver::new(test_context());
        let embedder = resolver.resolve(Some(EmbedSpec::from("default"))).unwrap();

        assert_eq!(embedder.dimensions(), Some(8));
        assert_eq!(embedder.embed("anything").unwrap().len(), 8);
    }

    #[test]
    #[serial]
    fn given_is_testing_when_resolve_absent_spec_then_mock_via_default_backend() {
        let _guard = EnvGuard::new();
        env::set_var("IS_TESTING", "1");

        let resolver = EmbedderResolver::new(test_context());
        let embedder = resolver.resolve(None).unwrap();

        assert_eq!(embedder.dimensions(), Some(8));
    }

    #[test]
    #[serial]
    fn given_disabled_spec_when_resolve_then_mock_with_dim_1() {
        let _guard = EnvGuard::new();

        let resolver = EmbedderResolver::new(test_context());
        let embedder = resolver.resolve(Some(EmbedSpec::Disabled)).unwrap();

        assert_eq!(embedder.dimensions(), Some(1));
        assert_eq!(embedder.embed("anything").unwrap(), vec![0.5]);
    }

    #[test]
    #[serial]
    fn given_unrecognized_descriptor_when_resolve_then_invalid_specifier() {
        let _guard = EnvGuard::new();

        let resolver = EmbedderResolver::new(test_context());
        let err = resolver
            .resolve(Some(EmbedSpec::from("huggingface:foo")))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidSpecifier(_)));
    }

    #[test]
    #[serial]
    fn given_azure_with_three_fields_when_resolve_then_invalid_specifier() {
        let _guard = EnvGuard::new();

        let resolver = EmbedderResolver::new(test_context());
        let err = resolver
            .resolve(Some(EmbedSpec::from("azure-openai:host:model")))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidSpecifier(_)));
    }

    #[test]
    #[serial]
    fn given_azure_without_api_key_when_resolve_then_missing_env_var() {
        let _guard = EnvGuard::new();
        env::remove_var(AZURE_OPENAI_API_KEY);

        let resolver = EmbedderResolver::new(test_context());
        let err = resolver
            .resolve(Some(EmbedSpec::from("azure-openai:host:model:2023-05-15")))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::MissingEnvVar(_)));
        assert!(err.to_string().contains(AZURE_OPENAI_API_KEY));
    }

    #[test]
    #[serial]
    fn given_azure_with_api_key_when_resolve_then_embedder_returned() {
        let _guard = EnvGuard::new();
        env::set_var(AZURE_OPENAI_API_KEY, "test_key");

        let resolver = EmbedderResolver::new(test_context());
        let embedder = resolver
            .resolve(Some(EmbedSpec::from("azure-openai:host:model:2023-05-15")))
            .unwrap();

        assert_eq!(embedder.backend(), "azure-openai");
    }

    #[test]
    #[serial]
    fn given_instance_spec_when_resolve_then_passed_through_with_rebound_tracker() {
        let _guard = EnvGuard::new();
        let tracker: Arc<dyn EmbeddingTracker> = Arc::new(RecordingTracker::new());
        let context = test_context().with_tracker(tracker.clone());

        let existing: Arc<dyn Embedder> = Arc::new(MockEmbedding::new(4));
        let resolver = EmbedderResolver::new(context);
        let resolved = resolver.resolve(Some(EmbedSpec::Instance(existing.clone()))).unwrap();

        assert!(Arc::ptr_eq(&resolved, &existing));
        assert!(Arc::ptr_eq(&resolved.tracker(), &tracker));

        // Resolving twice with the same handle yields an identical binding.
        let resolved_again = resolver.resolve(Some(EmbedSpec::Instance(resolved))).unwrap();
        assert!(Arc::ptr_eq(&resolved_again.tracker(), &tracker));
    }

    #[test]
    #[serial]
    fn given_resolved_embedder_when_embed_then_tracker_records() {
        let _guard = EnvGuard::new();
        let tracker = Arc::new(RecordingTracker::new());
        let context = test_context().with_tracker(tracker.clone());

        let resolver = EmbedderResolver::new(context);
        let embedder = resolver.resolve(Some(EmbedSpec::Disabled)).unwrap();
        embedder.embed("test text").unwrap();

        assert_eq!(tracker.events.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[serial]
    fn given_empty_registry_when_resolve_local_then_missing_dependency() {
        let _guard = EnvGuard::new();

        let resolver = EmbedderResolver::with_registry(BackendRegistry::empty(), test_context());
        let err = resolver.resolve(Some(EmbedSpec::from("local"))).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::MissingDependency(BackendFamily::Local)
        ));
        assert!(err.to_string().contains("--features local"));
    }

    #[test]
    #[serial]
    fn given_empty_registry_when_resolve_clip_then_missing_dependency_names_clip() {
        let _guard = EnvGuard::new();

        let resolver = EmbedderResolver::with_registry(BackendRegistry::empty(), test_context());
        let err = resolver
            .resolve(Some(EmbedSpec::from("clip:ViT-B/32")))
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::MissingDependency(BackendFamily::Clip)
        ));
        assert!(err.to_string().contains("--features clip"));
    }

    #[test]
    #[serial]
    fn given_empty_registry_when_resolve_default_then_missing_dependency_names_openai() {
        let _guard = EnvGuard::new();
        env::remove_var("IS_TESTING");

        let resolver = EmbedderResolver::with_registry(BackendRegistry::empty(), test_context());
        let err = resolver.resolve(Some(EmbedSpec::from("default"))).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::MissingDependency(BackendFamily::OpenAi)
        ));
    }

    #[cfg(feature = "compat")]
    #[test]
    #[serial]
    fn given_empty_registry_when_resolve_legacy_then_missing_dependency_names_compat() {
        use crate::domain::embedding::LegacyEmbedding;
        use crate::domain::error::DomainResult;

        struct V1Embedding;
        impl LegacyEmbedding for V1Embedding {
            fn embed(&self, _text: &str) -> DomainResult<Option<Vec<f32>>> {
                Ok(None)
            }
        }

        let _guard = EnvGuard::new();
        let resolver = EmbedderResolver::with_registry(BackendRegistry::empty(), test_context());
        let err = resolver
            .resolve(Some(EmbedSpec::Legacy(Arc::new(V1Embedding))))
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::MissingDependency(BackendFamily::Compat)
        ));
        assert!(err.to_string().contains("--features compat"));
    }

    #[cfg(feature = "compat")]
    #[test]
    #[serial]
    fn given_legacy_instance_when_resolve_then_wrapped() {
        use crate::domain::embedding::LegacyEmbedding;
        use crate::domain::error::DomainResult;

        struct V1Embedding;
        impl LegacyEmbedding for V1Embedding {
            fn embed(&self, _text: &str) -> DomainResult<Option<Vec<f32>>> {
                Ok(Some(vec![1.0, 2.0]))
            }
        }

        let _guard = EnvGuard::new();
        let resolver = EmbedderResolver::new(test_context());
        let embedder = resolver
            .resolve(Some(EmbedSpec::Legacy(Arc::new(V1Embedding))))
            .unwrap();

        assert_eq!(embedder.backend(), "compat");
        assert_eq!(embedder.embed("test text").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    #[serial]
    fn given_local_descriptor_when_resolve_then_cache_folder_created() {
        let _guard = EnvGuard::new();
        let context = test_context();
        let cache_root = context.cache_root.clone();

        // The unsupported model name stops construction before any download.
        let resolver = EmbedderResolver::new(context);
        let _ = resolver.resolve(Some(EmbedSpec::from("local:no-such-model")));

        assert!(cache_root.join("models").is_dir());
    }
}
