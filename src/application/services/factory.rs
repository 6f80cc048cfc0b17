// src/application/services/factory.rs
use crate::application::services::resolver::{EmbedderResolver, ResolveContext};
use crate::domain::instrumentation::EmbeddingTracker;
use std::sync::Arc;

/// Creates a resolver wired to the global settings and default tracker.
pub fn create_resolver() -> EmbedderResolver {
    EmbedderResolver::new(ResolveContext::from_global())
}

/// Creates a resolver with a caller-supplied tracker; settings still come
/// from the global state.
pub fn create_resolver_with_tracker(tracker: Arc<dyn EmbeddingTracker>) -> EmbedderResolver {
    EmbedderResolver::new(ResolveContext::from_global().with_tracker(tracker))
}
