use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::{Embedder, LegacyEmbedding};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use crate::infrastructure::embeddings::registry::BackendRequest;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Adapter reconciling the legacy v1 [`LegacyEmbedding`] interface with the
/// current [`Embedder`] contract.
///
/// The v1 interface may legitimately produce no vector; the current contract
/// always yields one, so an empty result becomes an error here.
pub struct CompatEmbedding {
    inner: Arc<dyn LegacyEmbedding>,
    tracker: TrackerCell,
}

impl fmt::Debug for CompatEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatEmbedding")
            .field("inner", &"Arc<dyn LegacyEmbedding>")
            .finish()
    }
}

impl CompatEmbedding {
    pub fn new(inner: Arc<dyn LegacyEmbedding>) -> Self {
        Self {
            inner,
            tracker: TrackerCell::default(),
        }
    }
}

impl Embedder for CompatEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let embedding = self.inner.embed(text)?.ok_or_else(|| {
            DomainError::Embedding("legacy embedder returned no vector".to_string())
        })?;

        self.tracker.get().record(&EmbedEvent {
            backend: self.backend(),
            kind: EmbedKind::Text,
            dimensions: embedding.len(),
        });

        Ok(embedding)
    }

    fn backend(&self) -> &'static str {
        "compat"
    }

    fn tracker(&self) -> Arc<dyn EmbeddingTracker> {
        self.tracker.get()
    }

    fn bind_tracker(&self, tracker: Arc<dyn EmbeddingTracker>) {
        self.tracker.set(tracker);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry constructor for the legacy-compat backend.
pub(crate) fn build(request: BackendRequest) -> ApplicationResult<Arc<dyn Embedder>> {
    let BackendRequest::Compat { inner } = request else {
        return Err(ApplicationError::Other(
            "compat constructor invoked with mismatched request".to_string(),
        ));
    };

    Ok(Arc::new(CompatEmbedding::new(inner)))
}
