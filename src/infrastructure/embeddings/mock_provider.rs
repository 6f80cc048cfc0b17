use crate::domain::embedding::Embedder;
use crate::domain::error::DomainResult;
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Deterministic embedder for test mode and explicitly disabled embeddings.
///
/// Every call returns the same `0.5`-filled vector of the configured
/// dimensionality.
#[derive(Debug)]
pub struct MockEmbedding {
    embed_dim: usize,
    tracker: TrackerCell,
}

impl MockEmbedding {
    pub fn new(embed_dim: usize) -> Self {
        Self {
            embed_dim,
            tracker: TrackerCell::default(),
        }
    }

    pub fn with_tracker(embed_dim: usize, tracker: Arc<dyn EmbeddingTracker>) -> Self {
        Self {
            embed_dim,
            tracker: TrackerCell::new(tracker),
        }
    }

    fn vector(&self, kind: EmbedKind) -> Vec<f32> {
        let embedding = vec![0.5; self.embed_dim];
        self.tracker.get().record(&EmbedEvent {
            backend: "mock",
            kind,
            dimensions: embedding.len(),
        });
        embedding
    }
}

impl Embedder for MockEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        debug!("MockEmbedding::embed() for text length: {}", text.len());
        Ok(self.vector(EmbedKind::Text))
    }

    #[instrument]
    fn embed_image(&self, _path: &Path) -> DomainResult<Vec<f32>> {
        Ok(self.vector(EmbedKind::Image))
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.embed_dim)
    }

    fn backend(&self) -> &'static str {
        "mock"
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
