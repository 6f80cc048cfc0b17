// src/domain/instrumentation.rs
use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Text,
    Image,
}

/// What a provider reports about one completed embed operation.
#[derive(Debug, Clone)]
pub struct EmbedEvent {
    pub backend: &'static str,
    pub kind: EmbedKind,
    pub dimensions: usize,
}

/// Shared facility embedders report their operations to.
///
/// Every resolved embedder carries exactly one tracker binding; the binding
/// is mutable so an already-constructed embedder can be re-pointed at a
/// caller-supplied tracker.
pub trait EmbeddingTracker: Send + Sync {
    fn record(&self, event: &EmbedEvent);
    fn as_any(&self) -> &dyn Any; // for downcasting
}

/// Default tracker: forwards events to the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingTracker;

impl EmbeddingTracker for TracingTracker {
    fn record(&self, event: &EmbedEvent) {
        debug!(
            backend = event.backend,
            kind = ?event.kind,
            dimensions = event.dimensions,
            "embedding generated"
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Interior-mutable tracker slot shared by all embedder implementations.
pub struct TrackerCell(RwLock<Arc<dyn EmbeddingTracker>>);

impl TrackerCell {
    pub fn new(tracker: Arc<dyn EmbeddingTracker>) -> Self {
        Self(RwLock::new(tracker))
    }

    pub fn get(&self) -> Arc<dyn EmbeddingTracker> {
        self.0
            .read()
            .expect("Failed to acquire read lock for tracker")
            .clone()
    }

    pub fn set(&self, tracker: Arc<dyn EmbeddingTracker>) {
        *self
            .0
            .write()
            .expect("Failed to acquire write lock for tracker") = tracker;
    }
}

impl Default for TrackerCell {
    fn default() -> Self {
        Self::new(Arc::new(TracingTracker))
    }
}

impl fmt::Debug for TrackerCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerCell")
            .field("tracker", &"Arc<dyn EmbeddingTracker>")
            .finish()
    }
}
