use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::Embedder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use crate::domain::specifier::DEFAULT_CLIP_MODEL;
use crate::infrastructure::embeddings::registry::BackendRequest;
use fastembed::{
    EmbeddingModel, ImageEmbedding, ImageEmbeddingModel, ImageInitOptions, InitOptions,
    TextEmbedding,
};
use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Local multi-modal implementation pairing the CLIP text and vision towers.
///
/// Text and images land in the same vector space, so the two sides must stay
/// on the same model variant.
pub struct ClipEmbedding {
    model_name: String,
    text_model: Mutex<TextEmbedding>,
    image_model: Mutex<ImageEmbedding>,
    tracker: TrackerCell,
}

impl fmt::Debug for ClipEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipEmbedding")
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl ClipEmbedding {
    pub fn new(model_name: &str) -> DomainResult<Self> {
        if !matches!(
            model_name,
            "ViT-B/32" | "clip-ViT-B-32" | "Qdrant/clip-ViT-B-32"
        ) {
            return Err(DomainError::NotSupported(format!(
                "unsupported CLIP model \"{}\"; supported: {}",
                model_name, DEFAULT_CLIP_MODEL
            )));
        }

        debug!("Loading CLIP model {}", model_name);
        let text_model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::ClipVitB32))
            .map_err(|e| {
                DomainError::Embedding(format!("failed to load CLIP text model: {}", e))
            })?;
        let image_model =
            ImageEmbedding::try_new(ImageInitOptions::new(ImageEmbeddingModel::ClipVitB32))
                .map_err(|e| {
                    DomainError::Embedding(format!("failed to load CLIP vision model: {}", e))
                })?;

        Ok(Self {
            model_name: model_name.to_string(),
            text_model: Mutex::new(text_model),
            image_model: Mutex::new(image_model),
            tracker: TrackerCell::default(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn record(&self, kind: EmbedKind, dimensions: usize) {
        self.tracker.get().record(&EmbedEvent {
            backend: self.backend(),
            kind,
            dimensions,
        });
    }
}

impl Embedder for ClipEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let mut guard = self
            .text_model
            .lock()
            .map_err(|_| DomainError::Other("CLIP text model lock poisoned".to_string()))?;

        let mut embeddings = guard
            .embed(vec![text], None)
            .map_err(|e| DomainError::Embedding(format!("CLIP text embedding failed: {}", e)))?;

        let embedding = embeddings.pop().ok_or_else(|| {
            DomainError::Embedding("CLIP text model returned no embeddings".to_string())
        })?;

        self.record(EmbedKind::Text, embedding.len());
        Ok(embedding)
    }

    #[instrument]
    fn embed_image(&self, path: &Path) -> DomainResult<Vec<f32>> {
        let image = path.to_str().ok_or_else(|| {
            DomainError::Embedding(format!("image path is not valid UTF-8: {:?}", path))
        })?;

        let mut guard = self
            .image_model
            .lock()
            .map_err(|_| DomainError::Other("CLIP vision model lock poisoned".to_string()))?;

        let mut embeddings = guard
            .embed(vec![image], None)
            .map_err(|e| DomainError::Embedding(format!("CLIP image embedding failed: {}", e)))?;

        let embedding = embeddings.pop().ok_or_else(|| {
            DomainError::Embedding("CLIP vision model returned no embeddings".to_string())
        })?;

        self.record(EmbedKind::Image, embedding.len());
        Ok(embedding)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(512)
    }

    fn backend(&self) -> &'static str {
        "clip"
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

/// Registry constructor for the local multi-modal backend.
pub(crate) fn build(request: BackendRequest) -> ApplicationResult<Arc<dyn Embedder>> {
    let BackendRequest::Clip { model } = request else {
        return Err(ApplicationError::Other(
            "clip constructor invoked with mismatched request".to_string(),
        ));
    };

    let model_name = model.unwrap_or_else(|| DEFAULT_CLIP_MODEL.to_string());
    let embedder = ClipEmbedding::new(&model_name)?;
    Ok(Arc::new(embedder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_clip_model_when_new_then_not_supported() {
        let err = ClipEmbedding::new("ViT-H/14").unwrap_err();
        assert!(matches!(err, DomainError::NotSupported(_)));
        assert!(err.to_string().contains("ViT-B/32"));
    }

    #[test]
    #[ignore = "downloads both CLIP towers on first run"]
    fn given_default_model_when_embed_then_512_dimensions() {
        let embedder = build(BackendRequest::Clip { model: None }).unwrap();
        let embedding = embedder.embed("a photo of a cat").unwrap();
        assert_eq!(embedding.len(), 512);
    }
}
