use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::Embedder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use crate::infrastructure::embeddings::registry::BackendRequest;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

const DEFAULT_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// Implementation running a local ONNX text model via fastembed.
///
/// The model is fetched into the shared cache folder on first use and loaded
/// from disk afterwards. Loading happens in the constructor; embed calls are
/// pure inference.
pub struct LocalEmbedding {
    model_name: String,
    model: Mutex<TextEmbedding>,
    tracker: TrackerCell,
}

impl fmt::Debug for LocalEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEmbedding")
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl LocalEmbedding {
    pub fn new(
        model: EmbeddingModel,
        model_name: String,
        cache_folder: &Path,
    ) -> DomainResult<Self> {
        debug!("Loading local embedding model {} from {:?}", model_name, cache_folder);
        let text_embedding = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_folder.to_path_buf())
                .with_show_download_progress(true),
        )
        .map_err(|e| {
            DomainError::Embedding(format!(
                "failed to load local embedding model {}: {}",
                model_name, e
            ))
        })?;

        Ok(Self {
            model_name,
            model: Mutex::new(text_embedding),
            tracker: TrackerCell::default(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Embedder for LocalEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| DomainError::Other("local embedding model lock poisoned".to_string()))?;

        let mut embeddings = guard
            .embed(vec![text], None)
            .map_err(|e| DomainError::Embedding(format!("local embedding failed: {}", e)))?;

        let embedding = embeddings.pop().ok_or_else(|| {
            DomainError::Embedding("local model returned no embeddings".to_string())
        })?;

        self.tracker.get().record(&EmbedEvent {
            backend: self.backend(),
            kind: EmbedKind::Text,
            dimensions: embedding.len(),
        });

        Ok(embedding)
    }

    fn backend(&self) -> &'static str {
        "local"
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

fn text_model_from_name(name: &str) -> Option<EmbeddingModel> {
    match name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => Some(EmbeddingModel::BGELargeENV15),
        "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
            Some(EmbeddingModel::AllMiniLML6V2)
        }
        "nomic-ai/nomic-embed-text-v1.5" | "nomic-embed-text-v1.5" => {
            Some(EmbeddingModel::NomicEmbedTextV15)
        }
        "mixedbread-ai/mxbai-embed-large-v1" | "mxbai-embed-large-v1" => {
            Some(EmbeddingModel::MxbaiEmbedLargeV1)
        }
        _ => None,
    }
}

/// Registry constructor for the local text backend.
pub(crate) fn build(request: BackendRequest) -> ApplicationResult<Arc<dyn Embedder>> {
    let BackendRequest::Local { model, cache_folder } = request else {
        return Err(ApplicationError::Other(
            "local constructor invoked with mismatched request".to_string(),
        ));
    };

    let model_name = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let embedding_model = text_model_from_name(&model_name).ok_or_else(|| {
        ApplicationError::InvalidSpecifier(format!(
            "unsupported local model \"{}\"; supported models: \
             BAAI/bge-small-en-v1.5, BAAI/bge-base-en-v1.5, BAAI/bge-large-en-v1.5, \
             sentence-transformers/all-MiniLM-L6-v2, nomic-ai/nomic-embed-text-v1.5, \
             mixedbread-ai/mxbai-embed-large-v1",
            model_name
        ))
    })?;

    let embedder = LocalEmbedding::new(embedding_model, model_name, &cache_folder)?;
    Ok(Arc::new(embedder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_model_names_when_map_then_resolved() {
        assert!(text_model_from_name("BAAI/bge-small-en-v1.5").is_some());
        assert!(text_model_from_name("all-MiniLM-L6-v2").is_some());
        assert!(text_model_from_name("no-such-model").is_none());
    }

    #[test]
    fn given_unknown_model_when_build_then_invalid_specifier() {
        let dir = tempfile::tempdir().unwrap();
        let err = build(BackendRequest::Local {
            model: Some("no-such-model".to_string()),
            cache_folder: dir.path().to_path_buf(),
        })
        .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidSpecifier(_)));
        assert!(err.to_string().contains("no-such-model"));
    }

    #[test]
    #[ignore = "downloads the default model on first run"]
    fn given_default_model_when_embed_then_returns_vector() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = build(BackendRequest::Local {
            model: None,
            cache_folder: dir.path().to_path_buf(),
        })
        .unwrap();

        let embedding = embedder.embed("example text").unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
