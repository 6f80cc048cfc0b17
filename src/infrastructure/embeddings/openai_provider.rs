use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::embedding::Embedder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use crate::infrastructure::embeddings::model::{EmbeddingRequest, EmbeddingResponse};
use crate::infrastructure::embeddings::registry::BackendRequest;
use std::any::Any;
use std::env;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Implementation using OpenAI's embedding API
#[derive(Debug)]
pub struct OpenAiEmbedding {
    url: String,
    model: String,
    tracker: TrackerCell,
}

impl Default for OpenAiEmbedding {
    fn default() -> Self {
        Self::new("https://api.openai.com".to_string(), DEFAULT_MODEL.to_string())
    }
}

impl OpenAiEmbedding {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url,
            model,
            tracker: TrackerCell::default(),
        }
    }

    /// Checks that a usable API key is configured before any embed call.
    pub fn validate_api_key(&self) -> DomainResult<()> {
        let api_key = env::var(OPENAI_API_KEY).map_err(|_| {
            DomainError::Embedding(format!("{} environment variable not set", OPENAI_API_KEY))
        })?;
        if api_key.trim().is_empty() {
            return Err(DomainError::Embedding(format!(
                "{} environment variable is empty",
                OPENAI_API_KEY
            )));
        }
        Ok(())
    }
}

impl Embedder for OpenAiEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        debug!("OpenAI embedding request for text length: {}", text.len());

        let api_key = env::var(OPENAI_API_KEY).map_err(|_| {
            DomainError::Embedding(format!("{} environment variable not set", OPENAI_API_KEY))
        })?;

        let client = reqwest::blocking::Client::new();

        let request = EmbeddingRequest {
            input: text.to_string(),
            model: self.model.clone(),
        };

        let response = client
            .post(format!("{}/v1/embeddings", self.url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .map_err(|e| DomainError::Embedding(format!("OpenAI API request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().map_err(|e| {
                DomainError::Embedding(format!("Failed to read error response: {}", e))
            })?;

            return Err(DomainError::Embedding(format!(
                "OpenAI API returned error: {}",
                error_text
            )));
        }

        let response_data: EmbeddingResponse = response.json().map_err(|e| {
            DomainError::Embedding(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let embedding = response_data
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| DomainError::Embedding("OpenAI API returned no embeddings".to_string()))?;

        self.tracker.get().record(&EmbedEvent {
            backend: self.backend(),
            kind: EmbedKind::Text,
            dimensions: embedding.len(),
        });

        Ok(embedding)
    }

    fn backend(&self) -> &'static str {
        "openai"
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

/// Registry constructor for the hosted default backend.
///
/// Validates credentials at construction time so resolution fails fast with
/// remediation guidance instead of on the first embed call.
pub(crate) fn build(request: BackendRequest) -> ApplicationResult<Arc<dyn Embedder>> {
    let BackendRequest::OpenAi { api_url } = request else {
        return Err(ApplicationError::Other(
            "openai constructor invoked with mismatched request".to_string(),
        ));
    };

    let embedder = OpenAiEmbedding::new(api_url, DEFAULT_MODEL.to_string());
    embedder.validate_api_key().map_err(|e| ApplicationError::Credential {
        reason: format!("Could not load the OpenAI embedding backend: {}", e),
        remediation: format!(
            "If you intended to use OpenAI, check your {} environment variable.\n\
             Consider using the \"local\" backend instead (no API key required).",
            OPENAI_API_KEY
        ),
    })?;

    Ok(Arc::new(embedder))
}
