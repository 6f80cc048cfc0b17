use crate::domain::embedding::Embedder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::{EmbedEvent, EmbedKind, EmbeddingTracker, TrackerCell};
use crate::infrastructure::embeddings::model::{AzureEmbeddingRequest, EmbeddingResponse};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Implementation using an Azure OpenAI embedding deployment.
///
/// The deployment name doubles as the model name, matching the
/// `azure-openai:<endpoint>:<model-name>:<api-version>` descriptor fields.
pub struct AzureOpenAiEmbedding {
    endpoint: String,
    model: String,
    api_version: String,
    api_key: String,
    tracker: TrackerCell,
}

impl fmt::Debug for AzureOpenAiEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiEmbedding")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AzureOpenAiEmbedding {
    pub fn new(endpoint: String, model: String, api_version: String, api_key: String) -> Self {
        Self {
            endpoint,
            model,
            api_version,
            api_key,
            tracker: TrackerCell::default(),
        }
    }

    fn request_url(&self) -> String {
        let endpoint = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("https://{}", self.endpoint)
        };
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            endpoint.trim_end_matches('/'),
            self.model,
            self.api_version
        )
    }
}

impl Embedder for AzureOpenAiEmbedding {
    #[instrument(skip(text))]
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        debug!("Azure OpenAI embedding request for text length: {}", text.len());

        let client = reqwest::blocking::Client::new();

        let request = AzureEmbeddingRequest {
            input: text.to_string(),
        };

        let response = client
            .post(self.request_url())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                DomainError::Embedding(format!("Azure OpenAI API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().map_err(|e| {
                DomainError::Embedding(format!("Failed to read error response: {}", e))
            })?;

            return Err(DomainError::Embedding(format!(
                "Azure OpenAI API returned error: {}",
                error_text
            )));
        }

        let response_data: EmbeddingResponse = response.json().map_err(|e| {
            DomainError::Embedding(format!("Failed to parse Azure OpenAI response: {}", e))
        })?;

        let embedding = response_data
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                DomainError::Embedding("Azure OpenAI API returned no embeddings".to_string())
            })?;

        self.tracker.get().record(&EmbedEvent {
            backend: self.backend(),
            kind: EmbedKind::Text,
            dimensions: embedding.len(),
        });

        Ok(embedding)
    }

    fn backend(&self) -> &'static str {
        "azure-openai"
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
