// src/domain/embedding.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::instrumentation::EmbeddingTracker;
use itertools::Itertools;
use ndarray::Array1;
use std::any::Any;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Core trait for embedding functionality.
///
/// Trait objects don't inherently carry their concrete type's TypeId, so the
/// trait provides `as_any()` for downcasting to a concrete embedder.
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embeds text into a fixed-length vector of floats.
    fn embed(&self, text: &str) -> DomainResult<Vec<f32>>;

    /// Embeds an image file; only multi-modal backends support this.
    fn embed_image(&self, path: &Path) -> DomainResult<Vec<f32>> {
        let _ = path;
        Err(DomainError::NotSupported(format!(
            "the {} backend cannot embed images",
            self.backend()
        )))
    }

    /// Vector dimensionality, when known without performing an embed call.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Backend family label, reported with every instrumentation event.
    fn backend(&self) -> &'static str;

    /// Current tracker binding.
    fn tracker(&self) -> Arc<dyn EmbeddingTracker>;

    /// Re-points this embedder at a different tracker.
    fn bind_tracker(&self, tracker: Arc<dyn EmbeddingTracker>);

    fn as_any(&self) -> &dyn Any; // for downcasting
}

/// The pre-1.0 embedding interface. Still implemented by downstream
/// integrations; wrapped into [`Embedder`] by the compat adapter.
#[cfg(feature = "compat")]
pub trait LegacyEmbedding: Send + Sync {
    /// Embeds text; `None` means the implementation produced no vector.
    fn embed(&self, text: &str) -> DomainResult<Option<Vec<f32>>>;
}

/// Calculate cosine similarity between two vectors
#[instrument(skip_all)]
pub fn cosine_similarity(vec1: &Array1<f32>, vec2: &Array1<f32>) -> f32 {
    let dot_product = vec1.dot(vec2);
    let magnitude_vec1 = vec1.dot(vec1).sqrt();
    let magnitude_vec2 = vec2.dot(vec2).sqrt();

    if magnitude_vec1 == 0.0 || magnitude_vec2 == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_vec1 * magnitude_vec2)
}

/// Save embedding to file as one comma-separated line.
#[instrument(skip_all)]
pub fn save_embedding(embedding: &[f32], file_path: &Path) -> DomainResult<()> {
    let mut file = File::create(file_path)?;
    let line = embedding.iter().map(|x| x.to_string()).join(",");
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Load embedding from file. Only the first line is read.
#[instrument(skip_all)]
pub fn load_embedding(file_path: &Path) -> DomainResult<Vec<f32>> {
    let file = File::open(file_path)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    line.trim()
        .split(',')
        .map(|x| {
            x.parse::<f32>()
                .map_err(|e| DomainError::DeserializationError(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_cosine_similarity() {
        let vec1 = array![1.0, 0.0];
        let vec2 = array![0.0, 1.0];

        // Orthogonal vectors should have similarity 0
        let similarity = cosine_similarity(&vec1, &vec2);
        assert!((similarity - 0.0).abs() < EPSILON);

        // Parallel vectors should have similarity 1
        let vec3 = array![1.0, 1.0];
        let vec4 = array![1.0, 1.0];
        let similarity = cosine_similarity(&vec3, &vec4);
        assert!((similarity - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        let vec1 = array![0.0, 0.0];
        let vec2 = array![1.0, 1.0];

        assert_eq!(cosine_similarity(&vec1, &vec2), 0.0);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.txt");
        let original = vec![1.0f32, -2.5, 3.25];

        save_embedding(&original, &path).unwrap();
        let loaded = load_embedding(&path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_embedding_reads_first_line_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.txt");
        std::fs::write(&path, "1.0,2.0\n3.0,4.0\n").unwrap();

        let loaded = load_embedding(&path).unwrap();

        assert_eq!(loaded, vec![1.0, 2.0]);
    }

    #[test]
    fn test_load_embedding_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.txt");
        std::fs::write(&path, "1.0,abc,3.0").unwrap();

        assert!(load_embedding(&path).is_err());
    }
}
