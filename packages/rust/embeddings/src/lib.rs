//! Embedding collaborator interface and implementations.
//!
//! The pipeline never talks to an embedding model directly; it goes through
//! the [`Embedder`] trait. Two implementations ship: [`HttpEmbedder`] for a
//! sentence-embedding service over HTTP, and [`HashEmbedder`], a
//! deterministic in-process fallback used for tests and offline runs.
//! Within one pipeline run, an embedder must return identical vectors for
//! identical input, all of one fixed dimensionality.

mod hash;
mod http;

use async_trait::async_trait;
use papergraph_shared::Result;

pub use hash::HashEmbedder;
pub use http::HttpEmbedder;

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text. Deterministic for identical input within a run.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The fixed dimensionality of every vector this embedder produces.
    fn dimension(&self) -> usize;
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 on length mismatch or when either vector has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
