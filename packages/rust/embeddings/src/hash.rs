//! Deterministic feature-hashing embedder.
//!
//! Not a learned model: each lowercase alphanumeric token is hashed into a
//! signed bucket and the result is L2-normalized. Texts sharing vocabulary
//! land near each other, which is all the tests and offline runs need.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use papergraph_shared::Result;

use crate::Embedder;

/// In-process embedder: a pure function of the text and the dimension.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_le_bytes(
                digest[..8].try_into().expect("sha256 digest has 32 bytes"),
            ) as usize
                % self.dimension;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
