//! Generation collaborator seam.
//!
//! The core assembles a grounded prompt and hands it to an opaque
//! [`Generator`]. [`EchoGenerator`] is the shipped default: it returns the
//! prompt unchanged so callers can inspect exactly what a model would see.

use async_trait::async_trait;

use papergraph_shared::Result;

/// Produces free-text output from an assembled prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Pass-through generator: the "answer" is the prompt itself.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}
