//! HTTP client for an external sentence-embedding service.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use papergraph_shared::{PaperGraphError, Result};

use crate::Embedder;

/// User-Agent string for embedding requests.
const USER_AGENT: &str = concat!("PaperGraph/", env!("CARGO_PKG_VERSION"));

/// Request timeout for one embedding call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request body sent to the embedding service.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body expected from the embedding service.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// [`Embedder`] backed by an HTTP embedding service.
///
/// The service contract: POST `{"model": ..., "input": ...}` to the
/// endpoint, receive `{"embedding": [...]}` with exactly `dimension`
/// components. A response of any other dimensionality is rejected — the
/// graph schema's vector index depends on it being fixed.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    dimension: usize,
    bearer_token: Option<String>,
}

impl HttpEmbedder {
    /// Build a client for the given endpoint.
    pub fn new(endpoint: Url, model: impl Into<String>, dimension: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PaperGraphError::Embedding(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: model.into(),
            dimension,
            bearer_token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaperGraphError::Embedding(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaperGraphError::Embedding(format!(
                "embedding service returned HTTP {status}"
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            PaperGraphError::Embedding(format!("invalid embedding response: {e}"))
        })?;

        if body.embedding.len() != self.dimension {
            return Err(PaperGraphError::Embedding(format!(
                "expected {}-dimensional embedding, got {}",
                self.dimension,
                body.embedding.len()
            )));
        }

        debug!(chars = text.len(), dim = self.dimension, "embedded text");
        Ok(body.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder_for(server: &MockServer, dimension: usize) -> HttpEmbedder {
        let endpoint = Url::parse(&format!("{}/embed", server.uri())).expect("valid url");
        HttpEmbedder::new(endpoint, "test-model", dimension).expect("build embedder")
    }

    #[tokio::test]
    async fn embeds_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embedding": [0.1, 0.2, 0.3] })),
            )
            .mount(&server)
            .await;

        let embedder = embedder_for(&server, 3);
        let v = embedder.embed("some text").await.expect("embed");
        assert_eq!(v, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embedding": [0.1, 0.2] })),
            )
            .mount(&server)
            .await;

        let embedder = embedder_for(&server, 3);
        let err = embedder.embed("some text").await.unwrap_err();
        assert!(err.to_string().contains("3-dimensional"));
    }

    #[tokio::test]
    async fn server_error_is_embedding_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let embedder = embedder_for(&server, 3);
        let err = embedder.embed("some text").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn malformed_body_is_embedding_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let embedder = embedder_for(&server, 3);
        let err = embedder.embed("some text").await.unwrap_err();
        assert!(err.to_string().contains("invalid embedding response"));
    }
}
