//! Embedding providers.
//!
//! Supports OpenAI-compatible HTTP endpoints (hosted or local
//! LM-Studio-style servers) and a deterministic hashing provider for
//! offline operation and tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;

/// Trait for embedding providers.
///
/// A provider converts text into a dense vector of fixed dimension. The
/// dimension is a property of the provider instance and never changes over
/// its lifetime.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the embedding dimension produced by this provider.
    fn dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        // Default implementation: process sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// Embedding provider backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// Works against the hosted OpenAI API as well as local servers that speak
/// the same wire format (LM Studio, llama.cpp, Ollama's OpenAI shim).
pub struct HttpProvider {
    /// API base URL.
    base_url: String,

    /// API key, if the endpoint requires one.
    api_key: Option<String>,

    /// Whether a missing API key is an error.
    require_api_key: bool,

    /// Model identifier sent with each request.
    model: String,

    /// Expected embedding dimension.
    dimension: usize,

    /// HTTP client.
    client: reqwest::Client,
}

impl HttpProvider {
    /// Create a provider for a local OpenAI-compatible server.
    ///
    /// Defaults to the LM Studio endpoint on localhost; no API key is
    /// required.
    pub fn local(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            api_key: None,
            require_api_key: false,
            model: model.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider for the hosted OpenAI API.
    ///
    /// The API key is read from `OPENAI_API_KEY`; requests fail with
    /// [`EmbeddingError::ProviderNotConfigured`] if it is unset.
    pub fn openai(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            require_api_key: true,
            model: model.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Issue one embeddings request for `input` (a string or string array).
    async fn request(&self, input: serde_json::Value) -> Result<Vec<Embedding>> {
        if self.require_api_key && self.api_key.is_none() {
            return Err(EmbeddingError::ProviderNotConfigured);
        }

        let body = serde_json::json!({
            "input": input,
            "model": self.model,
        });

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: EmbeddingsResponse = response.json().await?;

        // Responses are not guaranteed to arrive in input order.
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: item.embedding.len(),
                });
            }
            embeddings.push(item.embedding);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!("Generating embedding with model: {}", self.model);

        let embeddings = self.request(serde_json::json!(text)).await?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let embeddings = self.request(serde_json::json!(texts)).await?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        info!("Generated {} batch embeddings", embeddings.len());
        Ok(embeddings)
    }
}

/// OpenAI-compatible API response format.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Deterministic feature-hashing embedding provider.
///
/// Each lowercased alphanumeric token is hashed into one of `dimension`
/// buckets and the resulting count vector is normalized to unit length.
/// Texts sharing vocabulary therefore score high cosine similarity. Useful
/// as an offline fallback when no model endpoint is available, and for
/// tests that need reproducible vectors.
pub struct HashProvider {
    dimension: usize,
}

impl HashProvider {
    /// Create a hashing provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

impl Default for HashProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let bucket = self.bucket(&token.to_lowercase());
            vector[bucket] += 1.0;
        }

        normalize(&mut vector);
        Ok(vector)
    }
}
