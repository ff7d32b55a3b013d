//! Question answering over retrieved context.
//!
//! The completion backend is treated as opaque: a system instruction and
//! a user prompt go in, free text comes out. This module assembles the
//! prompt from file-level search hits and hands it to a
//! [`CompletionClient`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use crate::chunker::truncate_chars;
use crate::engine::SearchEngine;
use crate::error::{Result, RetrievalError};
use crate::search::FileHit;

/// System instruction sent with every question.
const SYSTEM_PROMPT: &str = "You are a helpful assistant with access to the indexed project \
files. Answer questions based on the provided context from the project files. If the context \
does not contain the answer, say so clearly.";

/// Trait for chat-completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce a completion for a system instruction and user prompt.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
///
/// Defaults to an LM-Studio-style endpoint on localhost; point it at any
/// server speaking the same wire format.
pub struct ChatHttpClient {
    /// API base URL.
    base_url: String,

    /// API key, if the endpoint requires one.
    api_key: Option<String>,

    /// Model identifier sent with each request.
    model: String,

    /// Sampling temperature.
    temperature: f32,

    /// Completion length cap.
    max_tokens: u32,

    /// HTTP client.
    client: reqwest::Client,
}

impl ChatHttpClient {
    /// Create a client against the local default endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            api_key: None,
            model: model.into(),
            temperature: 0.3,
            max_tokens: 2000,
            client: reqwest::Client::new(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl CompletionClient for ChatHttpClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Completion(format!(
                "API error: {error_text}"
            )));
        }

        let result: ChatResponse = response.json().await?;
        result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| RetrievalError::Completion("no choices in response".to_string()))
    }
}

/// OpenAI-compatible chat response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// An answered question with its supporting files.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The completion text.
    pub text: String,

    /// The file hits whose content was offered as context.
    pub sources: Vec<FileHit>,
}

/// Question answering over the search engine.
pub struct Assistant {
    engine: Arc<SearchEngine>,
    client: Arc<dyn CompletionClient>,
}

impl Assistant {
    /// Create an assistant over an engine and a completion backend.
    pub fn new(engine: Arc<SearchEngine>, client: Arc<dyn CompletionClient>) -> Self {
        Self { engine, client }
    }

    /// Answer a question using the `top_k` most relevant files as context.
    pub async fn ask(&self, question: &str, top_k: usize) -> Result<Answer> {
        let hits = self.engine.search_files(question, top_k).await?;
        let context =
            build_context(&hits, self.engine.config().context_chars_per_file).await;

        let user = format!(
            "Context from relevant project files:\n{context}\n\n---\n\nQuestion: {question}\n\n\
             Answer based on the context above. Be specific and reference the files when relevant."
        );

        let text = self.client.complete(SYSTEM_PROMPT, &user).await?;
        Ok(Answer {
            text,
            sources: hits,
        })
    }
}

/// Assemble the prompt context from retrieved files.
///
/// Each file contributes at most `chars_per_file` characters. A file that
/// cannot be read degrades to an inline error note instead of failing the
/// whole question.
async fn build_context(hits: &[FileHit], chars_per_file: usize) -> String {
    let mut context = String::new();

    for hit in hits {
        match fs::read_to_string(&hit.meta.absolute_path).await {
            Ok(content) => {
                let excerpt = truncate_chars(&content, chars_per_file);
                let marker = if excerpt.len() < content.len() {
                    "\n... (truncated)"
                } else {
                    ""
                };
                context.push_str(&format!(
                    "\n\n=== {} (relevance: {:.2}) ===\n{excerpt}{marker}\n",
                    hit.path, hit.score
                ));
            }
            Err(e) => {
                warn!("Failed to read {} for context: {e}", hit.path);
                context.push_str(&format!(
                    "\n\n=== {} ===\n[Error reading file: {e}]\n",
                    hit.path
                ));
            }
        }
    }

    context
}
