//! # Embeddings
//!
//! This crate provides embedding generation and similarity math for the
//! loupe semantic search engine.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors via a provider
//! - **Providers**: OpenAI-compatible HTTP endpoints (including local
//!   LM-Studio-style servers) and a deterministic hashing fallback
//! - **Similarity Math**: Cosine similarity and mean pooling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Embeddings System                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► similarity ranking         │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  HttpProvider / HashProvider                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, HashProvider, HttpProvider};
pub use similarity::{cosine_similarity, mean};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
