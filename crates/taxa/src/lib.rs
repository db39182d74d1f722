//! # Taxa
//!
//! Hybrid article classification against a hierarchical category catalog.
//!
//! This crate wires the pure engine from [`taxa_core`] to the outside world:
//! TOML configuration, and OpenAI-backed implementations of the embedding and
//! generative client traits. The engine itself — scorers, aggregation,
//! hierarchy model, discovery — lives in `taxa-core` and performs no I/O.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use taxa::config::load_config;
//! use taxa::generative_openai::create_generative_client;
//! use taxa_core::engine::ClassificationEngine;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = load_config(Path::new("taxa.toml"))?;
//! let engine = match create_generative_client(&config.generative)? {
//!     Some(client) => ClassificationEngine::with_generative(client),
//!     None => ClassificationEngine::new(),
//! };
//! # let article = taxa_core::models::Article::new("title", "text");
//! # let categories = Vec::new();
//! let suggestions = engine
//!     .classify(&article, &categories, &config.classification)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`embedding_openai`] | OpenAI embeddings client |
//! | [`generative_openai`] | OpenAI chat-completions client |

pub mod config;
pub mod embedding_openai;
pub mod generative_openai;
