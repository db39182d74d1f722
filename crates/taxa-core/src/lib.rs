//! # Taxa Core
//!
//! Engine library for Taxa: classifies free-text articles against a mutable,
//! hierarchical category catalog by combining three independent evidence
//! signals — lexical keyword matching, embedding cosine similarity, and a
//! generative-model opinion — into ranked, threshold-gated suggestions. Also
//! maintains the category hierarchy model the scorers depend on: materialized
//! paths, depth levels, inherited keywords and thresholds, and cycle
//! prevention when re-parenting.
//!
//! This crate performs no I/O of its own. External collaborators — the
//! category/article store, the embedding service, the generative chat
//! service — are trait seams ([`store::CatalogStore`],
//! [`embedding::EmbeddingClient`], [`generative::GenerativeClient`]); the
//! engine borrows read-only snapshots and returns values for the caller to
//! persist. Concrete client implementations live in the `taxa` app crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Core data types |
//! | [`hierarchy`] | Category tree index: paths, levels, inheritance, cycle checks |
//! | [`keyword`] | Lexical keyword scorer |
//! | [`semantic`] | Embedding cosine-similarity scorer |
//! | [`generative`] | Generative-model scorer with tolerant JSON parsing |
//! | [`aggregate`] | Score merging, threshold gating, ranking |
//! | [`engine`] | Classification orchestrator: single, batch, auto-assign |
//! | [`discovery`] | New-category discovery over uncategorized pools |
//! | [`embedding`] | Embedding client trait and vector utilities |
//! | [`store`] | Catalog store trait and in-memory implementation |
//! | [`error`] | Typed engine errors |

pub mod aggregate;
pub mod discovery;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generative;
pub mod hierarchy;
pub mod keyword;
pub mod models;
pub mod semantic;
pub mod store;

pub use error::EngineError;
