//! RAG Pipeline - ontology-aware retrieval-augmented generation.
//!
//! This crate provides:
//! - Keyword-based concept extraction
//! - Traits for the external search engine and chat model
//! - Prompt assembly from retrieved documents and ontology background
//! - The `RagSystem` orchestrator

pub mod engine;
pub mod extractor;
pub mod prompt;
pub mod rag;
pub mod types;

pub use engine::{ChatClient, SearchEngine};
pub use extractor::ConceptExtractor;
pub use rag::{RagConfig, RagError, RagSystem, Result};
pub use types::{ChatResponse, ConceptContext, Document, QueryOptions, RagAnswer, SearchHit, SourceDocument};
