//! Learning Ontology - concepts and typed relations for a learning session.
//!
//! This crate provides:
//! - Concepts with typed well-known properties plus caller metadata
//! - Directed, typed, weighted relations keyed by `(from, type, to)`
//! - Atomic bulk loading from JSON or in-memory data
//! - Breadth-first relatedness search and prerequisite-chain resolution

pub mod ontology;
pub mod graph;
pub mod traversal;

pub use ontology::{Concept, ConceptProperties, OntologyData, Relation, RelationKey, RelationSpec, RelationType};
pub use graph::{LoadSummary, OntologyError, OntologyStore, Result, SharedOntology};
pub use traversal::{DEFAULT_RELATED_DEPTH, DEFAULT_SEARCH_DEPTH};
