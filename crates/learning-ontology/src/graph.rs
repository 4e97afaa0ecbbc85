//! Ontology storage and mutation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::ontology::{Concept, ConceptProperties, OntologyData, Relation, RelationKey, RelationType};

/// Error types for ontology operations.
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("Concept not found: {0}")]
    NotFound(String),

    #[error("Invalid relation at index {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("Malformed ontology document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cyclic prerequisite chain: {}", .cycle.join(" -> "))]
    CyclicPrerequisite { cycle: Vec<String> },
}

pub type Result<T> = std::result::Result<T, OntologyError>;

/// An ontology shared with a concurrent host. The store itself has no locking.
pub type SharedOntology = Arc<RwLock<OntologyStore>>;

/// Counts reported after a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Concept entries applied from this batch.
    pub concepts_loaded: usize,
    /// Relation entries applied from this batch.
    pub relations_loaded: usize,
    /// Concepts in the store afterwards.
    pub concept_count: usize,
    /// Relations in the store afterwards.
    pub relation_count: usize,
}

/// In-memory learning ontology.
///
/// Concepts and relations keep their insertion order; overwriting an entry
/// keeps its original position.
#[derive(Debug, Default)]
pub struct OntologyStore {
    concepts: Vec<Concept>,
    /// Concept id -> position in `concepts`.
    concept_index: HashMap<String, usize>,
    relations: Vec<Relation>,
    /// Relation key -> position in `relations`.
    relation_index: HashMap<RelationKey, usize>,
    /// Concept id -> positions of relations touching it, either direction.
    adjacency: HashMap<String, Vec<usize>>,
}

impl OntologyStore {
    /// Create a new empty ontology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store for sharing across tasks.
    pub fn into_shared(self) -> SharedOntology {
        Arc::new(RwLock::new(self))
    }

    /// Bulk import concepts, then relations.
    ///
    /// The whole batch is checked before anything is written: one malformed
    /// relation rejects the batch and leaves the store untouched.
    pub fn load_ontology(&mut self, data: OntologyData) -> Result<LoadSummary> {
        let relations = data
            .relations
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.into_relation()
                    .map_err(|reason| OntologyError::InvalidInput { index, reason })
            })
            .collect::<Result<Vec<_>>>()?;

        let concepts_loaded = data.concepts.len();
        let relations_loaded = relations.len();

        for (id, properties) in data.concepts {
            self.add_concept(id, properties);
        }
        for relation in relations {
            self.add_relation(relation);
        }

        info!("Loaded {} concepts", self.concept_count());
        info!("Loaded {} relations", self.relation_count());

        Ok(LoadSummary {
            concepts_loaded,
            relations_loaded,
            concept_count: self.concept_count(),
            relation_count: self.relation_count(),
        })
    }

    /// Parse a JSON ontology document and load it.
    pub fn load_ontology_json(&mut self, json: &str) -> Result<LoadSummary> {
        let data = OntologyData::from_json(json)?;
        self.load_ontology(data)
    }

    /// Add or replace a concept. The timestamp is refreshed on replace.
    pub fn add_concept(&mut self, id: impl Into<String>, mut properties: ConceptProperties) -> &Concept {
        let id = id.into();
        // Caller keys must not shadow the concept's own fields.
        properties.extra.remove("id");
        properties.extra.remove("addedAt");

        let concept = Concept {
            id: id.clone(),
            properties,
            added_at: Utc::now(),
        };

        let pos = match self.concept_index.get(&id).copied() {
            Some(pos) => {
                debug!("Replacing concept {}", id);
                self.concepts[pos] = concept;
                pos
            }
            None => {
                let pos = self.concepts.len();
                self.concepts.push(concept);
                self.concept_index.insert(id, pos);
                pos
            }
        };

        &self.concepts[pos]
    }

    /// Add a relation, or overwrite the strength of an existing
    /// `(from, type, to)` triple. Endpoints need not exist.
    pub fn add_relation(&mut self, relation: Relation) -> &Relation {
        let key = relation.key();

        let pos = match self.relation_index.get(&key).copied() {
            Some(pos) => {
                self.relations[pos].strength = relation.strength;
                pos
            }
            None => {
                let pos = self.relations.len();
                self.adjacency
                    .entry(relation.from.clone())
                    .or_default()
                    .push(pos);
                if relation.to != relation.from {
                    self.adjacency
                        .entry(relation.to.clone())
                        .or_default()
                        .push(pos);
                }
                self.relations.push(relation);
                self.relation_index.insert(key, pos);
                pos
            }
        };

        &self.relations[pos]
    }

    /// Get concept by ID.
    pub fn get_concept(&self, id: &str) -> Option<&Concept> {
        self.concept_index.get(id).map(|&pos| &self.concepts[pos])
    }

    /// Get concept by ID, treating absence as an error.
    pub fn concept(&self, id: &str) -> Result<&Concept> {
        self.get_concept(id)
            .ok_or_else(|| OntologyError::NotFound(id.to_string()))
    }

    /// Get the relation stored for a `(from, type, to)` triple.
    pub fn get_relation(&self, from: &str, relation_type: &RelationType, to: &str) -> Option<&Relation> {
        let key = RelationKey {
            from: from.to_string(),
            relation_type: relation_type.clone(),
            to: to.to_string(),
        };
        self.relation_index.get(&key).map(|&pos| &self.relations[pos])
    }

    /// All concepts in insertion order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    /// All relations in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Relations with `id` as either endpoint, in insertion order.
    pub(crate) fn incident_relations<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.relations[pos])
    }

    /// Number of concepts in the ontology.
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of relations in the ontology.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty() && self.relations.is_empty()
    }
}

impl fmt::Display for OntologyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ontology ===")?;
        writeln!(f, "Concepts: {}", self.concept_count())?;
        writeln!(f, "Relations: {}", self.relation_count())?;

        writeln!(f, "\nConcepts:")?;
        for concept in &self.concepts {
            let props = &concept.properties;
            writeln!(
                f,
                "- {}: {} ({})",
                concept.id,
                props.label.as_deref().unwrap_or("-"),
                props.level_text().as_deref().unwrap_or("-"),
            )?;
        }

        writeln!(f, "\nRelations:")?;
        for rel in &self.relations {
            writeln!(f, "- {} --[{}]--> {}", rel.from, rel.relation_type, rel.to)?;
        }

        Ok(())
    }
}
