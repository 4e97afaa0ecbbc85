//! Retrieval-augmented question answering.

use learning_ontology::{OntologyError, SharedOntology};
use tracing::{debug, info, warn};

use crate::engine::{ChatClient, SearchEngine};
use crate::extractor::ConceptExtractor;
use crate::prompt::{build_background, build_context, build_prompt};
use crate::types::{ConceptContext, QueryOptions, RagAnswer, SourceDocument};

/// Error types for the RAG pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("Search engine error: {0}")]
    Search(String),

    #[error("Chat model error: {0}")]
    Chat(String),

    #[error("Ontology error: {0}")]
    Ontology(#[from] OntologyError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RagError>;

/// Configuration for the RAG pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    /// Documents retrieved per query.
    pub retrieve_count: usize,
    /// Depth passed to `related_concepts` when adding ontology background.
    pub related_depth: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            retrieve_count: 3,
            related_depth: learning_ontology::DEFAULT_RELATED_DEPTH,
        }
    }
}

impl RagConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retrieve_count: env_usize("RAG_RETRIEVE_COUNT").unwrap_or(defaults.retrieve_count),
            related_depth: env_usize("RAG_RELATED_DEPTH").unwrap_or(defaults.related_depth),
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Answers questions with documents retrieved from `S`, generated by `C`,
/// optionally grounded in a learning ontology.
pub struct RagSystem<S, C> {
    search_engine: S,
    llm: C,
    config: RagConfig,
    ontology: Option<SharedOntology>,
    extractor: ConceptExtractor,
}

impl<S: SearchEngine, C: ChatClient> RagSystem<S, C> {
    pub fn new(search_engine: S, llm: C, config: RagConfig) -> Self {
        Self {
            search_engine,
            llm,
            config,
            ontology: None,
            extractor: ConceptExtractor::default(),
        }
    }

    /// Add ontology background for concepts `extractor` finds in questions.
    pub fn with_ontology(mut self, ontology: SharedOntology, extractor: ConceptExtractor) -> Self {
        self.ontology = Some(ontology);
        self.extractor = extractor;
        self
    }

    /// Register documents with the search engine.
    pub async fn initialize(&self, documents: &[SourceDocument]) -> Result<usize> {
        info!("Initializing RAG system");

        for doc in documents {
            let metadata = serde_json::to_value(doc)?;
            self.search_engine.add_document(&doc.content, metadata).await?;
        }

        info!("Registered {} documents", documents.len());
        Ok(documents.len())
    }

    /// Answer a question.
    ///
    /// Falls back to asking the model directly when no document is relevant.
    pub async fn query(&self, question: &str, options: &QueryOptions) -> Result<RagAnswer> {
        let k = options.retrieve_count.unwrap_or(self.config.retrieve_count);
        let hits = self.search_engine.search(question, k).await?;

        if hits.is_empty() {
            debug!("No relevant documents, asking the model directly");
            let reply = self.llm.chat(question).await?;
            return Ok(RagAnswer {
                response: reply.response,
                metadata: reply.metadata,
                sources: Vec::new(),
                concepts: Vec::new(),
            });
        }

        let concepts = self.background_concepts(question);
        let prompt = build_prompt(
            question,
            &build_context(&hits),
            &build_background(&concepts),
        );

        debug!("Prompting with {} documents and {} concepts", hits.len(), concepts.len());
        let reply = self.llm.chat(&prompt).await?;

        Ok(RagAnswer {
            response: reply.response,
            metadata: reply.metadata,
            sources: hits,
            concepts,
        })
    }

    /// Ontology context for the concepts mentioned in `question`.
    ///
    /// Concepts unknown to the ontology are skipped. A cyclic prerequisite
    /// chain drops that concept's prerequisites rather than the whole answer.
    pub fn background_concepts(&self, question: &str) -> Vec<ConceptContext> {
        let Some(ontology) = &self.ontology else {
            return Vec::new();
        };

        let ids = self.extractor.extract_concepts(question);
        let store = ontology.read();

        ids.into_iter()
            .filter_map(|id| {
                let label = store.get_concept(&id)?.display_name().to_string();
                let prerequisites = store.prerequisite_chain(&id).unwrap_or_else(|e| {
                    warn!("Skipping prerequisites of {}: {}", id, e);
                    Vec::new()
                });
                let related = store.related_concepts(&id, self.config.related_depth);

                Some(ConceptContext {
                    id,
                    label,
                    related,
                    prerequisites,
                })
            })
            .collect()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn search_engine(&self) -> &S {
        &self.search_engine
    }

    pub fn llm(&self) -> &C {
        &self.llm
    }
}
