//! Ontology types for the learning graph.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied properties of a concept.
///
/// The well-known fields are typed so traversal code can read them directly;
/// anything else the caller provides lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptProperties {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Difficulty or category tag. Callers use strings or numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<serde_json::Value>,
    /// Concepts that must be understood first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    /// Concepts declared as related by the author.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_concepts: Vec<String>,
    /// Caller-specific metadata. `id` and `addedAt` are owned by the store
    /// and stripped on insert.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConceptProperties {
    /// Create empty properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set level.
    pub fn with_level(mut self, level: impl Into<serde_json::Value>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Set prerequisites.
    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    /// Set related concepts.
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_concepts = related.into_iter().map(Into::into).collect();
        self
    }

    /// Level rendered for display: strings as-is, anything else as JSON.
    pub fn level_text(&self) -> Option<String> {
        self.level.as_ref().map(|level| match level {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Attach an extension value.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A concept in the ontology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Unique identifier.
    pub id: String,
    /// Caller-supplied properties.
    #[serde(flatten)]
    pub properties: ConceptProperties,
    /// When the store last wrote this concept.
    pub added_at: DateTime<Utc>,
}

impl Concept {
    /// Label if present, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.properties.label.as_deref().unwrap_or(&self.id)
    }
}

/// Types of relations between concepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    /// General relatedness, also consulted by `related_concepts`.
    Related,
    /// "X is required before Y".
    Prerequisite,
    /// Hierarchical: "X is a Y".
    IsA,
    /// Compositional: "X is part of Y".
    PartOf,
    /// Any other caller-defined type.
    Custom(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Related => "related",
            Self::Prerequisite => "prerequisite",
            Self::IsA => "is_a",
            Self::PartOf => "part_of",
            Self::Custom(name) => name.as_str(),
        }
    }
}

impl From<&str> for RelationType {
    fn from(value: &str) -> Self {
        match value {
            "related" => Self::Related,
            "prerequisite" => Self::Prerequisite,
            "is_a" => Self::IsA,
            "part_of" => Self::PartOf,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for RelationType {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Custom(_) => Self::Custom(value),
            known => known,
        }
    }
}

impl From<RelationType> for String {
    fn from(value: RelationType) -> Self {
        match value {
            RelationType::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key identifying a relation: `(from, type, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationKey {
    pub from: String,
    pub relation_type: RelationType,
    pub to: String,
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.from, self.relation_type, self.to)
    }
}

/// A directed, typed, weighted relation between two concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Source concept id.
    pub from: String,
    /// Target concept id.
    pub to: String,
    /// Type of relation.
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    /// Confidence/weight. Opaque to the store.
    pub strength: f64,
}

impl Relation {
    /// Create a relation with the default strength of 1.0.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<RelationType>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
            strength: 1.0,
        }
    }

    /// Set strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn key(&self) -> RelationKey {
        RelationKey {
            from: self.from.clone(),
            relation_type: self.relation_type.clone(),
            to: self.to.clone(),
        }
    }

    /// The endpoint opposite to `id`. `id` must be one of the endpoints.
    pub fn other_endpoint(&self, id: &str) -> &str {
        if self.from == id {
            self.to.as_str()
        } else {
            self.from.as_str()
        }
    }
}

/// A relation entry as it appears in bulk-load input.
///
/// Every field is optional on the wire so the loader can say which one is
/// missing instead of failing inside the JSON parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<RelationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl RelationSpec {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<RelationType>,
    ) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            relation_type: Some(relation_type.into()),
            strength: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Check the entry and turn it into a relation.
    pub fn into_relation(self) -> Result<Relation, String> {
        let from = self.from.ok_or("missing `from`")?;
        let to = self.to.ok_or("missing `to`")?;
        let relation_type = self.relation_type.ok_or("missing `type`")?;
        let strength = self.strength.unwrap_or(1.0);
        if !strength.is_finite() {
            return Err(format!("strength {strength} is not finite"));
        }
        Ok(Relation {
            from,
            to,
            relation_type,
            strength,
        })
    }
}

impl From<Relation> for RelationSpec {
    fn from(relation: Relation) -> Self {
        Self {
            from: Some(relation.from),
            to: Some(relation.to),
            relation_type: Some(relation.relation_type),
            strength: Some(relation.strength),
        }
    }
}

/// Bulk-load input: concepts (in order) and relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyData {
    #[serde(default, with = "ordered_concepts")]
    pub concepts: Vec<(String, ConceptProperties)>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

impl OntologyData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concept(mut self, id: impl Into<String>, properties: ConceptProperties) -> Self {
        self.concepts.push((id.into(), properties));
        self
    }

    pub fn with_relation(mut self, relation: impl Into<RelationSpec>) -> Self {
        self.relations.push(relation.into());
        self
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// `concepts` is a JSON object on the wire; keep its key order.
mod ordered_concepts {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::ConceptProperties;

    pub fn serialize<S>(
        concepts: &[(String, ConceptProperties)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(concepts.len()))?;
        for (id, properties) in concepts {
            map.serialize_entry(id, properties)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, ConceptProperties)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Vec<(String, ConceptProperties)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of concept id to concept properties")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut concepts = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, properties)) = access.next_entry::<String, ConceptProperties>()? {
                    concepts.push((id, properties));
                }
                Ok(concepts)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
