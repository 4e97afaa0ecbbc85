//! Graph traversal algorithms.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::graph::{OntologyError, OntologyStore, Result};
use crate::ontology::RelationType;

/// Default depth for `find_related_concepts`.
pub const DEFAULT_SEARCH_DEPTH: usize = 2;

/// Default depth for `related_concepts`.
pub const DEFAULT_RELATED_DEPTH: usize = 1;

impl OntologyStore {
    /// Breadth-first search over relations, followed in both directions.
    ///
    /// Returns every concept within `max_depth` hops of `id`, in discovery
    /// order. The seed itself is never included.
    pub fn find_related_concepts(&self, id: &str, max_depth: usize) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut related = Vec::new();
        let mut queue = VecDeque::new();

        queue.push_back((id, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth > max_depth || !visited.insert(current) {
                continue;
            }

            if depth > 0 {
                related.push(current.to_string());
            }

            // Anything enqueued past here would be discarded on pop.
            if depth == max_depth {
                continue;
            }

            for rel in self.incident_relations(current) {
                let next = rel.other_endpoint(current);
                if !visited.contains(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        debug!("{} concepts within {} hops of {}", related.len(), max_depth, id);
        related
    }

    /// Transitive closure of the `prerequisites` property.
    ///
    /// Expansion is depth-first and left to right: each prerequisite is
    /// followed by its own chain. Duplicates keep their first position.
    /// Unknown concepts have an empty chain.
    pub fn prerequisite_chain(&self, id: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        // Frames are (concept, index of its next prerequisite); the stack is the current path.
        let mut on_path: HashSet<&str> = HashSet::from([id]);
        let mut stack: Vec<(&str, usize)> = vec![(id, 0)];

        while let Some(frame) = stack.last_mut() {
            let (current, next) = *frame;
            let prereqs = self
                .get_concept(current)
                .map(|c| c.properties.prerequisites.as_slice())
                .unwrap_or_default();

            let Some(prereq) = prereqs.get(next) else {
                stack.pop();
                on_path.remove(current);
                continue;
            };
            frame.1 += 1;

            if on_path.contains(prereq.as_str()) {
                let start = stack.iter().position(|&(p, _)| p == prereq).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|&(p, _)| p.to_string()).collect();
                cycle.push(prereq.clone());
                return Err(OntologyError::CyclicPrerequisite { cycle });
            }

            // Already expanded through another branch.
            if !seen.insert(prereq.as_str()) {
                continue;
            }

            chain.push(prereq.clone());
            on_path.insert(prereq.as_str());
            stack.push((prereq.as_str(), 0));
        }

        Ok(chain)
    }

    /// Broader relatedness: the concept's declared `related_concepts`, then
    /// neighbours over `related` relations in either direction, then (only
    /// when `max_depth > 1`) everything `find_related_concepts` reaches.
    ///
    /// Returns an empty list for unknown concepts.
    pub fn related_concepts(&self, id: &str, max_depth: usize) -> Vec<String> {
        let Some(concept) = self.get_concept(id) else {
            return Vec::new();
        };

        let mut related = concept.properties.related_concepts.clone();

        related.extend(
            self.incident_relations(id)
                .filter(|rel| rel.relation_type == RelationType::Related)
                .map(|rel| rel.other_endpoint(id).to_string()),
        );

        if max_depth > 1 {
            related.extend(self.find_related_concepts(id, max_depth));
        }

        let mut seen = HashSet::new();
        related.retain(|c| seen.insert(c.clone()));
        related
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{ConceptProperties, Relation};

    fn create_chain() -> OntologyStore {
        let mut store = OntologyStore::new();
        for id in ["A", "B", "C", "D"] {
            store.add_concept(id, ConceptProperties::new());
        }

        // A - B - C - D, mixed directions
        store.add_relation(Relation::new("A", "B", RelationType::Related));
        store.add_relation(Relation::new("C", "B", RelationType::PartOf));
        store.add_relation(Relation::new("C", "D", RelationType::Prerequisite));

        store
    }

    fn prereqs(store: &mut OntologyStore, id: &str, prerequisites: &[&str]) {
        store.add_concept(
            id,
            ConceptProperties::new().with_prerequisites(prerequisites.iter().copied()),
        );
    }

    #[test]
    fn test_bfs_depth_bound() {
        let store = create_chain();

        assert_eq!(store.find_related_concepts("A", 1), vec!["B"]);
        assert_eq!(store.find_related_concepts("A", 2), vec!["B", "C"]);
        assert_eq!(store.find_related_concepts("A", 3), vec!["B", "C", "D"]);
        assert_eq!(store.find_related_concepts("A", 10), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_bfs_excludes_seed() {
        let store = create_chain();

        for depth in 0..5 {
            assert!(!store.find_related_concepts("B", depth).contains(&"B".to_string()));
        }
        assert!(store.find_related_concepts("B", 0).is_empty());
    }

    #[test]
    fn test_bfs_cycle_safety() {
        let mut store = OntologyStore::new();
        store.add_relation(Relation::new("A", "B", RelationType::Related));
        store.add_relation(Relation::new("B", "C", RelationType::Related));
        store.add_relation(Relation::new("C", "A", RelationType::Related));
        // parallel edge and self loop
        store.add_relation(Relation::new("B", "A", RelationType::IsA));
        store.add_relation(Relation::new("A", "A", RelationType::Related));

        assert_eq!(store.find_related_concepts("A", 5), vec!["B", "C"]);
    }

    #[test]
    fn test_bfs_discovery_order() {
        let mut store = OntologyStore::new();
        // Star around hub, then a second ring.
        store.add_relation(Relation::new("hub", "x", RelationType::Related));
        store.add_relation(Relation::new("y", "hub", RelationType::Related));
        store.add_relation(Relation::new("x", "x2", RelationType::Related));
        store.add_relation(Relation::new("hub", "z", RelationType::Related));
        store.add_relation(Relation::new("y2", "y", RelationType::Related));

        assert_eq!(
            store.find_related_concepts("hub", DEFAULT_SEARCH_DEPTH),
            vec!["x", "y", "z", "x2", "y2"]
        );
    }

    #[test]
    fn test_bfs_unknown_concept() {
        let store = create_chain();
        assert!(store.find_related_concepts("nonexistent", 3).is_empty());
    }

    #[test]
    fn test_prerequisite_chain() {
        let mut store = OntologyStore::new();
        prereqs(&mut store, "C3", &["C2"]);
        prereqs(&mut store, "C2", &["C1"]);
        prereqs(&mut store, "C1", &[]);

        assert_eq!(store.prerequisite_chain("C3").unwrap(), vec!["C2", "C1"]);
        assert_eq!(store.prerequisite_chain("C2").unwrap(), vec!["C1"]);
        assert!(store.prerequisite_chain("C1").unwrap().is_empty());
        assert!(store.prerequisite_chain("nonexistent").unwrap().is_empty());
    }

    #[test]
    fn test_prerequisite_chain_depth_first_order() {
        let mut store = OntologyStore::new();
        prereqs(&mut store, "recursion", &["functions", "conditionals"]);
        prereqs(&mut store, "functions", &["variables"]);
        prereqs(&mut store, "conditionals", &["variables", "booleans"]);
        // "variables" and "booleans" are not registered concepts.

        assert_eq!(
            store.prerequisite_chain("recursion").unwrap(),
            vec!["functions", "variables", "conditionals", "booleans"]
        );
    }

    #[test]
    fn test_prerequisite_diamond_is_not_a_cycle() {
        let mut store = OntologyStore::new();
        prereqs(&mut store, "top", &["left", "right"]);
        prereqs(&mut store, "left", &["base"]);
        prereqs(&mut store, "right", &["base"]);
        prereqs(&mut store, "base", &[]);

        assert_eq!(
            store.prerequisite_chain("top").unwrap(),
            vec!["left", "base", "right"]
        );
    }

    #[test]
    fn test_prerequisite_cycle_detected() {
        let mut store = OntologyStore::new();
        prereqs(&mut store, "A", &["B"]);
        prereqs(&mut store, "B", &["C"]);
        prereqs(&mut store, "C", &["A"]);

        match store.prerequisite_chain("A") {
            Err(OntologyError::CyclicPrerequisite { cycle }) => {
                assert_eq!(cycle, vec!["A", "B", "C", "A"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }

        prereqs(&mut store, "self", &["self"]);
        assert!(matches!(
            store.prerequisite_chain("self"),
            Err(OntologyError::CyclicPrerequisite { .. })
        ));
    }

    #[test]
    fn test_prerequisite_cycle_below_target() {
        let mut store = OntologyStore::new();
        prereqs(&mut store, "start", &["B"]);
        prereqs(&mut store, "B", &["C"]);
        prereqs(&mut store, "C", &["B"]);

        let err = store.prerequisite_chain("start").unwrap_err();
        assert_eq!(err.to_string(), "Cyclic prerequisite chain: B -> C -> B");
    }

    #[test]
    fn test_prerequisite_chain_deep() {
        let mut store = OntologyStore::new();
        let depth = 5000;
        for i in 0..depth {
            let next = format!("c{}", i + 1);
            prereqs(&mut store, &format!("c{}", i), &[next.as_str()]);
        }

        let chain = store.prerequisite_chain("c0").unwrap();
        assert_eq!(chain.len(), depth);
        assert_eq!(chain[0], "c1");
        assert_eq!(chain[depth - 1], format!("c{}", depth));

        // Close the loop at the bottom.
        let last = format!("c{}", depth);
        prereqs(&mut store, &last, &["c0"]);
        match store.prerequisite_chain("c0") {
            Err(OntologyError::CyclicPrerequisite { cycle }) => {
                assert_eq!(cycle.len(), depth + 2);
                assert_eq!(cycle.first().map(String::as_str), Some("c0"));
                assert_eq!(cycle.last().map(String::as_str), Some("c0"));
            }
            other => panic!("expected cycle, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_related_concepts() {
        let mut store = OntologyStore::new();
        store.add_concept(
            "loops",
            ConceptProperties::new().with_related(["iteration", "conditionals"]),
        );
        store.add_relation(Relation::new("loops", "recursion", RelationType::Related));
        store.add_relation(Relation::new("arrays", "loops", RelationType::Related));
        store.add_relation(Relation::new("conditionals", "loops", RelationType::Related));
        store.add_relation(Relation::new("variables", "loops", RelationType::Prerequisite));
        store.add_relation(Relation::new("recursion", "stack", RelationType::PartOf));

        assert_eq!(
            store.related_concepts("loops", DEFAULT_RELATED_DEPTH),
            vec!["iteration", "conditionals", "recursion", "arrays"]
        );

        // Depth > 1 adds the untyped breadth-first neighbourhood.
        assert_eq!(
            store.related_concepts("loops", 2),
            vec!["iteration", "conditionals", "recursion", "arrays", "variables", "stack"]
        );
    }

    #[test]
    fn test_related_concepts_unknown() {
        let mut store = OntologyStore::new();
        store.add_relation(Relation::new("ghost", "B", RelationType::Related));

        assert!(store.related_concepts("nonexistent", 1).is_empty());
        // Relations alone do not make a concept known.
        assert!(store.related_concepts("ghost", 3).is_empty());
    }
}
