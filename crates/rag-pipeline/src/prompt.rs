//! Prompt assembly.

use crate::types::{ConceptContext, SearchHit};

/// Number the retrieved documents and join them into one context block.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("[Document {}] {}", i + 1, hit.document.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per concept. Empty when there is nothing to say.
pub fn build_background(concepts: &[ConceptContext]) -> String {
    concepts
        .iter()
        .map(|c| {
            let mut line = format!("- {} ({})", c.label, c.id);
            if !c.prerequisites.is_empty() {
                line.push_str(&format!("; prerequisites: {}", c.prerequisites.join(", ")));
            }
            if !c.related.is_empty() {
                line.push_str(&format!("; related: {}", c.related.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(question: &str, context: &str, background: &str) -> String {
    let mut prompt = format!(
        "Answer the question using the reference documents below.\n\n\
         Reference documents:\n{context}\n\n"
    );

    if !background.is_empty() {
        prompt.push_str(&format!("Background concepts:\n{background}\n\n"));
    }

    prompt.push_str(&format!("Question: {question}\n\nAnswer:"));
    prompt
}
