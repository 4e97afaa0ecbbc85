//! Keyword-based concept extraction.

use tracing::debug;

/// Built-in vocabulary: concept id and the keywords that signal it.
const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    ("programming", &["プログラミング", "プログラム", "コーディング", "coding"]),
    ("variables", &["変数", "variable", "var", "let", "const"]),
    ("functions", &["関数", "function", "メソッド", "method"]),
    ("loops", &["ループ", "for", "while", "繰り返し", "iteration"]),
    ("conditionals", &["条件分岐", "if", "else", "条件", "conditional"]),
    ("data-structures", &["データ構造", "data structure", "配列", "array"]),
    ("algorithms", &["アルゴリズム", "algorithm", "計算手法"]),
    ("recursion", &["再帰", "recursion", "再帰的"]),
    ("object-oriented", &["オブジェクト指向", "OOP", "クラス", "インスタンス"]),
    ("inheritance", &["継承", "inheritance", "親クラス", "子クラス"]),
    ("ramen", &["ラーメン", "らーめん", "麺料理"]),
    ("broth", &["スープ", "出汁", "だし", "豚骨", "醤油"]),
    ("noodles", &["麺", "ストレート麺", "太麺"]),
    ("toppings", &["具", "チャーシュー", "ネギ", "味玉", "海苔"]),
    ("basketball", &["バスケ", "バスケットボール"]),
    ("shooting", &["シュート", "ジャンプシュート", "レイアップ"]),
    ("dribbling", &["ドリブル", "ボールつき", "ボールハンドリング"]),
    ("defense", &["ディフェンス", "ブロック", "スティール"]),
];

/// Maps free text to concept ids by case-insensitive substring matching.
#[derive(Debug, Clone)]
pub struct ConceptExtractor {
    /// Concept id -> keywords, in registration order.
    vocabulary: Vec<(String, Vec<String>)>,
}

impl ConceptExtractor {
    /// Create an extractor with no vocabulary.
    pub fn new() -> Self {
        Self {
            vocabulary: Vec::new(),
        }
    }

    /// Concepts mentioned in `text`, in vocabulary order.
    pub fn extract_concepts(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();

        self.vocabulary
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| text.contains(&keyword.to_lowercase()))
            })
            .map(|(concept, _)| concept.clone())
            .collect()
    }

    /// Add keywords to a concept, registering it if it is new.
    pub fn add_concept_keywords<I, S>(&mut self, concept: &str, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords.into_iter().map(Into::into);

        match self.vocabulary.iter_mut().find(|(id, _)| id == concept) {
            Some((_, existing)) => existing.extend(keywords),
            None => self
                .vocabulary
                .push((concept.to_string(), keywords.collect())),
        }
    }

    /// Extract concepts and log what was found.
    pub fn analyze_text(&self, text: &str) -> Vec<String> {
        let preview: String = text.chars().take(100).collect();
        let concepts = self.extract_concepts(text);

        debug!("Analyzing text: {}...", preview);
        debug!("Extracted concepts: {:?}", concepts);

        concepts
    }

    /// Registered concept ids.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(|(id, _)| id.as_str())
    }

    /// Keywords registered for a concept.
    pub fn keywords(&self, concept: &str) -> Option<&[String]> {
        self.vocabulary
            .iter()
            .find(|(id, _)| id == concept)
            .map(|(_, keywords)| keywords.as_slice())
    }
}

impl Default for ConceptExtractor {
    /// Extractor seeded with the built-in vocabulary.
    fn default() -> Self {
        let mut extractor = Self::new();
        for (concept, keywords) in DEFAULT_VOCABULARY {
            extractor.add_concept_keywords(concept, keywords.iter().copied());
        }
        extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_default_vocabulary() {
        let extractor = ConceptExtractor::default();

        let concepts = extractor.extract_concepts("How does RECURSION compare to a while statement?");
        assert_eq!(concepts, vec!["loops", "recursion"]);

        let concepts = extractor.extract_concepts("豚骨スープのラーメン");
        assert_eq!(concepts, vec!["ramen", "broth"]);
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let extractor = ConceptExtractor::default();
        assert_eq!(extractor.extract_concepts("what is oop"), vec!["object-oriented"]);
    }

    #[test]
    fn test_no_match() {
        let extractor = ConceptExtractor::default();
        assert!(extractor.extract_concepts("").is_empty());
        assert!(extractor.extract_concepts("zzz").is_empty());
        assert!(ConceptExtractor::new().extract_concepts("recursion").is_empty());
    }

    #[test]
    fn test_add_concept_keywords() {
        let mut extractor = ConceptExtractor::new();
        extractor.add_concept_keywords("closures", ["closure"]);
        extractor.add_concept_keywords("closures", ["lambda"]);
        extractor.add_concept_keywords("traits", vec!["trait".to_string()]);

        assert_eq!(extractor.keywords("closures").unwrap(), ["closure", "lambda"]);
        assert_eq!(extractor.concepts().collect::<Vec<_>>(), vec!["closures", "traits"]);
        assert_eq!(extractor.analyze_text("A Lambda is a closure"), vec!["closures"]);
    }
}
