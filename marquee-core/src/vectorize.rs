//! Term-frequency vectorization over a fixed, corpus-wide vocabulary.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::{StopWordsSetting, VectorizerConfig};
use crate::error::{PipelineError, Result};
use crate::stop_words::is_english_stop_word;

/// Tokens of at least two word characters.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Dense row-major document-term count matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TermMatrix {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Term counts of document `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Count vectorizer: vocabulary fitted on the whole corpus, capped at
/// `max_features` terms by document frequency.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    max_features: Option<usize>,
    stop_words: StopWordsSetting,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountVectorizer {
    /// Unlimited vocabulary, no stop words.
    pub fn new() -> Self {
        Self {
            max_features: None,
            stop_words: StopWordsSetting::None,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
        }
    }

    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self::new()
            .with_max_features(config.max_features)
            .with_stop_words(config.stop_words)
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWordsSetting) -> Self {
        self.stop_words = stop_words;
        self
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| match self.stop_words {
                StopWordsSetting::English => !is_english_stop_word(t),
                StopWordsSetting::None => true,
            })
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary from `documents`.
    ///
    /// Terms are ranked by document frequency (ties broken alphabetically)
    /// and truncated to `max_features`; kept terms are then indexed in
    /// alphabetical order.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(PipelineError::VectorizationError {
                message: "cannot fit on an empty corpus".to_string(),
            });
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<String> = self.tokenize(doc.as_ref()).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(PipelineError::VectorizationError {
                message: "empty vocabulary; documents only contain stop words".to_string(),
            });
        }

        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = self.max_features {
            ranked.truncate(max);
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();
        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        self.terms = terms;

        debug!("fitted vocabulary of {} terms", self.terms.len());
        Ok(())
    }

    /// Count vocabulary terms per document.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<TermMatrix> {
        if self.terms.is_empty() {
            return Err(PipelineError::VectorizationError {
                message: "vocabulary is empty; call fit() first".to_string(),
            });
        }

        let cols = self.terms.len();
        let mut data = vec![0.0f32; documents.len() * cols];
        for (i, doc) in documents.iter().enumerate() {
            for token in self.tokenize(doc.as_ref()) {
                if let Some(&j) = self.vocabulary.get(&token) {
                    data[i * cols + j] += 1.0;
                }
            }
        }

        Ok(TermMatrix {
            rows: documents.len(),
            cols,
            data,
        })
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<TermMatrix> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Kept terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_alphabetical_columns() {
        let docs = ["action hero hero", "hero drama"];
        let mut cv = CountVectorizer::new();
        let m = cv.fit_transform(&docs).unwrap();

        assert_eq!(cv.terms(), ["action", "drama", "hero"]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(0), &[1.0, 0.0, 2.0]);
        assert_eq!(m.row(1), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_stop_words_and_short_tokens_dropped() {
        let docs = ["the hero of a city x", "hero"];
        let mut cv = CountVectorizer::new().with_stop_words(StopWordsSetting::English);
        cv.fit(&docs).unwrap();
        assert_eq!(cv.terms(), ["city", "hero"]);
    }

    #[test]
    fn test_punctuation_split() {
        let mut cv = CountVectorizer::new();
        cv.fit(&["world. sci-fi"]).unwrap();
        assert_eq!(cv.terms(), ["fi", "sci", "world"]);
    }

    #[test]
    fn test_max_features_keeps_most_common_documents() {
        let docs = ["alpha beta gamma", "beta gamma", "gamma zeta"];
        let mut cv = CountVectorizer::new().with_max_features(2);
        cv.fit(&docs).unwrap();
        assert_eq!(cv.terms(), ["beta", "gamma"]);
    }

    #[test]
    fn test_unknown_terms_ignored_on_transform() {
        let mut cv = CountVectorizer::new();
        cv.fit(&["hero"]).unwrap();
        let m = cv.transform(&["villain"]).unwrap();
        assert_eq!(m.row(0), &[0.0]);
    }

    #[test]
    fn test_empty_inputs() {
        let mut cv = CountVectorizer::new();
        assert!(cv.fit::<&str>(&[]).is_err());

        let mut cv = CountVectorizer::new().with_stop_words(StopWordsSetting::English);
        let err = cv.fit(&["the and of"]).unwrap_err();
        assert!(matches!(err, PipelineError::VectorizationError { .. }));

        let cv = CountVectorizer::new();
        assert!(cv.transform(&["anything"]).is_err());
    }
}
