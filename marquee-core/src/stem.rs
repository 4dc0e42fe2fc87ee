//! English suffix-stripping stemmer applied to tag strings.

use rust_stemmers::{Algorithm, Stemmer};

/// Stems whitespace-separated tag strings with the Snowball English rules.
pub struct TagStemmer {
    stemmer: Stemmer,
}

impl Default for TagStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl TagStemmer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Stem a single token.
    pub fn stem_token(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }

    /// Split on whitespace, stem each token, rejoin with single spaces.
    pub fn stem_tags(&self, tags: &str) -> String {
        tags.split_whitespace()
            .map(|t| self.stemmer.stem(t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
