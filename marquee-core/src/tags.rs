//! Tag composition: one ordered bag of words per movie.

use serde::{Deserialize, Serialize};

use crate::extract::{self, MovieRecord};
use crate::normalize::{strip_inner_spaces, to_lowercase};

/// Normalized token lists for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFeatures {
    pub id: i64,
    pub title: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    pub cast: Vec<String>,
    pub crew: Vec<String>,
    pub overview: Vec<String>,
}

impl MovieFeatures {
    /// Run the extractors and normalizers over a decoded record.
    ///
    /// Names are space-stripped and lowercased; overview tokens are only
    /// lowercased.
    pub fn from_record(record: &MovieRecord) -> Self {
        let prepare = |names: Vec<String>| to_lowercase(&strip_inner_spaces(&names));
        Self {
            id: record.id,
            title: record.title.clone(),
            genres: prepare(extract::names(&record.genres)),
            keywords: prepare(extract::names(&record.keywords)),
            cast: prepare(extract::leading_names(&record.cast)),
            crew: prepare(extract::names_with_jobs(&record.crew)),
            overview: to_lowercase(&extract::split_overview(&record.overview)),
        }
    }
}

/// Concatenate genres, keywords, cast, crew and overview tokens, in that
/// order.
pub fn compose_tags(features: &MovieFeatures) -> Vec<String> {
    features
        .genres
        .iter()
        .chain(&features.keywords)
        .chain(&features.cast)
        .chain(&features.crew)
        .chain(&features.overview)
        .cloned()
        .collect()
}

/// The reduced (id, title, tags) row persisted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedMovie {
    pub id: i64,
    pub title: String,
    /// Space-separated tag tokens.
    pub tags: String,
}

impl TaggedMovie {
    pub fn from_features(features: &MovieFeatures) -> Self {
        Self {
            id: features.id,
            title: features.title.clone(),
            tags: compose_tags(features).join(" "),
        }
    }
}
