//! Pipeline orchestration.
//!
//! Stages run in a fixed order and each returns a new value; the first
//! failing stage aborts the run.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract;
use crate::persist::{self, MovieList};
use crate::similarity::SimilarityMatrix;
use crate::stem::TagStemmer;
use crate::table::Table;
use crate::tags::{MovieFeatures, TaggedMovie};
use crate::vectorize::CountVectorizer;

/// Summary of a completed run, persisted next to the artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub movies_loaded: usize,
    pub credits_loaded: usize,
    pub merged_rows: usize,
    pub null_rows_dropped: usize,
    pub duplicate_rows_dropped: usize,
    pub movies: usize,
    pub vocabulary_size: usize,
    pub similarity_size: usize,
    pub movie_list_path: PathBuf,
    pub similarity_path: PathBuf,
    pub report_path: PathBuf,
    pub duration_ms: u64,
}

/// Everything the stages produce before persistence.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub movies: Vec<TaggedMovie>,
    pub similarity: SimilarityMatrix,
    pub vocabulary_size: usize,
}

/// Row counts gathered while cleaning.
#[derive(Debug, Clone, Copy, Default)]
struct CleaningStats {
    movies_loaded: usize,
    credits_loaded: usize,
    merged_rows: usize,
    null_rows_dropped: usize,
    duplicate_rows_dropped: usize,
}

/// Log stage start/completion around `f`.
fn stage<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    info!(">>>>> {} started", name);
    let value = f()?;
    info!("<<<<< {} completed", name);
    Ok(value)
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and write the artifacts.
    pub fn run(&self) -> Result<PipelineReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let (table, stats) = self.load_and_clean()?;
        let output = self.transform(&table)?;
        let report = self.persist(&output, stats, started_at, start)?;

        info!(
            "pipeline finished: {} movies, {} terms in {}ms",
            report.movies, report.vocabulary_size, report.duration_ms
        );
        Ok(report)
    }

    /// Load, merge, project and clean the two input tables.
    fn load_and_clean(&self) -> Result<(Table, CleaningStats)> {
        let mut stats = CleaningStats::default();

        let (movies, credits) = stage("file reading", || {
            let movies = Table::from_csv_path(&self.config.movie_file())?;
            let credits = Table::from_csv_path(&self.config.credit_file())?;
            info!("read {} movies and {} credits", movies.len(), credits.len());
            Ok((movies, credits))
        })?;
        stats.movies_loaded = movies.len();
        stats.credits_loaded = credits.len();

        let merged = stage("merge", || {
            movies.inner_join(&credits, &self.config.data.merge_column_name)
        })?;
        stats.merged_rows = merged.len();

        let selected = stage("column selection", || {
            merged.select(&self.config.selected_columns())
        })?;

        let cleaned = stage("cleaning", || {
            let without_nulls = selected.drop_nulls();
            let deduped = without_nulls.drop_duplicates();
            stats.null_rows_dropped = selected.len() - without_nulls.len();
            stats.duplicate_rows_dropped = without_nulls.len() - deduped.len();
            info!(
                "dropped {} rows with nulls and {} duplicate rows",
                stats.null_rows_dropped, stats.duplicate_rows_dropped
            );
            Ok(deduped)
        })?;

        Ok((cleaned, stats))
    }

    /// Turn a cleaned table into tagged movies and their similarity matrix.
    pub fn transform(&self, table: &Table) -> Result<PipelineOutput> {
        let records = stage("ingestion", || extract::ingest(table, &self.config.params))?;

        let tagged: Vec<TaggedMovie> = stage("tag composition", || {
            Ok(records
                .iter()
                .map(|r| TaggedMovie::from_features(&MovieFeatures::from_record(r)))
                .collect())
        })?;

        let stemmed: Vec<TaggedMovie> = stage("stemming", || {
            let stemmer = TagStemmer::new();
            Ok(tagged
                .into_iter()
                .map(|m| TaggedMovie {
                    tags: stemmer.stem_tags(&m.tags),
                    ..m
                })
                .collect())
        })?;

        let (terms, vocabulary_size) = stage("vectorization", || {
            let mut vectorizer = CountVectorizer::from_config(&self.config.vectorizer);
            let documents: Vec<&str> = stemmed.iter().map(|m| m.tags.as_str()).collect();
            let terms = vectorizer.fit_transform(&documents)?;
            info!(
                "vectorized {} movies over {} terms",
                terms.rows(),
                vectorizer.vocabulary_size()
            );
            Ok((terms, vectorizer.vocabulary_size()))
        })?;

        let similarity = stage("similarity", || Ok(SimilarityMatrix::from_terms(&terms)))?;

        Ok(PipelineOutput {
            movies: stemmed,
            similarity,
            vocabulary_size,
        })
    }

    /// Write the movie list, similarity matrix and run report.
    ///
    /// All three are serialized to temporary files first and renamed into
    /// place only once every one of them has been written.
    fn persist(
        &self,
        output: &PipelineOutput,
        stats: CleaningStats,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> Result<PipelineReport> {
        stage("persist", || {
            let dir = self.config.artifacts_dir();
            persist::create_directories(&dir)?;

            let params = &self.config.params;
            let list = MovieList::new(
                [params.movie_id.as_str(), params.title.as_str(), params.tags.as_str()],
                &output.movies,
            );
            let movie_list_path = dir.join(&self.config.artifacts.movie_list);
            let similarity_path = dir.join(&self.config.artifacts.similarity);
            let report_path = dir.join(&self.config.artifacts.report);

            let staged_list = persist::stage_json(&movie_list_path, &list)?;
            let staged_similarity = persist::stage_json(&similarity_path, &output.similarity)?;

            let report = PipelineReport {
                started_at,
                movies_loaded: stats.movies_loaded,
                credits_loaded: stats.credits_loaded,
                merged_rows: stats.merged_rows,
                null_rows_dropped: stats.null_rows_dropped,
                duplicate_rows_dropped: stats.duplicate_rows_dropped,
                movies: output.movies.len(),
                vocabulary_size: output.vocabulary_size,
                similarity_size: output.similarity.size(),
                movie_list_path,
                similarity_path,
                report_path: report_path.clone(),
                duration_ms: start.elapsed().as_millis() as u64,
            };
            let staged_report = persist::stage_json(&report_path, &report)?;

            staged_list.commit()?;
            staged_similarity.commit()?;
            staged_report.commit()?;
            Ok(report)
        })
    }
}
