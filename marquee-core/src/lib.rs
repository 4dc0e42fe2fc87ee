//! Marquee Core - content-based movie similarity pipeline.
//!
//! Loads movie metadata and cast/crew credits, cleans and merges them,
//! derives a bag-of-words "tags" feature per movie and computes the pairwise
//! cosine similarity between all movies.
//!
//! # Stages
//!
//! - **Load & merge**: two CSV files joined on a shared column ([`table`])
//! - **Select & clean**: fixed projection, null and duplicate removal
//! - **Extract**: JSON-encoded entity lists decoded once ([`extract`])
//! - **Normalize & compose**: collapsed, lowercased tokens ([`normalize`], [`tags`])
//! - **Stem**: Snowball English stemming ([`stem`])
//! - **Vectorize & compare**: term counts and cosine similarity
//!   ([`vectorize`], [`similarity`])
//! - **Persist**: JSON artifacts ([`persist`])
//!
//! # Usage
//!
//! ```rust,no_run
//! use marquee_core::{Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::load(Path::new("configs/config.toml"))?;
//! let report = Pipeline::new(config).run()?;
//! println!("{} movies, {} terms", report.movies, report.vocabulary_size);
//! # Ok::<(), marquee_core::PipelineError>(())
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod similarity;
pub mod stem;
pub mod stop_words;
pub mod table;
pub mod tags;
pub mod vectorize;

pub use config::{PipelineConfig, StopWordsSetting, DEFAULT_CONFIG_PATH};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput, PipelineReport};
pub use similarity::SimilarityMatrix;
pub use tags::TaggedMovie;
