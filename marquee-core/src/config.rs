//! Pipeline configuration loading from `configs/config.toml`.
//!
//! The `[data]` and `[params]` sections are required: they name the input
//! files and the columns the pipeline works on. The remaining sections are
//! optional and fall back to defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [data]
//! local_dir = "data"
//! data_folder = "raw"
//! movie_file_name = "tmdb_5000_movies.csv"
//! credit_file_name = "tmdb_5000_credits.csv"
//! merge_column_name = "title"
//!
//! [params]
//! movie_id = "movie_id"
//! title = "title"
//! overview = "overview"
//! genres = "genres"
//! keywords = "keywords"
//! cast = "cast"
//! crew = "crew"
//! tags = "tags"
//!
//! [vectorizer]
//! max_features = 5000
//! stop_words = "english"
//!
//! [artifacts]
//! directory = "artifacts"
//!
//! [logging]
//! directory = "logs"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Input dataset locations.
    pub data: DataConfig,

    /// Column names used by the pipeline.
    pub params: ParamsConfig,

    /// Term-frequency vectorizer settings.
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Output artifact locations.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Log file location.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the two input tables live and how they are joined.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Root data directory.
    pub local_dir: String,
    /// Subfolder of `local_dir` holding the CSV files.
    pub data_folder: String,
    /// Movie metadata file name.
    pub movie_file_name: String,
    /// Cast/crew credits file name.
    pub credit_file_name: String,
    /// Column shared by both files.
    pub merge_column_name: String,
}

/// Names of the semantic columns after the merge.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamsConfig {
    pub movie_id: String,
    pub title: String,
    pub overview: String,
    pub genres: String,
    pub keywords: String,
    pub cast: String,
    pub crew: String,
    /// Name of the derived feature column.
    pub tags: String,
}

/// Stop-word list applied by the vectorizer.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopWordsSetting {
    /// Built-in English list.
    #[default]
    English,
    /// Keep every token.
    None,
}

/// Term-frequency vectorizer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size.
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    #[serde(default)]
    pub stop_words: StopWordsSetting,
}

fn default_max_features() -> usize {
    5000
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            stop_words: StopWordsSetting::English,
        }
    }
}

/// Output artifact locations.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub directory: String,

    #[serde(default = "default_movie_list")]
    pub movie_list: String,

    #[serde(default = "default_similarity")]
    pub similarity: String,

    #[serde(default = "default_report")]
    pub report: String,
}

fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}

fn default_movie_list() -> String {
    "movie_list.json".to_string()
}

fn default_similarity() -> String {
    "similarity.json".to_string()
}

fn default_report() -> String {
    "report.json".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: default_artifacts_dir(),
            movie_list: default_movie_list(),
            similarity: default_similarity(),
            report: default_report(),
        }
    }
}

/// Log file location. Read by the CLI when it installs the subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub directory: String,

    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_file() -> String {
    "running_logs.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: default_log_file(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate the configuration at `path`.
    ///
    /// Unlike optional tool settings, a broken pipeline config is fatal: the
    /// run cannot locate its inputs without it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::ConfigError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            PipelineError::ConfigError { message, .. } => PipelineError::ConfigError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        tracing::info!("config file: {} loaded successfully", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| PipelineError::ConfigError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| PipelineError::ConfigError {
            path: "<inline>".to_string(),
            message,
        };

        let named = [
            ("data.movie_file_name", &self.data.movie_file_name),
            ("data.credit_file_name", &self.data.credit_file_name),
            ("data.merge_column_name", &self.data.merge_column_name),
            ("params.tags", &self.params.tags),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(invalid(format!("'{}' must not be empty", key)));
            }
        }

        let mut seen = HashSet::new();
        for column in self.selected_columns() {
            if column.trim().is_empty() {
                return Err(invalid("selected column names must not be empty".to_string()));
            }
            if !seen.insert(column) {
                return Err(invalid(format!("column '{}' is selected twice", column)));
            }
        }

        if self.vectorizer.max_features == 0 {
            return Err(invalid("'vectorizer.max_features' must be positive".to_string()));
        }
        Ok(())
    }

    /// Directory holding both input files.
    pub fn data_dir(&self) -> PathBuf {
        Path::new(&self.data.local_dir).join(&self.data.data_folder)
    }

    /// Full path of the movie metadata file.
    pub fn movie_file(&self) -> PathBuf {
        self.data_dir().join(&self.data.movie_file_name)
    }

    /// Full path of the credits file.
    pub fn credit_file(&self) -> PathBuf {
        self.data_dir().join(&self.data.credit_file_name)
    }

    /// The seven columns kept after the merge, in projection order.
    pub fn selected_columns(&self) -> [&str; 7] {
        let p = &self.params;
        [
            p.movie_id.as_str(),
            p.title.as_str(),
            p.overview.as_str(),
            p.genres.as_str(),
            p.keywords.as_str(),
            p.cast.as_str(),
            p.crew.as_str(),
        ]
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        PathBuf::from(&self.artifacts.directory)
    }

    /// Full path of the log file.
    pub fn log_file(&self) -> PathBuf {
        Path::new(&self.logging.directory).join(&self.logging.file)
    }
}
