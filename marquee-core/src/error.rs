//! Error types for marquee-core.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline.
///
/// Every variant aborts the run: no stage produces output that a later
/// stage can safely work around.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration file missing, unparsable, or inconsistent.
    #[error("Configuration error in {path}: {message}")]
    ConfigError {
        /// Path of the configuration document.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// An input dataset could not be opened or read.
    #[error("Failed to load {path}: {message}")]
    DataLoadError {
        /// Path of the dataset file.
        path: String,
        /// Description of the read failure.
        message: String,
    },

    /// A required column is missing or holds a value of the wrong shape.
    #[error("Schema error: {message}")]
    SchemaError {
        /// Description of the schema mismatch.
        message: String,
    },

    /// A string-encoded entity list could not be decoded.
    #[error("Cannot decode column '{column}' at row {row}: {message}")]
    EncodingParseError {
        /// Zero-based row index in the cleaned table.
        row: usize,
        /// Column holding the encoded list.
        column: String,
        /// Parser message.
        message: String,
    },

    /// The corpus could not be turned into term vectors.
    #[error("Vectorization error: {message}")]
    VectorizationError {
        /// Description of the vectorization failure.
        message: String,
    },

    /// An artifact could not be written or read back.
    #[error("Failed to persist {path}: {message}")]
    PersistError {
        /// Artifact path.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },
}

impl PipelineError {
    /// Name of the pipeline step this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::ConfigError { .. } => "config",
            PipelineError::DataLoadError { .. } => "load",
            PipelineError::SchemaError { .. } => "schema",
            PipelineError::EncodingParseError { .. } => "extract",
            PipelineError::VectorizationError { .. } => "vectorize",
            PipelineError::PersistError { .. } => "persist",
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        PipelineError::SchemaError {
            message: message.into(),
        }
    }
}
