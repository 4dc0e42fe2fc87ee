//! Artifact persistence: the reduced movie table, the similarity matrix
//! and the run report, all as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::similarity::SimilarityMatrix;
use crate::tags::TaggedMovie;

/// The reduced (id, title, tags) table in split orientation: column names
/// once, then one `[id, title, tags]` array per movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieList {
    pub columns: [String; 3],
    pub data: Vec<(i64, String, String)>,
}

impl MovieList {
    pub fn new(columns: [&str; 3], movies: &[TaggedMovie]) -> Self {
        Self {
            columns: columns.map(str::to_string),
            data: movies
                .iter()
                .map(|m| (m.id, m.title.clone(), m.tags.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn persist_error(path: &Path, err: impl ToString) -> PipelineError {
    PipelineError::PersistError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Create `path` and its parents if missing.
pub fn create_directories(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| persist_error(path, e))?;
    info!("created directory at: {}", path.display());
    Ok(())
}

/// A JSON artifact written next to its destination under a `.tmp` name.
///
/// [`StagedJson::commit`] renames it into place. Dropping it uncommitted
/// removes the temporary file, so the destination is never left half
/// written.
#[derive(Debug)]
pub struct StagedJson {
    path: PathBuf,
    tmp_path: PathBuf,
    committed: bool,
}

impl StagedJson {
    /// Final destination of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// Move the temporary file onto the destination.
    pub fn commit(mut self) -> Result<PathBuf> {
        std::fs::rename(&self.tmp_path, &self.path).map_err(|e| persist_error(&self.path, e))?;
        self.committed = true;
        info!("json file saved at: {}", self.path.display());
        Ok(self.path.clone())
    }
}

impl Drop for StagedJson {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `data` as JSON to a temporary file beside `path`.
pub fn stage_json<T: Serialize>(path: &Path, data: &T) -> Result<StagedJson> {
    let staged = StagedJson {
        path: path.to_path_buf(),
        tmp_path: tmp_path_for(path),
        committed: false,
    };
    let file = File::create(&staged.tmp_path).map_err(|e| persist_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data).map_err(|e| persist_error(path, e))?;
    writer.flush().map_err(|e| persist_error(path, e))?;
    Ok(staged)
}

/// Serialize `data` as JSON to `path`, replacing it atomically.
pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    stage_json(path, data)?.commit()?;
    Ok(())
}

/// Read a JSON artifact back.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| persist_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| persist_error(path, e))
}

pub fn read_movie_list(path: &Path) -> Result<MovieList> {
    load_json(path)
}

pub fn read_similarity(path: &Path) -> Result<SimilarityMatrix> {
    load_json(path)
}
