//! Typed ingestion of cleaned rows and the field extractors.
//!
//! The genres, keywords, cast and crew columns hold JSON-encoded lists of
//! objects. They are decoded once into [`Entity`] lists when a row becomes a
//! [`MovieRecord`]; the extractors then work on typed data.

use serde::Deserialize;

use crate::config::ParamsConfig;
use crate::error::{PipelineError, Result};
use crate::table::Table;

/// Number of leading cast members kept per movie.
pub const TOP_CAST: usize = 3;

/// Crew jobs whose members become tags.
pub const CREW_JOBS: &[&str] = &["Director", "Screenplay"];

/// One element of an encoded list. Attributes other than `name` and `job`
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// A cleaned movie row with its encoded columns decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub genres: Vec<Entity>,
    pub keywords: Vec<Entity>,
    pub cast: Vec<Entity>,
    pub crew: Vec<Entity>,
}

/// Decode a JSON-encoded list of entities.
pub fn parse_entities(encoded: &str) -> std::result::Result<Vec<Entity>, serde_json::Error> {
    serde_json::from_str(encoded)
}

/// Names of all entities, in encoded order.
pub fn names(entities: &[Entity]) -> Vec<String> {
    entities.iter().map(|e| e.name.clone()).collect()
}

/// Names of the first [`TOP_CAST`] entities.
pub fn leading_names(entities: &[Entity]) -> Vec<String> {
    entities.iter().take(TOP_CAST).map(|e| e.name.clone()).collect()
}

/// Names of the entities whose job is one of [`CREW_JOBS`].
pub fn names_with_jobs(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .filter(|e| e.job.as_deref().is_some_and(|job| CREW_JOBS.contains(&job)))
        .map(|e| e.name.clone())
        .collect()
}

/// `extract_names` over the encoded text.
pub fn extract_names(encoded: &str) -> std::result::Result<Vec<String>, serde_json::Error> {
    Ok(names(&parse_entities(encoded)?))
}

/// First three cast names from the encoded text.
pub fn top_cast(encoded: &str) -> std::result::Result<Vec<String>, serde_json::Error> {
    Ok(leading_names(&parse_entities(encoded)?))
}

/// Director and screenplay names from the encoded text.
pub fn crew_roles(encoded: &str) -> std::result::Result<Vec<String>, serde_json::Error> {
    Ok(names_with_jobs(&parse_entities(encoded)?))
}

/// Split free text on single spaces. Consecutive spaces yield empty tokens
/// and punctuation stays attached.
pub fn split_overview(text: &str) -> Vec<String> {
    text.split(' ').map(str::to_string).collect()
}

/// Convert a cleaned table (projected to the configured columns) into
/// typed records.
pub fn ingest(table: &Table, params: &ParamsConfig) -> Result<Vec<MovieRecord>> {
    let id_col = table.column_index(&params.movie_id)?;
    let title_col = table.column_index(&params.title)?;
    let overview_col = table.column_index(&params.overview)?;
    let genres_col = table.column_index(&params.genres)?;
    let keywords_col = table.column_index(&params.keywords)?;
    let cast_col = table.column_index(&params.cast)?;
    let crew_col = table.column_index(&params.crew)?;

    (0..table.len())
        .map(|row| {
            let cell = |col: usize, name: &str| {
                table.get(row, col).ok_or_else(|| {
                    PipelineError::schema(format!("null value in column '{}' at row {}", name, row))
                })
            };
            let entities = |col: usize, name: &str| -> Result<Vec<Entity>> {
                parse_entities(cell(col, name)?).map_err(|e| PipelineError::EncodingParseError {
                    row,
                    column: name.to_string(),
                    message: e.to_string(),
                })
            };

            let raw_id = cell(id_col, &params.movie_id)?;
            let id = raw_id.trim().parse::<i64>().map_err(|_| {
                PipelineError::schema(format!(
                    "column '{}' at row {} is not an integer: {:?}",
                    params.movie_id, row, raw_id
                ))
            })?;

            Ok(MovieRecord {
                id,
                title: cell(title_col, &params.title)?.to_string(),
                overview: cell(overview_col, &params.overview)?.to_string(),
                genres: entities(genres_col, &params.genres)?,
                keywords: entities(keywords_col, &params.keywords)?,
                cast: entities(cast_col, &params.cast)?,
                crew: entities(crew_col, &params.crew)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn params() -> ParamsConfig {
        PipelineConfig::from_toml_str(crate::config::tests::SAMPLE_CONFIG)
            .unwrap()
            .params
    }

    #[test]
    fn test_extract_names() {
        let names = extract_names(r#"[{"name":"Action"},{"name":"Drama"}]"#).unwrap();
        assert_eq!(names, vec!["Action", "Drama"]);
    }

    #[test]
    fn test_extract_names_ignores_extra_attributes() {
        let names = extract_names(r#"[{"id": 28, "name": "Action"}]"#).unwrap();
        assert_eq!(names, vec!["Action"]);
        assert!(extract_names("[]").unwrap().is_empty());
    }

    #[test]
    fn test_top_cast_keeps_first_three() {
        let encoded = r#"[{"name":"A"},{"name":"B"},{"name":"C"},{"name":"D"},{"name":"E"}]"#;
        assert_eq!(top_cast(encoded).unwrap(), vec!["A", "B", "C"]);
        assert_eq!(top_cast(r#"[{"name":"Solo"}]"#).unwrap(), vec!["Solo"]);
    }

    #[test]
    fn test_crew_roles_filters_jobs() {
        let encoded = r#"[
            {"name": "James Cameron", "job": "Director"},
            {"name": "Stephen E. Rivkin", "job": "Editor"}
        ]"#;
        assert_eq!(crew_roles(encoded).unwrap(), vec!["James Cameron"]);

        let encoded = r#"[{"name":"W","job":"Screenplay"},{"name":"X"},{"name":"D","job":"Director"}]"#;
        assert_eq!(crew_roles(encoded).unwrap(), vec!["W", "D"]);
        assert!(crew_roles(r#"[{"name":"E","job":"Editor"}]"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_encoding() {
        assert!(extract_names("[{'name': 'Action'}").is_err());
        assert!(extract_names(r#"[{"id": 1}]"#).is_err());
    }

    #[test]
    fn test_split_overview_keeps_punctuation_and_gaps() {
        assert_eq!(split_overview("In the 22nd century,"), vec!["In", "the", "22nd", "century,"]);
        assert_eq!(split_overview("a  b"), vec!["a", "", "b"]);
    }

    fn csv_table(rows: &str) -> Table {
        let csv = format!("movie_id,title,overview,genres,keywords,cast,crew\n{}", rows);
        Table::from_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_ingest_row() {
        let t = csv_table(
            "19995,Avatar,A marine.,\"[{\"\"name\"\": \"\"Action\"\"}]\",[],\"[{\"\"name\"\": \"\"Sam Worthington\"\"}]\",\"[{\"\"name\"\": \"\"James Cameron\"\", \"\"job\"\": \"\"Director\"\"}]\"\n",
        );
        let records = ingest(&t, &params()).unwrap();
        assert_eq!(records.len(), 1);
        let movie = &records[0];
        assert_eq!(movie.id, 19995);
        assert_eq!(movie.title, "Avatar");
        assert_eq!(names(&movie.genres), vec!["Action"]);
        assert!(movie.keywords.is_empty());
        assert_eq!(names_with_jobs(&movie.crew), vec!["James Cameron"]);
    }

    #[test]
    fn test_ingest_reports_bad_encoding() {
        let t = csv_table("1,T,o,[],not-json,[],[]\n");
        match ingest(&t, &params()).unwrap_err() {
            PipelineError::EncodingParseError { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "keywords");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ingest_rejects_non_integer_id() {
        let t = csv_table("abc,T,o,[],[],[],[]\n");
        let err = ingest(&t, &params()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaError { .. }));
    }
}
